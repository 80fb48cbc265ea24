/// Lifecycle of a cached resource. Transitions are monotonic and one-way:
/// `Queued -> Loading -> Loaded`. A resource never regresses; a later
/// `Schedule` for the same tag only refreshes its frame, never its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
	Queued,
	Loading,
	Loaded,
}

/// A point-in-time copy of a cached resource. `value` is only meaningful
/// once `state == Loaded`; callers never see a mutable handle into the
/// cache, only snapshots (spec.md §4.4 "Always return a copy").
#[derive(Debug, Clone)]
pub struct Resource<V> {
	pub state: ResourceState,
	pub value: Option<V>,
}

impl<V> Resource<V> {
	pub fn is_loaded(&self) -> bool {
		matches!(self.state, ResourceState::Loaded)
	}
}

/// Diagnostic counters exposed by [`crate::ResourceLoader::stats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
	/// Total number of `Schedule` calls observed, hit or miss.
	pub lookup_count: u64,
	/// Entries currently sitting in the queue, not yet submitted.
	pub queued_count: u64,
	/// Entries currently running on the scheduler.
	pub loading_count: u64,
	/// Entries with a value available.
	pub loaded_count: u64,
}
