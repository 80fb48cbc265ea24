use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::resource::{Resource, ResourceState};

/// The cache's private bookkeeping for one tag. Never exposed directly —
/// callers only ever see a [`Resource`] snapshot cloned out of it.
pub(crate) struct Entry<V> {
	/// Frame number of the most recent `Schedule` touch. Lock-free so the
	/// dispatcher thread's purge pass never contends with `Schedule`.
	pub(crate) frame: AtomicU64,
	state: Mutex<EntryState<V>>,
}

struct EntryState<V> {
	state: ResourceState,
	value: Option<V>,
}

impl<V: Clone> Entry<V> {
	pub(crate) fn new(frame: u64) -> Self {
		Self {
			frame: AtomicU64::new(frame),
			state: Mutex::new(EntryState {
				state: ResourceState::Queued,
				value: None,
			}),
		}
	}

	pub(crate) fn touch(&self, frame: u64) {
		self.frame.store(frame, Ordering::SeqCst);
	}

	pub(crate) fn mark_loading(&self) {
		self.state.lock().state = ResourceState::Loading;
	}

	pub(crate) fn mark_loaded(&self, value: V) {
		let mut state = self.state.lock();
		state.state = ResourceState::Loaded;
		state.value = Some(value);
	}

	pub(crate) fn state(&self) -> ResourceState {
		self.state.lock().state
	}

	pub(crate) fn snapshot(&self) -> Resource<V> {
		let state = self.state.lock();
		Resource {
			state: state.state,
			value: state.value.clone(),
		}
	}
}
