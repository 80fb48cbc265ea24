/// The renderer's view into the current Synthesis, threaded through
/// [`crate::ListManager::updated_len`] across frames (spec.md §4.3
/// "Snapshot reconciliation").
///
/// `before_end` is not "are we at the end right now" — it is the flag the
/// algorithm itself maintains: `true` means the renderer should keep
/// rendering from `first_index` as usual, `false` is a one-shot signal to
/// jump straight to the new end (set only after a push that arrives while
/// the renderer was tracking the end and the manager is configured to
/// stick there).
#[derive(Debug, Clone, Copy)]
pub struct ListPosition {
	/// Index of the first element the renderer currently shows.
	pub first_index: usize,
	/// How many elements are visible starting at `first_index`, used to
	/// derive the viewport's end serial.
	pub visible_count: usize,
	pub before_end: bool,
}

impl ListPosition {
	pub fn new() -> Self {
		Self {
			first_index: 0,
			visible_count: 0,
			before_end: true,
		}
	}
}

impl Default for ListPosition {
	fn default() -> Self {
		Self::new()
	}
}
