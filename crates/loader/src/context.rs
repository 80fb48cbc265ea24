use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Threaded through every load closure so an in-flight load can observe
/// cooperative cancellation. Nothing in this crate sets the flag yet —
/// no caller of `Schedule` has a way to reach a queued closure once it has
/// been handed to the scheduler, so `is_cancelled` always reports `false`
/// today. The hook exists so a future eviction path can wire it up without
/// changing every `LoadFn` signature in the process (spec.md Open Questions).
#[derive(Clone, Default)]
pub struct LoadContext {
	cancelled: Arc<AtomicBool>,
}

impl LoadContext {
	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::Relaxed)
	}
}
