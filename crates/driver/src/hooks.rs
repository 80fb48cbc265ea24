use std::sync::Arc;

use vlist_core::Serial;

use crate::request::PullDirection;

/// `(direction, anchor) -> batch`. Invoked synchronously on the driver's own
/// task — the driver is, by design, the one place in the system allowed to
/// block on user code (spec.md §5 "the loader call is the only point at
/// which the driver may be unresponsive for extended time").
pub type LoaderHook<E> = Arc<dyn Fn(PullDirection, Serial) -> Vec<E> + Send + Sync>;

/// Hint to the host that a new frame should be drawn. Must be callable from
/// any thread (spec.md §6 "must be thread-safe").
pub type Invalidator = Arc<dyn Fn() + Send + Sync>;
