//! A keyed resource cache with single-flight-per-tag loading and
//! frame-counted LRU eviction, sitting on top of the worker pool
//! abstraction in `vlist-worker` (spec.md §4.4).
//!
//! Callers drive two independent clocks:
//! - `schedule(tag, load_fn)`, called during layout, returns a snapshot
//!   and submits `load_fn` at most once per tag.
//! - `frame(render)`, called once per render pass, advances the frame
//!   counter that eviction and staleness checks are keyed on.

mod context;
mod entry;
mod loader;
mod resource;

pub use context::LoadContext;
pub use loader::{LoadFn, ResourceLoader};
pub use resource::{Resource, ResourceState, Stats};
