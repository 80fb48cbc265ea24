//! Worker pool abstraction consumed by the resource loader.
//!
//! [`Scheduler`] is the single seam: "eventually execute `work` on some
//! thread". [`FixedWorkerPool`] and [`DynamicWorkerPool`] are the two
//! reference implementations named in spec.md §4.5; both are lazily
//! initialized on first use via [`FixedWorkerPool::shared`] /
//! [`DynamicWorkerPool::shared`].

mod dynamic;
mod fixed;

pub use dynamic::DynamicWorkerPool;
pub use fixed::FixedWorkerPool;

/// An opaque, one-shot unit of work submitted to a [`Scheduler`].
pub type BoxedWork = Box<dyn FnOnce() + Send + 'static>;

/// Must eventually execute `work`; may block the caller per its own
/// discretion (spec.md §6 "Scheduler interface").
pub trait Scheduler: Send + Sync {
	fn schedule(&self, work: BoxedWork);
}
