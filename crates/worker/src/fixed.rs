use std::sync::mpsc::{sync_channel, SyncSender};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle};

use crate::{BoxedWork, Scheduler};

/// An unbuffered task channel drained by `n` long-lived worker threads.
///
/// [`Scheduler::schedule`] blocks the caller when every worker is busy —
/// the channel has zero capacity, so a send only completes once a worker
/// thread is ready to receive it (spec.md §4.5 "natural backpressure").
/// Workers live for the lifetime of the pool; there is no spin-down.
pub struct FixedWorkerPool {
	tx: SyncSender<BoxedWork>,
	_workers: Vec<JoinHandle<()>>,
}

impl FixedWorkerPool {
	pub fn new(worker_count: usize) -> Self {
		let worker_count = worker_count.max(1);
		let (tx, rx) = sync_channel::<BoxedWork>(0);
		let rx = Arc::new(Mutex::new(rx));

		let workers = (0..worker_count)
			.map(|id| {
				let rx = Arc::clone(&rx);
				thread::Builder::new()
					.name(format!("vlist-fixed-worker-{id}"))
					.spawn(move || loop {
						let next = rx.lock().expect("fixed worker pool receiver lock poisoned").recv();
						match next {
							Ok(work) => work(),
							Err(_) => break,
						}
					})
					.expect("spawn fixed worker thread")
			})
			.collect();

		Self { tx, _workers: workers }
	}

	/// Default worker count: the number of available hardware threads.
	pub fn with_default_parallelism() -> Self {
		let n = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
		Self::new(n)
	}

	/// Lazily-initialized, process-wide default pool.
	pub fn shared() -> &'static FixedWorkerPool {
		static POOL: OnceLock<FixedWorkerPool> = OnceLock::new();
		POOL.get_or_init(FixedWorkerPool::with_default_parallelism)
	}
}

impl Scheduler for FixedWorkerPool {
	fn schedule(&self, work: BoxedWork) {
		if self.tx.send(work).is_err() {
			tracing::warn!("vlist.worker.fixed.pool_shutdown_drop");
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;

	use super::*;

	#[test]
	fn runs_every_submitted_task() {
		let pool = FixedWorkerPool::new(2);
		let counter = Arc::new(AtomicUsize::new(0));

		for _ in 0..16 {
			let counter = Arc::clone(&counter);
			pool.schedule(Box::new(move || {
				counter.fetch_add(1, Ordering::SeqCst);
			}));
		}

		// Dropping the pool closes the channel; block until workers drain.
		drop(pool);
		std::thread::sleep(std::time::Duration::from_millis(50));
		assert_eq!(counter.load(Ordering::SeqCst), 16);
	}
}
