use std::sync::{Arc, Condvar, Mutex, OnceLock};

use tokio::runtime::Handle;

use crate::{BoxedWork, Scheduler};

struct Gate {
	count: Mutex<usize>,
	available: Condvar,
	max: usize,
}

impl Gate {
	fn new(max: usize) -> Self {
		Self {
			count: Mutex::new(0),
			available: Condvar::new(),
			max,
		}
	}

	fn acquire(&self) {
		let mut count = self.count.lock().expect("gate count lock poisoned");
		while *count >= self.max {
			count = self.available.wait(count).expect("gate condvar wait poisoned");
		}
		*count += 1;
	}

	fn release(&self) {
		let mut count = self.count.lock().expect("gate count lock poisoned");
		*count = count.saturating_sub(1);
		self.available.notify_one();
	}
}

/// A dispatcher that spawns a new task per submission, capped at `n`
/// concurrent tasks by a bounded semaphore (spec.md §4.5).
///
/// Submissions beyond `n` block the caller until a running task completes.
/// Tasks are destroyed on completion; ordering between tasks is not
/// guaranteed. Trades per-submission spawn cost for lower steady-state
/// memory than [`FixedWorkerPool`](crate::FixedWorkerPool) when load is
/// bursty.
pub struct DynamicWorkerPool {
	gate: Arc<Gate>,
	handle: Handle,
}

impl DynamicWorkerPool {
	pub fn new(max_concurrent: usize, handle: Handle) -> Self {
		Self {
			gate: Arc::new(Gate::new(max_concurrent.max(1))),
			handle,
		}
	}

	/// Default cap: the number of available hardware threads, spawned onto
	/// the currently-entered Tokio runtime.
	pub fn with_default_parallelism() -> Self {
		let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
		Self::new(n, Handle::current())
	}

	/// Lazily-initialized, process-wide default pool. Must be called from
	/// within a Tokio runtime the first time, since the handle is captured
	/// at construction.
	pub fn shared() -> &'static DynamicWorkerPool {
		static POOL: OnceLock<DynamicWorkerPool> = OnceLock::new();
		POOL.get_or_init(DynamicWorkerPool::with_default_parallelism)
	}
}

impl Scheduler for DynamicWorkerPool {
	fn schedule(&self, work: BoxedWork) {
		self.gate.acquire();
		let gate = Arc::clone(&self.gate);
		self.handle.spawn_blocking(move || {
			work();
			gate.release();
		});
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;
	use std::time::Duration;

	use super::*;

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn caps_concurrency_and_runs_everything() {
		let pool = DynamicWorkerPool::new(2, Handle::current());
		let in_flight = Arc::new(AtomicUsize::new(0));
		let max_seen = Arc::new(AtomicUsize::new(0));
		let completed = Arc::new(AtomicUsize::new(0));

		for _ in 0..8 {
			let in_flight = Arc::clone(&in_flight);
			let max_seen = Arc::clone(&max_seen);
			let completed = Arc::clone(&completed);
			pool.schedule(Box::new(move || {
				let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
				max_seen.fetch_max(now, Ordering::SeqCst);
				std::thread::sleep(Duration::from_millis(10));
				in_flight.fetch_sub(1, Ordering::SeqCst);
				completed.fetch_add(1, Ordering::SeqCst);
			}));
		}

		tokio::time::sleep(Duration::from_millis(200)).await;
		assert_eq!(completed.load(Ordering::SeqCst), 8);
		assert!(max_seen.load(Ordering::SeqCst) <= 2);
	}
}
