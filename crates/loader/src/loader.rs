use std::collections::VecDeque;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;
use tokio::sync::watch;
use vlist_worker::Scheduler;

use crate::context::LoadContext;
use crate::entry::Entry;
use crate::resource::{Resource, ResourceState, Stats};

/// A load closure, boxed once at `Schedule` time and handed to the
/// [`Scheduler`] exactly once — unlike `Schedule` calls themselves, a
/// closure for a given tag never re-runs while its entry survives.
pub type LoadFn<V> = Box<dyn FnOnce(LoadContext) -> V + Send + 'static>;

struct QueueItem<K, V> {
	tag: K,
	entry: Arc<Entry<V>>,
	load_fn: LoadFn<V>,
}

struct LoaderState<K, V> {
	lookup: FxHashMap<K, Arc<Entry<V>>>,
	queue: VecDeque<QueueItem<K, V>>,
	stopped: bool,
}

struct Shared<K, V> {
	state: Mutex<LoaderState<K, V>>,
	wake: Condvar,
	active_frame: AtomicU64,
	finished_frame: AtomicU64,
	max_loaded: usize,
	scheduler: Arc<dyn Scheduler>,
	updates: watch::Sender<u64>,
	lookup_count: AtomicU64,
}

/// A keyed, single-flight, frame-counted cache of asynchronously-produced
/// values (spec.md §4.4 "Resource loader").
///
/// Every distinct tag is loaded at most once while its entry survives in
/// the cache: a `Schedule` for a tag already present only refreshes that
/// entry's frame and returns the current snapshot, it never re-submits the
/// load closure. A single dedicated thread owns the queue and the eviction
/// sweep; the actual load closures run on the injected [`Scheduler`], so a
/// slow load never blocks the next `Schedule` call or the next frame.
pub struct ResourceLoader<K, V> {
	shared: Arc<Shared<K, V>>,
	dispatcher: Option<JoinHandle<()>>,
}

impl<K, V> ResourceLoader<K, V>
where
	K: Eq + Hash + Clone + Send + Sync + 'static,
	V: Clone + Send + Sync + 'static,
{
	pub fn new(max_loaded: usize, scheduler: Arc<dyn Scheduler>) -> Self {
		let (updates, _) = watch::channel(0u64);
		let shared = Arc::new(Shared {
			state: Mutex::new(LoaderState {
				lookup: FxHashMap::default(),
				queue: VecDeque::new(),
				stopped: false,
			}),
			wake: Condvar::new(),
			active_frame: AtomicU64::new(0),
			finished_frame: AtomicU64::new(0),
			max_loaded: max_loaded.max(1),
			scheduler,
			updates,
			lookup_count: AtomicU64::new(0),
		});

		let dispatcher = {
			let shared = Arc::clone(&shared);
			std::thread::Builder::new()
				.name("vlist-loader-dispatch".to_string())
				.spawn(move || run_dispatcher(shared))
				.expect("spawn resource loader dispatcher thread")
		};

		Self {
			shared,
			dispatcher: Some(dispatcher),
		}
	}

	/// Looks up `tag`, submitting a load if this is the first time it has
	/// been seen (or it fell out of the cache since). Always returns
	/// immediately with a copy of the entry's current state.
	pub fn schedule(&self, tag: K, load_fn: impl FnOnce(LoadContext) -> V + Send + 'static) -> Resource<V> {
		self.shared.lookup_count.fetch_add(1, Ordering::Relaxed);
		let current_frame = self.shared.active_frame.load(Ordering::SeqCst);

		let mut state = self.shared.state.lock();
		if let Some(entry) = state.lookup.get(&tag) {
			entry.touch(current_frame);
			let snapshot = entry.snapshot();
			drop(state);
			self.shared.wake.notify_one();
			return snapshot;
		}

		let entry = Arc::new(Entry::new(current_frame));
		state.lookup.insert(tag.clone(), Arc::clone(&entry));
		state.queue.push_back(QueueItem {
			tag,
			entry: Arc::clone(&entry),
			load_fn: Box::new(load_fn),
		});
		let snapshot = entry.snapshot();
		drop(state);

		tracing::trace!(target: "vlist_loader", "vlist.loader.queued");
		self.shared.wake.notify_one();
		snapshot
	}

	/// Runs `render`, bumping the frame counter before and marking it
	/// fully processed after. Entries not touched by a `Schedule` call
	/// during `render` become eligible for eviction once the cache is
	/// over `max_loaded` (spec.md §4.4 "Frame accounting").
	pub fn frame<R>(&self, render: impl FnOnce() -> R) -> R {
		let frame_no = self.shared.active_frame.fetch_add(1, Ordering::SeqCst) + 1;
		let result = render();
		self.shared.finished_frame.store(frame_no, Ordering::SeqCst);
		self.shared.wake.notify_one();
		result
	}

	/// A receiver that observes a new value every time any resource
	/// transitions state. Coalescing, not queuing: a slow subscriber sees
	/// only the latest transition, never a backlog (spec.md §4.4 "Updates").
	pub fn updates(&self) -> watch::Receiver<u64> {
		self.shared.updates.subscribe()
	}

	pub fn stats(&self) -> Stats {
		let state = self.shared.state.lock();
		let (mut loading, mut loaded) = (0u64, 0u64);
		for entry in state.lookup.values() {
			match entry.state() {
				ResourceState::Loading => loading += 1,
				ResourceState::Loaded => loaded += 1,
				ResourceState::Queued => {}
			}
		}
		Stats {
			lookup_count: self.shared.lookup_count.load(Ordering::Relaxed),
			queued_count: state.queue.len() as u64,
			loading_count: loading,
			loaded_count: loaded,
		}
	}
}

impl<K, V> Drop for ResourceLoader<K, V> {
	fn drop(&mut self) {
		self.shared.state.lock().stopped = true;
		self.shared.wake.notify_all();
		if let Some(handle) = self.dispatcher.take() {
			let _ = handle.join();
		}
	}
}

fn run_dispatcher<K, V>(shared: Arc<Shared<K, V>>)
where
	K: Eq + Hash + Clone + Send + Sync + 'static,
	V: Clone + Send + Sync + 'static,
{
	loop {
		let mut state = shared.state.lock();
		loop {
			if state.stopped || !state.queue.is_empty() || state.lookup.len() > shared.max_loaded {
				break;
			}
			shared.wake.wait(&mut state);
		}
		if state.stopped && state.queue.is_empty() {
			return;
		}

		if state.lookup.len() > shared.max_loaded {
			let finished = shared.finished_frame.load(Ordering::SeqCst);
			let before = state.lookup.len();
			state.lookup.retain(|_, entry| entry.frame.load(Ordering::SeqCst) >= finished);
			let evicted = before - state.lookup.len();
			if evicted > 0 {
				tracing::trace!(target: "vlist_loader", evicted, "vlist.loader.purged");
			}
		}

		while let Some(item) = state.queue.pop_front() {
			let finished = shared.finished_frame.load(Ordering::SeqCst);
			if item.entry.frame.load(Ordering::SeqCst) < finished {
				state.lookup.remove(&item.tag);
				continue;
			}

			drop(state);
			item.entry.mark_loading();
			shared.updates.send_modify(|n| *n = n.wrapping_add(1));

			let entry = Arc::clone(&item.entry);
			let updates = shared.updates.clone();
			let load_fn = item.load_fn;
			shared.scheduler.schedule(Box::new(move || {
				let value = load_fn(LoadContext::default());
				entry.mark_loaded(value);
				updates.send_modify(|n| *n = n.wrapping_add(1));
			}));

			state = shared.state.lock();
		}
	}
}
