use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::mpsc;
use vlist_core::{Comparator, Element, IgnoreSet, Processor, Serial, Synthesizer, Update};

use crate::error::DriverClosedError;
use crate::hooks::{Invalidator, LoaderHook};
use crate::output::{StateUpdate, UpdateKind};
use crate::request::{DriverRequest, PullDirection};

/// Construction parameters for [`spawn`].
pub struct DriverConfig<E> {
	pub comparator: Comparator<E>,
	pub synthesizer: Synthesizer<E>,
	pub loader: LoaderHook<E>,
	pub invalidator: Invalidator,
	pub max_size: usize,
	/// Capacity of the request channel. Pull requests are sent with
	/// `try_send` (spec.md §4.3 step 5); push requests block, so this bound
	/// only ever applies real backpressure to the push path.
	pub request_capacity: usize,
	/// Capacity of the output channel. Sized generously — a slow reader
	/// observes a backlog of queued updates, in order, rather than a
	/// coalesced or dropped one (see [`spawn`]); once full, the driver
	/// blocks on emitting the next update until the reader catches up.
	pub output_capacity: usize,
}

/// A handle to a running driver task. Owns the input side of the request
/// channel and the viewport hint; the task itself owns the [`Processor`]
/// exclusively (spec.md §3 "Ownership").
///
/// Deliberately not a generic `Actor` trait implementation: this is a
/// single, fixed state machine, and a trait-object seam buys nothing here.
pub struct AsyncDriver<E> {
	request_tx: mpsc::Sender<DriverRequest<E>>,
	viewport: Arc<ArcSwapOption<(Serial, Serial)>>,
}

impl<E: Element> AsyncDriver<E> {
	/// Attempts to enqueue a pull. Never blocks; returns `false` if the
	/// channel is momentarily full (spec.md §4.3 step 5 "try-send").
	pub fn try_pull(&self, direction: PullDirection) -> bool {
		self.request_tx.try_send(DriverRequest::Load(direction)).is_ok()
	}

	/// Enqueues a push modification, blocking until the driver accepts it
	/// (spec.md §5 "Modification requests may block by design").
	pub async fn modify(&self, new_or_update: Vec<E>, update_only: Vec<E>, remove: Vec<Serial>) -> Result<(), DriverClosedError> {
		self.request_tx
			.send(DriverRequest::Modify { new_or_update, update_only, remove })
			.await
			.map_err(|_| DriverClosedError)
	}

	/// Latest-wins hint consumed by the driver to anchor the next
	/// compaction (spec.md §4.3 step 7, §3 "Viewport channel").
	pub fn set_viewport(&self, start: Serial, end: Serial) {
		self.viewport.store(Some(Arc::new((start, end))));
	}
}

/// Spawns the driver task and returns a handle plus the output receiver.
/// Closing every clone of the returned handle (or dropping it) terminates
/// the task; its output channel then closes in turn (spec.md §4.2
/// "Termination").
pub fn spawn<E>(config: DriverConfig<E>) -> (AsyncDriver<E>, mpsc::Receiver<StateUpdate<E>>)
where
	E: Element,
{
	let (request_tx, request_rx) = mpsc::channel(config.request_capacity.max(1));
	let (output_tx, output_rx) = mpsc::channel(config.output_capacity.max(1));
	let viewport = Arc::new(ArcSwapOption::from(None));

	let handle = AsyncDriver {
		request_tx,
		viewport: Arc::clone(&viewport),
	};

	tokio::spawn(run(
		Processor::new(config.comparator, config.synthesizer),
		request_rx,
		output_tx,
		viewport,
		config.loader,
		config.invalidator,
		config.max_size,
	));

	(handle, output_rx)
}

async fn run<E>(
	mut processor: Processor<E>,
	mut request_rx: mpsc::Receiver<DriverRequest<E>>,
	output_tx: mpsc::Sender<StateUpdate<E>>,
	viewport: Arc<ArcSwapOption<(Serial, Serial)>>,
	loader: LoaderHook<E>,
	invalidator: Invalidator,
	max_size: usize,
) where
	E: Element,
{
	let mut ignore = IgnoreSet::new();
	let mut synthesis = processor.synthesize();

	while let Some(request) = request_rx.recv().await {
		let kind;
		let preserve_list_end;

		match request {
			DriverRequest::Load(direction) => {
				let dir = direction.as_direction();
				if ignore.contains(dir) {
					tracing::trace!(target: "vlist_driver", ?dir, "vlist.driver.load_ignored");
					continue;
				}

				let anchor = match direction {
					PullDirection::Before => synthesis.first_serial(),
					PullDirection::After => synthesis.last_serial(),
				};

				let batch = invoke_loader(&loader, direction, anchor);

				let mut update = Update::new();
				if batch.is_empty() {
					ignore.mark_exhausted(dir);
					tracing::trace!(target: "vlist_driver", ?dir, "vlist.driver.load_exhausted");
				} else {
					ignore.clear_opposite(dir);
					update.new_or_update = batch;
				}

				processor.update(update, &ignore);
				kind = UpdateKind::Pull;
				preserve_list_end = false;
			}
			DriverRequest::Modify { new_or_update, update_only, remove } => {
				let update = Update {
					new_or_update,
					update_only,
					remove,
				};
				processor.update(update, &ignore);
				ignore.clear();
				kind = UpdateKind::Push;
				preserve_list_end = true;
			}
		}

		synthesis = processor.synthesize();
		let mut compacted_serials = Vec::new();
		if processor.len() > max_size {
			let anchor = viewport
				.load_full()
				.map(|v| (*v).clone())
				.unwrap_or_else(|| (synthesis.first_serial(), synthesis.last_serial()));
			compacted_serials = processor.compact(max_size, anchor, &synthesis);
			if !compacted_serials.is_empty() {
				synthesis = processor.synthesize();
			}
		}

		let state_update = StateUpdate {
			synthesis: synthesis.clone(),
			compacted_serials,
			preserve_list_end,
			kind,
		};

		// A full output channel must still deliver every update in order
		// (spec.md §5 "queued ... never a reordering"): block here rather
		// than dropping the newest update, same as the push path's
		// deliberate backpressure.
		if output_tx.send(state_update).await.is_err() {
			break;
		}

		invalidator();
	}
}

fn invoke_loader<E>(loader: &LoaderHook<E>, direction: PullDirection, anchor: Serial) -> Vec<E> {
	match std::panic::catch_unwind(AssertUnwindSafe(|| loader(direction, anchor))) {
		Ok(batch) => batch,
		Err(_) => {
			tracing::error!(target: "vlist_driver", "vlist.driver.loader_panicked");
			Vec::new()
		}
	}
}
