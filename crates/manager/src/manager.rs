use rustc_hash::FxHashMap;
use vlist_core::{Direction, Element, Serial, Synthesis};
use vlist_driver::{AsyncDriver, DriverClosedError, DriverConfig, PullDirection, StateUpdate, UpdateKind};

use crate::hooks::{Allocator, Hooks, Presenter};
use crate::position::ListPosition;

/// Tuning knobs independent of the six hooks (spec.md §4.3 "Configuration").
#[derive(Debug, Clone, Copy)]
pub struct ManagerConfig {
	/// Target bound on `|Raw|`, forwarded to the driver unchanged.
	pub max_size: usize,
	/// Fraction of `|Elements|` at either end that triggers prefetch.
	/// Clamped to `[0, 1]` at construction.
	pub prefetch: f64,
	/// Whether a push that lands while the renderer was tracking the tail
	/// should snap the view back to the new tail.
	pub sticks_to_end: bool,
	pub request_capacity: usize,
	pub output_capacity: usize,
}

impl Default for ManagerConfig {
	fn default() -> Self {
		Self {
			max_size: 500,
			prefetch: 0.15,
			sticks_to_end: false,
			request_capacity: 32,
			output_capacity: 32,
		}
	}
}

/// Front-end that exposes an index-based API over the driver's snapshots,
/// drives prefetch, and owns per-element widget state (spec.md §4.3).
///
/// `E` is the element type, `S` is opaque per-element widget state, `R` is
/// whatever the `Presenter` hook produces (a render closure, a widget
/// handle — the core has no opinion).
pub struct ListManager<E: Element, S, R> {
	driver: AsyncDriver<E>,
	output_rx: tokio::sync::mpsc::Receiver<StateUpdate<E>>,
	presenter: Presenter<E, S, R>,
	allocator: Allocator<E, S>,
	widget_state: FxHashMap<Serial, Option<S>>,
	synthesis: Synthesis<E>,
	prefetch: f64,
	sticks_to_end: bool,
	last_prefetch_direction: Direction,
	prefetch_before_sent: u64,
	prefetch_after_sent: u64,
	prefetch_dropped: u64,
}

impl<E: Element, S, R> ListManager<E, S, R> {
	/// Spawns the backing driver and returns an empty manager. `hooks` must
	/// already be validated — see [`crate::HooksBuilder::build`]; pushing
	/// that check to `Hooks`'s own construction keeps this constructor
	/// infallible, which is the idiomatic shape for a type that can't
	/// represent the invalid state in the first place.
	pub fn new(config: ManagerConfig, hooks: Hooks<E, S, R>) -> Self {
		let driver_config = DriverConfig {
			comparator: hooks.comparator,
			synthesizer: hooks.synthesizer,
			loader: hooks.loader,
			invalidator: hooks.invalidator,
			max_size: config.max_size,
			request_capacity: config.request_capacity,
			output_capacity: config.output_capacity,
		};
		let (driver, output_rx) = vlist_driver::spawn(driver_config);

		Self {
			driver,
			output_rx,
			presenter: hooks.presenter,
			allocator: hooks.allocator,
			widget_state: FxHashMap::default(),
			synthesis: Synthesis::default(),
			prefetch: config.prefetch.clamp(0.0, 1.0),
			sticks_to_end: config.sticks_to_end,
			last_prefetch_direction: Direction::None,
			prefetch_before_sent: 0,
			prefetch_after_sent: 0,
			prefetch_dropped: 0,
		}
	}

	/// Reconciles at most one pending snapshot against `list`, then returns
	/// the current element count (spec.md §4.3 "Snapshot reconciliation").
	pub fn updated_len(&mut self, list: &mut ListPosition) -> usize {
		if let Ok(update) = self.output_rx.try_recv() {
			self.reconcile(list, update);
		}
		self.synthesis.len()
	}

	fn reconcile(&mut self, list: &mut ListPosition, update: StateUpdate<E>) {
		let new_index = self.resolve_anchor(list, &update.synthesis);

		let was_tracking_end = list.before_end;
		match update.kind {
			UpdateKind::Pull => list.before_end = true,
			UpdateKind::Push => {
				if self.sticks_to_end && was_tracking_end {
					list.before_end = false;
				}
			}
		}

		list.first_index = new_index;
		self.synthesis = update.synthesis;

		for serial in &update.compacted_serials {
			self.widget_state.remove(serial);
		}

		let start = self.synthesis.get(list.first_index).map(|e| e.serial()).unwrap_or(Serial::NoSerial);
		let end_index = if self.synthesis.is_empty() {
			0
		} else {
			(list.first_index + list.visible_count.saturating_sub(1)).min(self.synthesis.len() - 1)
		};
		let end = self.synthesis.get(end_index).map(|e| e.serial()).unwrap_or(Serial::NoSerial);
		self.driver.set_viewport(start, end);

		tracing::trace!(
			target: "vlist_manager",
			new_first_index = list.first_index,
			compacted = update.compacted_serials.len(),
			"vlist.manager.reconciled"
		);
	}

	/// Maps `list.first_index`'s serial (as of the *old* synthesis) forward
	/// into `new_synthesis`, walking backward through the old elements if
	/// the exact serial no longer exists (spec.md §4.3 step 2).
	fn resolve_anchor(&self, list: &ListPosition, new_synthesis: &Synthesis<E>) -> usize {
		if self.synthesis.is_empty() {
			return 0;
		}

		let mut i = list.first_index.min(self.synthesis.len() - 1);
		loop {
			if let Some(elem) = self.synthesis.get(i) {
				let serial = elem.serial();
				if serial.is_addressable() {
					if let Some(idx) = new_synthesis.index_of(&serial) {
						return idx;
					}
				}
			}
			if i == 0 {
				return 0;
			}
			i -= 1;
		}
	}

	/// Computes render output for `index`, issuing prefetch as a side
	/// effect and allocating widget state on first sight of a serial.
	/// Returns `None` only when the list is currently empty (spec.md §6
	/// "Index out of bounds in layout(index): Clamp" assumes a non-empty
	/// list; an empty one has no index to clamp to).
	pub fn layout(&mut self, index: usize) -> Option<R> {
		if self.synthesis.is_empty() {
			return None;
		}
		let index = index.min(self.synthesis.len() - 1);
		self.maybe_prefetch(index);

		let elem = self.synthesis.get(index)?.clone();
		let serial = elem.serial();
		let state = if serial.is_addressable() {
			self.widget_state.entry(serial).or_insert_with(|| (self.allocator)(&elem)).as_ref()
		} else {
			None
		};

		Some((self.presenter)(&elem, state))
	}

	fn maybe_prefetch(&mut self, index: usize) {
		let len = self.synthesis.len();
		let prefetch = self.prefetch;
		if prefetch <= 0.0 {
			return;
		}

		let f = index as f64 / len.max(1) as f64;
		let can_before = f < prefetch;
		let min_for_after = (1.0 / prefetch).ceil() as usize;
		let can_after = f > 1.0 - prefetch || len < min_for_after;

		let direction = match (can_before, can_after) {
			(true, true) => Some(match self.last_prefetch_direction {
				Direction::Before => PullDirection::After,
				_ => PullDirection::Before,
			}),
			(true, false) => Some(PullDirection::Before),
			(false, true) => Some(PullDirection::After),
			(false, false) => None,
		};

		let Some(direction) = direction else { return };
		if self.driver.try_pull(direction) {
			self.last_prefetch_direction = direction.as_direction();
			match direction {
				PullDirection::Before => self.prefetch_before_sent += 1,
				PullDirection::After => self.prefetch_after_sent += 1,
			}
		} else {
			self.prefetch_dropped += 1;
		}
	}

	pub async fn modify(&self, new_or_update: Vec<E>, update_only: Vec<E>, remove: Vec<Serial>) -> Result<(), DriverClosedError> {
		self.driver.modify(new_or_update, update_only, remove).await
	}

	pub async fn update(&self, new_or_update: Vec<E>) -> Result<(), DriverClosedError> {
		self.modify(new_or_update, Vec::new(), Vec::new()).await
	}

	pub async fn in_place(&self, update_only: Vec<E>) -> Result<(), DriverClosedError> {
		self.modify(Vec::new(), update_only, Vec::new()).await
	}

	pub async fn remove(&self, serials: Vec<Serial>) -> Result<(), DriverClosedError> {
		self.modify(Vec::new(), Vec::new(), serials).await
	}

	pub fn managed_elements(&self) -> &[E] {
		self.synthesis.elements()
	}

	pub fn managed_state(&self) -> &FxHashMap<Serial, Option<S>> {
		&self.widget_state
	}

	pub fn prefetch_stats(&self) -> (u64, u64, u64) {
		(self.prefetch_before_sent, self.prefetch_after_sent, self.prefetch_dropped)
	}
}
