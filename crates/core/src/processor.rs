use crate::{Comparator, Direction, Element, IgnoreSet, Raw, Serial, Synthesis, Synthesizer};

/// Deterministic, single-threaded maintenance of [`Raw`] (spec.md §4.1).
///
/// `Processor` is a pure data structure: every method is a total function of
/// its inputs and the prior state, with no I/O and no failure modes beyond
/// "comparator isn't a total order", which is the caller's responsibility to
/// avoid (spec.md §4.1 "Failure semantics").
pub struct Processor<E: Element> {
	raw: Raw<E>,
	comparator: Comparator<E>,
	synthesizer: Synthesizer<E>,
}

/// One batch of changes applied by [`Processor::update`].
#[derive(Default)]
pub struct Update<E> {
	pub new_or_update: Vec<E>,
	pub update_only: Vec<E>,
	pub remove: Vec<Serial>,
}

impl<E> Update<E> {
	pub fn new() -> Self {
		Self {
			new_or_update: Vec::new(),
			update_only: Vec::new(),
			remove: Vec::new(),
		}
	}
}

impl<E: Element> Processor<E> {
	pub fn new(comparator: Comparator<E>, synthesizer: Synthesizer<E>) -> Self {
		Self {
			raw: Raw::new(),
			comparator,
			synthesizer,
		}
	}

	pub fn raw(&self) -> &Raw<E> {
		&self.raw
	}

	pub fn len(&self) -> usize {
		self.raw.len()
	}

	pub fn is_empty(&self) -> bool {
		self.raw.is_empty()
	}

	/// Applies `update`, honoring the contiguity filter against `ignore`.
	///
	/// `new_or_update` entries whose serial is already present replace in
	/// place (no contiguity check — see spec.md §4.1 rationale: the filter
	/// exists only to guard against unseen gaps at the boundary, and an
	/// in-place update can't introduce one). Entries with a new serial are
	/// dropped if they would sort strictly outside the current window on a
	/// side not covered by `ignore`.
	pub fn update(&mut self, update: Update<E>, ignore: &IgnoreSet) {
		let before_len = self.raw.len();
		let old_first_sort_key = self.raw.as_slice().first().cloned();
		let old_last_sort_key = self.raw.as_slice().last().cloned();

		let mut dropped = 0usize;
		for elem in update.new_or_update {
			if let Some(idx) = self.raw.index_of_serial(&elem.serial()) {
				self.raw.items_mut()[idx] = elem;
				continue;
			}

			if self.violates_contiguity(&elem, old_first_sort_key.as_ref(), old_last_sort_key.as_ref(), ignore) {
				dropped += 1;
				continue;
			}

			self.raw.items_mut().push(elem);
		}

		for elem in update.update_only {
			if let Some(idx) = self.raw.index_of_serial(&elem.serial()) {
				self.raw.items_mut()[idx] = elem;
			}
		}

		for serial in &update.remove {
			if let Some(idx) = self.raw.index_of_serial(serial) {
				self.raw.items_mut().remove(idx);
			}
		}

		let comparator = self.comparator.clone();
		self.raw.items_mut().sort_by(|a, b| {
			if comparator(a, b) {
				std::cmp::Ordering::Less
			} else if comparator(b, a) {
				std::cmp::Ordering::Greater
			} else {
				std::cmp::Ordering::Equal
			}
		});

		tracing::trace!(before_len, after_len = self.raw.len(), dropped, "vlist.core.update");
	}

	fn violates_contiguity(&self, candidate: &E, old_first: Option<&E>, old_last: Option<&E>, ignore: &IgnoreSet) -> bool {
		let (Some(first), Some(last)) = (old_first, old_last) else {
			// Raw is empty: nothing to guard against yet.
			return false;
		};

		let sorts_before_first = (self.comparator)(candidate, first);
		if sorts_before_first && !ignore.contains(Direction::Before) {
			return true;
		}

		let sorts_after_last = (self.comparator)(last, candidate);
		if sorts_after_last && !ignore.contains(Direction::After) {
			return true;
		}

		false
	}

	/// Walks `Raw` through the synthesizer, producing a fresh [`Synthesis`].
	pub fn synthesize(&self) -> Synthesis<E> {
		Synthesis::build(self.raw.clone(), &self.synthesizer)
	}

	/// Trims `Raw` to respect `max_size`, centered on `viewport`, returning
	/// the serials of every element that left the window.
	///
	/// `synthesis` must be the most recent snapshot produced by
	/// [`Processor::synthesize`] — it supplies the `ToSource` mapping used to
	/// resolve the viewport's serials back into `Raw` indices (spec.md §4.1
	/// "resolved via the most recent ToSource").
	pub fn compact(&mut self, max_size: usize, viewport: (Serial, Serial), synthesis: &Synthesis<E>) -> Vec<Serial> {
		let len = self.raw.len();
		if len <= max_size {
			return Vec::new();
		}

		let vs = Self::resolve_raw_index(synthesis, &viewport.0).unwrap_or(0);
		let ve = Self::resolve_raw_index(synthesis, &viewport.1).unwrap_or(len - 1);
		let (vs, ve) = if vs <= ve { (vs, ve) } else { (ve, vs) };

		let viewport_size = ve - vs + 1;
		// The 3x floor only kicks in once the viewport itself no longer fits
		// inside max_size — otherwise `keep` is just max_size (spec.md §8
		// scenario 4: max_size=4, viewport_size=2 keeps exactly 4, not 6).
		let keep = if viewport_size > max_size { 3 * viewport_size } else { max_size };
		let surplus = keep.saturating_sub(viewport_size);

		let before_avail = vs;
		let after_avail = len - 1 - ve;

		let want_before = surplus / 2;
		let want_after = surplus - want_before;

		let mut actual_before = want_before.min(before_avail);
		let mut actual_after = want_after.min(after_avail);

		let mut leftover = (want_before - actual_before) + (want_after - actual_after);
		if leftover > 0 {
			let room_before = before_avail - actual_before;
			let give_before = leftover.min(room_before);
			actual_before += give_before;
			leftover -= give_before;
		}
		if leftover > 0 {
			let room_after = after_avail - actual_after;
			let give_after = leftover.min(room_after);
			actual_after += give_after;
			leftover -= give_after;
		}
		debug_assert_eq!(leftover, 0, "surplus distribution must exhaust available room on both sides");

		let keep_start = vs - actual_before;
		let keep_end = ve + actual_after;

		let mut compacted = Vec::with_capacity(len - (keep_end - keep_start + 1));
		let items = self.raw.items_mut();
		for (i, item) in items.iter().enumerate() {
			if i < keep_start || i > keep_end {
				let serial = item.serial();
				if serial.is_addressable() {
					compacted.push(serial);
				}
			}
		}

		let retained: Vec<E> = items.drain(keep_start..=keep_end).collect();
		*items = retained;

		tracing::trace!(before_len = len, after_len = self.raw.len(), compacted = compacted.len(), "vlist.core.compact");

		compacted
	}

	fn resolve_raw_index(synthesis: &Synthesis<E>, serial: &Serial) -> Option<usize> {
		let elem_index = synthesis.index_of(serial)?;
		synthesis.to_source().get(elem_index).copied()
	}
}
