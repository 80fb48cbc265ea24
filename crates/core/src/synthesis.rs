use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{Element, Neighbor, Raw, Serial};

/// `(prev, curr, next) -> Elements[]`. May return an empty `Vec` to hide
/// `curr`, or several elements (e.g. a date separator ahead of the message
/// itself). `prev` is [`Neighbor::Start`] at the head of `Raw`, `next` is
/// [`Neighbor::End`] at the tail.
pub type Synthesizer<E> = Arc<dyn Fn(Neighbor<'_, E>, &E, Neighbor<'_, E>) -> Vec<E> + Send + Sync>;

/// The derived, presentable view over `Raw` (spec.md §3 "Synthesis").
///
/// `Raw`, `Elements`, `ToSource` and `SerialToIndex` are kept inside one
/// value so that indices from one field can never outlive or cross another
/// snapshot's — Design Notes §9 "Arena + indices instead of pointer graphs".
/// Every field is `Arc`-backed so cloning a `Synthesis` (handed to the
/// front-end by value, per spec.md §3 "Ownership") is cheap.
#[derive(Clone)]
pub struct Synthesis<E> {
	elements: Arc<[E]>,
	to_source: Arc<[usize]>,
	serial_to_index: Arc<FxHashMap<Serial, usize>>,
	source: Raw<E>,
}

impl<E: Element> Synthesis<E> {
	pub fn elements(&self) -> &[E] {
		&self.elements
	}

	pub fn to_source(&self) -> &[usize] {
		&self.to_source
	}

	pub fn index_of(&self, serial: &Serial) -> Option<usize> {
		if !serial.is_addressable() {
			return None;
		}
		self.serial_to_index.get(serial).copied()
	}

	pub fn source(&self) -> &Raw<E> {
		&self.source
	}

	pub fn len(&self) -> usize {
		self.elements.len()
	}

	pub fn is_empty(&self) -> bool {
		self.elements.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&E> {
		self.elements.get(index)
	}

	/// First and last addressable serials presently in the synthesis, used
	/// to derive the viewport's anchor serials (spec.md §3 "Viewport").
	pub fn first_serial(&self) -> Serial {
		self.elements.first().map(|e| e.serial()).unwrap_or(Serial::NoSerial)
	}

	pub fn last_serial(&self) -> Serial {
		self.elements.last().map(|e| e.serial()).unwrap_or(Serial::NoSerial)
	}

	pub(crate) fn build(source: Raw<E>, synthesizer: &Synthesizer<E>) -> Self {
		let raw = source.as_slice();
		let mut elements = Vec::with_capacity(raw.len());
		let mut to_source = Vec::with_capacity(raw.len());
		let mut serial_to_index = FxHashMap::default();

		for i in 0..raw.len() {
			let prev = if i == 0 { Neighbor::Start } else { Neighbor::Elem(&raw[i - 1]) };
			let curr = &raw[i];
			let next = if i + 1 == raw.len() { Neighbor::End } else { Neighbor::Elem(&raw[i + 1]) };

			for produced in synthesizer(prev, curr, next) {
				let serial = produced.serial();
				if serial.is_addressable() {
					serial_to_index.insert(serial, elements.len());
				}
				elements.push(produced);
				to_source.push(i);
			}
		}

		tracing::trace!(raw_len = raw.len(), synthesized_len = elements.len(), "vlist.core.synthesize");

		Self {
			elements: Arc::from(elements),
			to_source: Arc::from(to_source),
			serial_to_index: Arc::new(serial_to_index),
			source,
		}
	}
}

impl<E: Element> Default for Synthesis<E> {
	fn default() -> Self {
		Self {
			elements: Arc::from(Vec::new()),
			to_source: Arc::from(Vec::new()),
			serial_to_index: Arc::new(FxHashMap::default()),
			source: Raw::new(),
		}
	}
}
