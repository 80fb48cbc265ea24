use std::sync::Arc;

use crate::Element;

/// Strict weak ordering: "a sorts before b". Supplied by the host; the
/// engine assumes it is a sound total order (spec.md §4.1 "Failure
/// semantics") and does not validate it.
pub type Comparator<E> = Arc<dyn Fn(&E, &E) -> bool + Send + Sync>;

/// The contiguous, sorted element set owned by the [`Processor`](crate::Processor).
///
/// `Raw` never holds a gap with respect to the external data source: see
/// `Processor::update`'s contiguity filter for how that invariant is upheld.
#[derive(Clone, Debug, Default)]
pub struct Raw<E> {
	items: Vec<E>,
}

impl<E: Element> Raw<E> {
	pub fn new() -> Self {
		Self { items: Vec::new() }
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn as_slice(&self) -> &[E] {
		&self.items
	}

	pub fn index_of_serial(&self, serial: &crate::Serial) -> Option<usize> {
		if !serial.is_addressable() {
			return None;
		}
		self.items.iter().position(|e| &e.serial() == serial)
	}

	pub(crate) fn items_mut(&mut self) -> &mut Vec<E> {
		&mut self.items
	}
}
