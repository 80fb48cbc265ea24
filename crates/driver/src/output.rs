use vlist_core::{Serial, Synthesis};

/// Which side of the algorithm in spec.md §4.2 produced a [`StateUpdate`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UpdateKind {
	Pull,
	Push,
}

/// One emission on the driver's output channel. A slow reader may observe
/// these queued (never reordered — spec.md §5 "Ordering guarantees") or,
/// once the bounded channel is full, coalesced down to the latest (see
/// [`crate::driver`] for the try-send rationale).
#[derive(Clone)]
pub struct StateUpdate<E> {
	pub synthesis: Synthesis<E>,
	pub compacted_serials: Vec<Serial>,
	pub preserve_list_end: bool,
	pub kind: UpdateKind,
}
