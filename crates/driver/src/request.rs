use vlist_core::{Direction, Serial};

/// One request accepted by the driver's input channel (spec.md §4.2).
pub enum DriverRequest<E> {
	Load(PullDirection),
	Modify {
		new_or_update: Vec<E>,
		update_only: Vec<E>,
		remove: Vec<Serial>,
	},
}

/// The side a `Load` request targets. Distinct from [`Direction`] (which
/// also has `None`/`Both` to describe *sets* of directions, e.g. an ignore
/// set) because a single pull always targets exactly one side.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PullDirection {
	Before,
	After,
}

impl PullDirection {
	pub fn as_direction(self) -> Direction {
		match self {
			PullDirection::Before => Direction::Before,
			PullDirection::After => Direction::After,
		}
	}
}
