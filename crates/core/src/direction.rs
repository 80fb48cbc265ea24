/// Compact algebra over "before the window" / "after the window".
///
/// `Before` means older / sorts-less; `After` means newer / sorts-greater.
/// Kept as a hand-rolled 4-state enum rather than reaching for `bitflags`:
/// two bits do not earn the dependency.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Direction {
	#[default]
	None,
	Before,
	After,
	Both,
}

impl Direction {
	pub fn add(self, other: Direction) -> Direction {
		match (self, other) {
			(Direction::None, x) => x,
			(x, Direction::None) => x,
			(Direction::Both, _) | (_, Direction::Both) => Direction::Both,
			(a, b) if a == b => a,
			_ => Direction::Both,
		}
	}

	pub fn contains(self, other: Direction) -> bool {
		match other {
			Direction::None => true,
			Direction::Before => matches!(self, Direction::Before | Direction::Both),
			Direction::After => matches!(self, Direction::After | Direction::Both),
			Direction::Both => matches!(self, Direction::Both),
		}
	}

	pub fn remove(self, other: Direction) -> Direction {
		match (self, other) {
			(_, Direction::None) => self,
			(Direction::Both, Direction::Before) => Direction::After,
			(Direction::Both, Direction::After) => Direction::Before,
			(Direction::Both, Direction::Both) => Direction::None,
			(a, b) if a == b => Direction::None,
			_ => self,
		}
	}

	pub fn is_none(self) -> bool {
		matches!(self, Direction::None)
	}
}

/// Directions known to be exhausted until invalidated by a push modification
/// or a successful load in the opposite direction.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreSet(Direction);

impl IgnoreSet {
	pub fn new() -> Self {
		Self(Direction::None)
	}

	pub fn contains(&self, dir: Direction) -> bool {
		self.0.contains(dir)
	}

	pub fn mark_exhausted(&mut self, dir: Direction) {
		self.0 = self.0.add(dir);
	}

	/// Clears the direction opposite `dir`: a successful load in `dir`
	/// invalidates only the opposite boundary's exhaustion. A direction
	/// already marked exhausted never reaches the loader again until the
	/// other side proves the sequence has grown, so this only ever needs
	/// to clear the far side, never `dir` itself.
	pub fn clear_opposite(&mut self, dir: Direction) {
		let opposite = match dir {
			Direction::Before => Direction::After,
			Direction::After => Direction::Before,
			other => other,
		};
		self.0 = self.0.remove(opposite);
	}

	pub fn clear(&mut self) {
		self.0 = Direction::None;
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_none()
	}
}
