use std::sync::Arc;

/// Opaque identity of an [`Element`](crate::Element).
///
/// `Serial::NoSerial` marks a stateless, synthesized element (a date
/// separator, a boundary sentinel) that is not addressable by identity and
/// for which no widget state is ever allocated.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Serial {
	Id(Arc<str>),
	NoSerial,
}

impl Serial {
	pub fn new(id: impl Into<Arc<str>>) -> Self {
		Self::Id(id.into())
	}

	pub fn is_addressable(&self) -> bool {
		!matches!(self, Self::NoSerial)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Id(s) => Some(s),
			Self::NoSerial => None,
		}
	}
}

impl From<&str> for Serial {
	fn from(s: &str) -> Self {
		Self::Id(Arc::from(s))
	}
}

impl From<String> for Serial {
	fn from(s: String) -> Self {
		Self::Id(Arc::from(s))
	}
}
