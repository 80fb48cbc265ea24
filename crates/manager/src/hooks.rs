use std::sync::Arc;

use vlist_core::{Comparator, Synthesizer};
use vlist_driver::{Invalidator, LoaderHook};

use crate::error::ConfigError;

/// `(elem, state?) -> render output`. Must be total — always callable, even
/// when `state` is `None` (spec.md §6 "state is null for NoSerial
/// elements").
pub type Presenter<E, S, R> = Arc<dyn Fn(&E, Option<&S>) -> R + Send + Sync>;

/// `(elem) -> state?`. Called at most once per Serial, the first time it is
/// laid out (spec.md §6 "Called once per Serial first seen").
pub type Allocator<E, S> = Arc<dyn Fn(&E) -> Option<S> + Send + Sync>;

/// The six hooks a [`crate::ListManager`] is built from (spec.md §4.3
/// "Construction", §6 "Hook contracts"). Modeled as a struct of function
/// values rather than a trait — there is exactly one implementation per
/// manager instance, so dynamic dispatch at this single seam is plenty
/// (Design Notes §9 "Dynamic dispatch").
pub struct Hooks<E, S, R> {
	pub synthesizer: Synthesizer<E>,
	pub comparator: Comparator<E>,
	pub loader: LoaderHook<E>,
	pub presenter: Presenter<E, S, R>,
	pub allocator: Allocator<E, S>,
	pub invalidator: Invalidator,
}

/// Fails fast with [`ConfigError`] rather than constructing a
/// partially-configured manager (spec.md §7). Every setter consumes and
/// returns `Self`, the standard builder shape.
pub struct HooksBuilder<E, S, R> {
	synthesizer: Option<Synthesizer<E>>,
	comparator: Option<Comparator<E>>,
	loader: Option<LoaderHook<E>>,
	presenter: Option<Presenter<E, S, R>>,
	allocator: Option<Allocator<E, S>>,
	invalidator: Option<Invalidator>,
}

impl<E, S, R> Default for HooksBuilder<E, S, R> {
	fn default() -> Self {
		Self {
			synthesizer: None,
			comparator: None,
			loader: None,
			presenter: None,
			allocator: None,
			invalidator: None,
		}
	}
}

impl<E, S, R> HooksBuilder<E, S, R> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn synthesizer(mut self, value: Synthesizer<E>) -> Self {
		self.synthesizer = Some(value);
		self
	}

	pub fn comparator(mut self, value: Comparator<E>) -> Self {
		self.comparator = Some(value);
		self
	}

	pub fn loader(mut self, value: LoaderHook<E>) -> Self {
		self.loader = Some(value);
		self
	}

	pub fn presenter(mut self, value: Presenter<E, S, R>) -> Self {
		self.presenter = Some(value);
		self
	}

	pub fn allocator(mut self, value: Allocator<E, S>) -> Self {
		self.allocator = Some(value);
		self
	}

	pub fn invalidator(mut self, value: Invalidator) -> Self {
		self.invalidator = Some(value);
		self
	}

	pub fn build(self) -> Result<Hooks<E, S, R>, ConfigError> {
		Ok(Hooks {
			synthesizer: self.synthesizer.ok_or(ConfigError::MissingHook("synthesizer"))?,
			comparator: self.comparator.ok_or(ConfigError::MissingHook("comparator"))?,
			loader: self.loader.ok_or(ConfigError::MissingHook("loader"))?,
			presenter: self.presenter.ok_or(ConfigError::MissingHook("presenter"))?,
			allocator: self.allocator.ok_or(ConfigError::MissingHook("allocator"))?,
			invalidator: self.invalidator.ok_or(ConfigError::MissingHook("invalidator"))?,
		})
	}
}
