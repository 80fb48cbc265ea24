/// Returned by [`crate::HooksBuilder::build`] when a required hook was
/// never set (spec.md §7 "Missing hook at construction: Fatal; refuse to
/// construct").
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("missing required hook: {0}")]
	MissingHook(&'static str),
}
