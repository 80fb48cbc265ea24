/// Returned when a caller reaches for a driver whose request channel has
/// already been closed (the driver task exited because every sender was
/// dropped, or it was asked to shut down). Not named in spec.md's original
/// failure table — a Rust channel `send` is fallible where the source
/// system's send to a running goroutine is not observably so at the call
/// site.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("driver is no longer accepting requests")]
pub struct DriverClosedError;
