//! Sorted, windowed element set and synthesis/compaction core.
//!
//! This crate is the pure, synchronous half of the list engine: it holds no
//! channel, thread, or async runtime handle. [`vlist-driver`](../vlist_driver)
//! owns one [`Processor`] per list and serializes access to it.

mod direction;
mod element;
mod processor;
mod raw;
mod serial;
mod synthesis;

pub use direction::{Direction, IgnoreSet};
pub use element::{Element, Neighbor};
pub use processor::{Processor, Update};
pub use raw::{Comparator, Raw};
pub use serial::Serial;
pub use synthesis::{Synthesis, Synthesizer};
