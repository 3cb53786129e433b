//! Connection splitting for traced streams.
//!
//! Connection establishment stays with the caller; this module only turns an
//! established connection into owned read/write halves.

mod split;

pub use split::{OwnedReadHalf, OwnedWriteHalf, Split};
