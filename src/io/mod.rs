//! Byte-flow duplication adapters.
//!
//! Both adapters wrap `std::io` traits and leave the primary flow untouched:
//!
//! - [`TeeReader`] copies every byte read from a source into a side writer.
//! - [`FanOutWriter`] writes every buffer to a primary sink, then to a mirror.

mod fan_out;
mod tee;

pub use fan_out::FanOutWriter;
pub use tee::TeeReader;
