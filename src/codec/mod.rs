//! Codec traits, framed drivers and built-in codecs.
//!
//! This module provides the `Decoder` and `Encoder` traits, the blocking
//! `FramedRead`/`FramedWrite` drivers that move frames between a codec and a
//! byte stream, and the `LinesCodec` and RESP3 `RespCodec` implementations.

pub mod decoder;
pub mod encoder;
pub mod framed_read;
pub mod framed_write;
pub mod lines;
pub mod resp;

pub use decoder::Decoder;
pub use encoder::{BytesCodec, Encoder};
pub use framed_read::FramedRead;
pub use framed_write::FramedWrite;
pub use lines::{LinesCodec, LinesCodecError};
pub use resp::{RespCodec, RespError, Value};
