//! Wire trace tap.
//!
//! A trace tap wraps the two halves of a connection so that a diagnostic
//! callback observes every byte written and every byte consumed by a
//! successful decode, while the stream and the codec see exactly what they
//! would see without it.
//!
//! # Architecture
//!
//! ```text
//!   send(item) ─► Encoder ─► FanOutWriter ─┬─► stream (write_all)
//!                                          └─► TapWriter::outbound ─► callback
//!
//!   stream ─► TeeReader ─┬─► FramedRead buffer ─► Decoder ─► decode() ─► value
//!                        └─► TapWriter::inbound ─► SpanAccumulator
//!                                                    │ on success
//!                                                    └─► callback
//! ```
//!
//! # Guarantees
//!
//! - **Outbound**: one span per frame, identical to the bytes written, in
//!   write order. Frames the stream rejects are not reported.
//! - **Inbound**: one span per decoded value, equal to exactly the bytes the
//!   decoder consumed for it. Read-ahead is attributed to the next value.
//!   Bytes consumed by a failed decode are dropped and never reported.
//! - **Serialized dispatch**: callback calls from one connection never
//!   overlap; the dispatch lock is held only while the callback runs.
//! - **Transparency**: errors from the stream or codec are returned as is.
//!
//! # Example
//!
//! ```
//! use resptap::codec::Value;
//! use resptap::tap::{self, Direction};
//! use std::io::Cursor;
//!
//! let reply = Cursor::new(b"+OK\r\n".to_vec());
//! let mut seen = Vec::new();
//! let (tx, rx) = std::sync::mpsc::channel();
//! let (mut enc, mut dec) = tap::tracer(
//!     move |direction: Direction, data: &[u8]| {
//!         let _ = tx.send((direction, data.to_vec()));
//!     },
//!     (reply, Vec::<u8>::new()),
//! )?;
//!
//! enc.send(Value::command(["SET", "mykey", "Hello"]))?;
//! assert_eq!(dec.decode()?, Some(Value::SimpleString("OK".into())));
//!
//! seen.extend(rx.try_iter());
//! assert_eq!(seen.len(), 2);
//! assert_eq!(seen[1], (Direction::Inbound, b"+OK\r\n".to_vec()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod callback;
mod decoder;
mod encoder;
mod span;
mod state;
mod writer;

pub use callback::{Direction, NoopCallback, TraceCallback, WriterCallback};
#[cfg(feature = "tracing-integration")]
pub use callback::LogCallback;
pub use decoder::TracedDecoder;
pub use encoder::TracedEncoder;
pub use span::{SpanAccumulator, SpanState};
pub use state::{TraceState, TraceStatsSnapshot};
pub use writer::TapWriter;

use crate::codec::RespCodec;
use crate::config::{ConfigError, TraceConfig};
use crate::net::Split;
use crate::tracing_compat::debug;
use core::fmt;
use std::io;
use std::sync::Arc;

/// Builder for a traced encoder/decoder pair.
pub struct TraceTap {
    callback: Box<dyn TraceCallback>,
    config: TraceConfig,
}

impl TraceTap {
    /// Creates a tap reporting to `callback` with the default configuration.
    pub fn new(callback: impl TraceCallback + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            config: TraceConfig::default(),
        }
    }

    /// Replaces the configuration after validating it.
    pub fn with_config(mut self, config: TraceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Splits `stream` and builds the traced pair around its halves.
    pub fn build<S, E, D>(
        self,
        stream: S,
        encoder: E,
        decoder: D,
    ) -> io::Result<(TracedEncoder<S::Writer, E>, TracedDecoder<S::Reader, D>)>
    where
        S: Split,
    {
        let (reader, writer) = stream.into_split()?;
        Ok(self.build_split(reader, writer, encoder, decoder))
    }

    /// Builds the traced pair around already split stream halves.
    pub fn build_split<R, W, E, D>(
        self,
        reader: R,
        writer: W,
        encoder: E,
        decoder: D,
    ) -> (TracedEncoder<W, E>, TracedDecoder<R, D>) {
        let Self { callback, config } = self;
        let state = Arc::new(TraceState::new(callback, config.span_capacity));
        debug!(
            read_chunk_size = config.read_chunk_size,
            span_capacity = config.span_capacity,
            "trace tap built"
        );
        (
            TracedEncoder::new(
                writer,
                encoder,
                Arc::clone(&state),
                config.write_buffer_capacity,
            ),
            TracedDecoder::new(reader, decoder, state, config.read_chunk_size),
        )
    }
}

impl fmt::Debug for TraceTap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceTap")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builds a traced RESP3 encoder/decoder pair over `stream`.
///
/// Shorthand for [`TraceTap::new`] followed by [`TraceTap::build`] with two
/// default [`RespCodec`]s.
pub fn tracer<C, S>(
    callback: C,
    stream: S,
) -> io::Result<(
    TracedEncoder<S::Writer, RespCodec>,
    TracedDecoder<S::Reader, RespCodec>,
)>
where
    C: TraceCallback + 'static,
    S: Split,
{
    TraceTap::new(callback).build(stream, RespCodec::new(), RespCodec::new())
}
