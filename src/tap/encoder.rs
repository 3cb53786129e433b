//! Traced outbound half.

use super::state::{TraceState, TraceStatsSnapshot};
use super::writer::TapWriter;
use crate::codec::{Encoder, FramedWrite};
use crate::io::FanOutWriter;
use std::io::{self, Write};
use std::sync::Arc;

/// Frame writer that reports every frame to the trace callback.
///
/// Writes go to the stream first and then, as the identical slice, to the
/// outbound tap. One [`send`](Self::send) is one outbound span, empty when
/// the item encodes to nothing. Raw writes
/// through the [`Write`] impl are traced the same way, one span per write
/// call.
#[derive(Debug)]
pub struct TracedEncoder<W, E> {
    framed: FramedWrite<FanOutWriter<W, TapWriter>, E>,
    state: Arc<TraceState>,
}

impl<W, E> TracedEncoder<W, E> {
    pub(crate) fn new(writer: W, encoder: E, state: Arc<TraceState>, capacity: usize) -> Self {
        let sink = FanOutWriter::new(writer, TapWriter::outbound(Arc::clone(&state)));
        Self {
            framed: FramedWrite::with_capacity(capacity, sink, encoder),
            state,
        }
    }

    /// Gets a reference to the underlying stream half.
    pub fn get_ref(&self) -> &W {
        self.framed.get_ref().primary()
    }

    /// Gets a mutable reference to the underlying stream half.
    ///
    /// Bytes written through it bypass the tap.
    pub fn get_mut(&mut self) -> &mut W {
        self.framed.get_mut().primary_mut()
    }

    /// Gets a reference to the encoder.
    pub fn encoder(&self) -> &E {
        self.framed.encoder()
    }

    /// Gets a mutable reference to the encoder.
    pub fn encoder_mut(&mut self) -> &mut E {
        self.framed.encoder_mut()
    }

    /// Returns the trace state shared with the decoder half.
    pub fn trace_state(&self) -> &TraceState {
        &self.state
    }

    /// Returns a snapshot of the connection's trace counters.
    pub fn stats(&self) -> TraceStatsSnapshot {
        self.state.stats()
    }

    /// Returns the underlying stream half, detaching it from the tap.
    pub fn into_inner(self) -> W {
        self.framed.into_inner().into_parts().0
    }
}

impl<W: Write, E> TracedEncoder<W, E> {
    /// Encodes `item`, writes it to the stream and reports it as one outbound span.
    ///
    /// Encoder and stream errors are returned unchanged. A frame the stream
    /// rejects is not reported.
    pub fn send<I>(&mut self, item: I) -> Result<(), <E as Encoder<I>>::Error>
    where
        E: Encoder<I>,
    {
        self.framed.send(item)
    }
}

impl<W: Write, E> Write for TracedEncoder<W, E> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.framed.get_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.framed.get_mut().flush()
    }
}
