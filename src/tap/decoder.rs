//! Traced inbound half.

use super::state::{TraceState, TraceStatsSnapshot};
use super::writer::TapWriter;
use crate::codec::{Decoder, FramedRead};
use crate::io::TeeReader;
use std::io::Read;
use std::sync::Arc;

/// Frame reader that reports the bytes of every decoded value to the trace callback.
///
/// The stream feeds a [`TeeReader`] that copies each chunk into the pending
/// inbound span before it lands in the single read buffer owned by the inner
/// [`FramedRead`]. The decoder works on that buffer only, so read-ahead is
/// seen exactly once by both paths.
///
/// After a decode returns a value, the bytes it consumed are delivered as one
/// inbound span; read-ahead stays pending for the next value. After a failed
/// decode the consumed bytes are dropped without reaching the callback.
#[derive(Debug)]
pub struct TracedDecoder<R, D> {
    framed: FramedRead<TeeReader<R, TapWriter>, D>,
    state: Arc<TraceState>,
}

impl<R, D> TracedDecoder<R, D> {
    pub(crate) fn new(reader: R, decoder: D, state: Arc<TraceState>, chunk_size: usize) -> Self {
        let source = TeeReader::new(reader, TapWriter::inbound(Arc::clone(&state)));
        Self {
            framed: FramedRead::with_chunk_size(chunk_size, source, decoder),
            state,
        }
    }

    /// Gets a reference to the underlying stream half.
    pub fn get_ref(&self) -> &R {
        self.framed.get_ref().get_ref()
    }

    /// Gets a reference to the decoder.
    pub fn decoder(&self) -> &D {
        self.framed.decoder()
    }

    /// Gets a mutable reference to the decoder.
    pub fn decoder_mut(&mut self) -> &mut D {
        self.framed.decoder_mut()
    }

    /// Returns the trace state shared with the encoder half.
    pub fn trace_state(&self) -> &TraceState {
        &self.state
    }

    /// Returns a snapshot of the connection's trace counters.
    pub fn stats(&self) -> TraceStatsSnapshot {
        self.state.stats()
    }
}

impl<R: Read, D: Decoder> TracedDecoder<R, D> {
    /// Decodes the next value.
    ///
    /// Returns `Ok(None)` at a clean end of stream. Stream and decoder errors
    /// are returned unchanged.
    pub fn decode(&mut self) -> Result<Option<D::Item>, D::Error> {
        let result = self.framed.read_frame();
        let unconsumed = self.framed.read_buffer().len();
        if matches!(result, Ok(Some(_))) {
            self.state.complete_inbound(unconsumed);
        } else {
            self.state.discard_inbound(unconsumed);
        }
        result
    }
}

impl<R: Read, D: Decoder> Iterator for TracedDecoder<R, D> {
    type Item = Result<D::Item, D::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode().transpose()
    }
}
