//! Blocking frame writer over a byte sink.

use super::Encoder;
use crate::config::DEFAULT_WRITE_BUFFER_CAPACITY;
use bytes::BytesMut;
use std::io::Write;

/// Writes frames to a byte sink with an [`Encoder`].
///
/// Each [`send`](Self::send) encodes one item into an internal buffer and
/// hands the whole frame to the sink in a single `write_all`, then flushes.
/// An item that encodes to nothing is handed over as one empty `write`.
#[derive(Debug)]
pub struct FramedWrite<W, E> {
    inner: W,
    encoder: E,
    buffer: BytesMut,
}

impl<W, E> FramedWrite<W, E> {
    /// Creates a writer with the default buffer capacity.
    pub fn new(inner: W, encoder: E) -> Self {
        Self::with_capacity(DEFAULT_WRITE_BUFFER_CAPACITY, inner, encoder)
    }

    /// Creates a writer whose encode buffer starts at `capacity` bytes.
    pub fn with_capacity(capacity: usize, inner: W, encoder: E) -> Self {
        Self {
            inner,
            encoder,
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Gets a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Gets a mutable reference to the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Gets a reference to the encoder.
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Gets a mutable reference to the encoder.
    pub fn encoder_mut(&mut self) -> &mut E {
        &mut self.encoder
    }
}

impl<W: Write, E> FramedWrite<W, E> {
    /// Encodes `item` and writes the frame to the sink.
    ///
    /// Nothing reaches the sink if encoding fails. The buffer is cleared
    /// after every call, so a failed write never leaks into the next frame.
    pub fn send<I>(&mut self, item: I) -> Result<(), <E as Encoder<I>>::Error>
    where
        E: Encoder<I>,
    {
        let encoded = self.encoder.encode(item, &mut self.buffer);
        let result = match encoded {
            Ok(()) => self.write_frame().map_err(Into::into),
            Err(e) => Err(e),
        };
        self.buffer.clear();
        result
    }

    fn write_frame(&mut self) -> std::io::Result<()> {
        if self.buffer.is_empty() {
            let written = self.inner.write(&self.buffer)?;
            debug_assert_eq!(written, 0);
        } else {
            self.inner.write_all(&self.buffer)?;
        }
        self.inner.flush()
    }
}
