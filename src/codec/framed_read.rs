//! Blocking frame reader over a byte source.

use super::Decoder;
use crate::config::DEFAULT_READ_CHUNK_SIZE;
use bytes::BytesMut;
use std::io::{self, Read};

/// Reads frames from a byte source with a [`Decoder`].
///
/// `FramedRead` owns the only read buffer between the source and the decoder.
/// Bytes are pulled from the source in chunks of `read_chunk_size`; anything
/// read past the end of the current frame stays buffered for the next call.
#[derive(Debug)]
pub struct FramedRead<R, D> {
    inner: R,
    decoder: D,
    buffer: BytesMut,
    read_chunk_size: usize,
    eof: bool,
}

impl<R, D> FramedRead<R, D> {
    /// Creates a reader with the default chunk size.
    pub fn new(inner: R, decoder: D) -> Self {
        Self::with_chunk_size(DEFAULT_READ_CHUNK_SIZE, inner, decoder)
    }

    /// Creates a reader pulling `read_chunk_size` bytes per read.
    ///
    /// A zero chunk size is bumped to one byte.
    pub fn with_chunk_size(read_chunk_size: usize, inner: R, decoder: D) -> Self {
        let read_chunk_size = read_chunk_size.max(1);
        Self {
            inner,
            decoder,
            buffer: BytesMut::with_capacity(read_chunk_size),
            read_chunk_size,
            eof: false,
        }
    }

    /// Gets a reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Gets a mutable reference to the underlying source.
    ///
    /// Reading from it directly bypasses the frame buffer.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Returns the underlying source. Buffered bytes are dropped.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Gets a reference to the decoder.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Gets a mutable reference to the decoder.
    pub fn decoder_mut(&mut self) -> &mut D {
        &mut self.decoder
    }

    /// Bytes read from the source and not yet consumed by the decoder.
    pub fn read_buffer(&self) -> &BytesMut {
        &self.buffer
    }

    /// Returns `true` once the source reported end of stream.
    pub fn is_eof(&self) -> bool {
        self.eof
    }
}

impl<R: Read, D: Decoder> FramedRead<R, D> {
    /// Reads the next frame.
    ///
    /// Blocks on the source until the decoder yields a frame. Returns
    /// `Ok(None)` at a clean end of stream; a stream ending mid-frame is
    /// reported by the decoder's `decode_eof`.
    pub fn read_frame(&mut self) -> Result<Option<D::Item>, D::Error> {
        loop {
            if self.eof {
                return self.decoder.decode_eof(&mut self.buffer);
            }
            if let Some(frame) = self.decoder.decode(&mut self.buffer)? {
                return Ok(Some(frame));
            }
            if self.fill_buf()? == 0 {
                self.eof = true;
            }
        }
    }

    fn fill_buf(&mut self) -> io::Result<usize> {
        let start = self.buffer.len();
        self.buffer.resize(start + self.read_chunk_size, 0);
        loop {
            match self.inner.read(&mut self.buffer[start..]) {
                Ok(n) => {
                    self.buffer.truncate(start + n);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.buffer.truncate(start);
                    return Err(e);
                }
            }
        }
    }
}

impl<R: Read, D: Decoder> Iterator for FramedRead<R, D> {
    type Item = Result<D::Item, D::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}
