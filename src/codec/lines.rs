//! Newline-delimited text codec.

use super::{Decoder, Encoder};
use bytes::{Buf, BytesMut};
use std::io;
use thiserror::Error;

/// Errors from [`LinesCodec`].
#[derive(Debug, Error)]
pub enum LinesCodecError {
    /// A line grew past the configured maximum without a terminator.
    #[error("line length limit exceeded")]
    MaxLineLengthExceeded,
    /// A complete line was not valid UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
    /// I/O error from the underlying stream.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Codec splitting a byte stream into `\n`-terminated lines.
///
/// A trailing `\r` is stripped from decoded lines. Encoded lines get a single
/// `\n` appended. Once a line exceeds `max_length` the decoder errors; the
/// offending bytes stay in the buffer, so the stream should be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinesCodec {
    max_length: usize,
    /// Offset into the buffer already scanned for `\n`.
    next_index: usize,
}

impl LinesCodec {
    /// Creates a codec with no line length limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_length: usize::MAX,
            next_index: 0,
        }
    }

    /// Creates a codec rejecting lines longer than `max_length` bytes
    /// (terminator excluded).
    #[must_use]
    pub const fn new_with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
        }
    }

    /// Returns the maximum line length.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for LinesCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LinesCodec {
    type Item = String;
    type Error = LinesCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        let search_end = src.len().min(self.max_length.saturating_add(1));
        let start = self.next_index.min(search_end);
        let Some(offset) = memchr::memchr(b'\n', &src[start..search_end]) else {
            if src.len() > self.max_length {
                return Err(LinesCodecError::MaxLineLengthExceeded);
            }
            self.next_index = search_end;
            return Ok(None);
        };

        let newline = start + offset;
        self.next_index = 0;
        let mut line = &src[..newline];
        if let [rest @ .., b'\r'] = line {
            line = rest;
        }
        let text = std::str::from_utf8(line)
            .map_err(|_| LinesCodecError::InvalidUtf8)?
            .to_owned();
        src.advance(newline + 1);
        Ok(Some(text))
    }
}

impl<T: AsRef<str>> Encoder<T> for LinesCodec {
    type Error = LinesCodecError;

    fn encode(&mut self, line: T, dst: &mut BytesMut) -> Result<(), LinesCodecError> {
        let line = line.as_ref();
        dst.reserve(line.len() + 1);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lines_and_strips_cr() {
        let mut codec = LinesCodec::new();
        let mut buf = BytesMut::from(&b"hello\r\nworld\npartial"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("hello"));
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("world"));
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.as_ref(), b"partial");
    }

    #[test]
    fn resumes_scan_after_partial_line() {
        let mut codec = LinesCodec::new();
        let mut buf = BytesMut::from(&b"abc"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"def\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("abcdef"));
        assert!(buf.is_empty());
    }

    #[test]
    fn max_length_enforced() {
        let mut codec = LinesCodec::new_with_max_length(4);
        let mut buf = BytesMut::from(&b"abcd\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("abcd"));

        let mut buf = BytesMut::from(&b"abcdef"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(LinesCodecError::MaxLineLengthExceeded)
        ));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let mut codec = LinesCodec::new();
        let mut buf = BytesMut::from(&b"\xff\xfe\n"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(LinesCodecError::InvalidUtf8)
        ));
    }

    #[test]
    fn eof_with_unterminated_line_errors() {
        let mut codec = LinesCodec::new();
        let mut buf = BytesMut::from(&b"dangling"[..]);
        assert!(matches!(
            codec.decode_eof(&mut buf),
            Err(LinesCodecError::Io(ref e)) if e.kind() == io::ErrorKind::UnexpectedEof
        ));
    }

    #[test]
    fn encode_appends_newline() {
        let mut codec = LinesCodec::new();
        let mut dst = BytesMut::new();
        codec.encode("PING", &mut dst).unwrap();
        codec.encode(String::from("QUIT"), &mut dst).unwrap();
        assert_eq!(dst.as_ref(), b"PING\nQUIT\n");
    }
}
