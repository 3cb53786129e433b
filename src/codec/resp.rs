//! RESP3 frame codec.
//!
//! Frames every RESP3 value type a client sees on the wire, RESP2 nulls
//! included. The codec only delimits and converts frames; it attaches no
//! meaning to commands or replies.
//!
//! Decoding never consumes a partial frame. The buffer is scanned from the
//! front and only advanced once a complete value (including every nested
//! element) is present, so the bytes removed by one successful `decode` call
//! are exactly the bytes of the returned value.

use super::{Decoder, Encoder};
use bytes::{Buf, Bytes, BytesMut};
use std::fmt::Write as _;
use std::io;
use thiserror::Error;

/// Default limit for bulk string length and aggregate element count.
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 512 * 1024 * 1024;

/// Default limit for nested aggregates.
pub const DEFAULT_MAX_DEPTH: usize = 64;

const CRLF: &[u8] = b"\r\n";

/// A RESP3 value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `+` simple string.
    SimpleString(String),
    /// `-` simple error.
    Error(String),
    /// `:` signed 64-bit integer.
    Integer(i64),
    /// `$` binary-safe bulk string.
    BulkString(Bytes),
    /// `_` null, also produced for RESP2 `$-1` and `*-1`.
    Null,
    /// `#` boolean.
    Boolean(bool),
    /// `,` double. NaN and the infinities travel as `nan`, `inf` and `-inf`.
    Double(f64),
    /// `(` arbitrary precision integer, kept as its decimal digits.
    BigNumber(String),
    /// `!` binary-safe error.
    BlobError(Bytes),
    /// `=` verbatim string with a three character format such as `txt` or `mkd`.
    Verbatim {
        /// Format tag.
        format: String,
        /// Payload after the `format:` prefix.
        text: Bytes,
    },
    /// `*` array.
    Array(Vec<Value>),
    /// `~` set.
    Set(Vec<Value>),
    /// `%` map, in wire order.
    Map(Vec<(Value, Value)>),
    /// `|` attributes attached to the value that follows them.
    Attribute {
        /// Attribute key/value pairs.
        attributes: Vec<(Value, Value)>,
        /// The reply the attributes describe.
        value: Box<Value>,
    },
    /// `>` out-of-band push, e.g. a pub/sub message.
    Push(Vec<Value>),
}

impl Value {
    /// Builds a command: an array of bulk strings.
    ///
    /// ```
    /// use resptap::codec::resp::Value;
    ///
    /// let set = Value::command(["SET", "mykey", "Hello"]);
    /// assert!(matches!(set, Value::Array(ref parts) if parts.len() == 3));
    /// ```
    pub fn command<I, A>(args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        Self::Array(
            args.into_iter()
                .map(|arg| Self::BulkString(Bytes::copy_from_slice(arg.as_ref())))
                .collect(),
        )
    }

    /// Builds a bulk string value.
    pub fn bulk(data: impl AsRef<[u8]>) -> Self {
        Self::BulkString(Bytes::copy_from_slice(data.as_ref()))
    }

    /// Returns `true` for out-of-band push values.
    #[must_use]
    pub const fn is_push(&self) -> bool {
        matches!(self, Self::Push(_))
    }

    /// Returns the value as UTF-8 text for string-like values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::SimpleString(s) | Self::Error(s) | Self::BigNumber(s) => Some(s),
            Self::BulkString(b) | Self::BlobError(b) | Self::Verbatim { text: b, .. } => {
                std::str::from_utf8(b).ok()
            }
            _ => None,
        }
    }
}

/// Errors from [`RespCodec`].
#[derive(Debug, Error)]
pub enum RespError {
    /// The first byte of a frame is not a known type marker.
    #[error("invalid RESP type byte 0x{0:02x}")]
    InvalidTypeByte(u8),
    /// A header line does not end with `\r\n`.
    #[error("RESP line not terminated by CRLF")]
    InvalidLineTerminator,
    /// A length, count or integer field does not parse.
    #[error("invalid RESP number: {0:?}")]
    InvalidNumber(String),
    /// A boolean is neither `t` nor `f`.
    #[error("invalid RESP boolean: {0:?}")]
    InvalidBoolean(String),
    /// A simple string or error is not valid UTF-8.
    #[error("RESP text is not valid UTF-8")]
    InvalidUtf8,
    /// A length, count or header line exceeds the configured limit.
    #[error("RESP frame length {len} exceeds limit {max}")]
    FrameTooLarge {
        /// Declared or observed length.
        len: usize,
        /// Configured limit.
        max: usize,
    },
    /// Aggregates are nested deeper than the configured limit.
    #[error("RESP aggregates nested deeper than {0}")]
    NestingTooDeep(usize),
    /// A simple string or error contains CR or LF and cannot be encoded.
    #[error("simple RESP text may not contain CR or LF")]
    UnencodableText,
    /// A verbatim string lacks its three character `format:` prefix.
    #[error("RESP verbatim string without a three character format")]
    InvalidVerbatim,
    /// I/O error from the underlying stream.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// RESP3 encoder/decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespCodec {
    max_frame_length: usize,
    max_depth: usize,
}

impl Default for RespCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl RespCodec {
    /// Creates a codec with default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the limit for bulk string length, aggregate count and header line length.
    #[must_use]
    pub const fn with_max_frame_length(mut self, max: usize) -> Self {
        self.max_frame_length = max;
        self
    }

    /// Sets the limit for nested aggregates.
    #[must_use]
    pub const fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    /// Returns the frame length limit.
    #[must_use]
    pub const fn max_frame_length(&self) -> usize {
        self.max_frame_length
    }

    /// Parses one value starting at `pos`.
    ///
    /// Returns the value and the offset just past it, or `None` if the buffer
    /// ends before the value does.
    fn parse(&self, buf: &[u8], pos: usize, depth: usize) -> Result<Option<(Value, usize)>, RespError> {
        let Some((line, next)) = self.line(buf, pos)? else {
            return Ok(None);
        };
        let (&marker, body) = line
            .split_first()
            .ok_or(RespError::InvalidTypeByte(b'\r'))?;

        let value = match marker {
            b'+' => Value::SimpleString(text(body)?),
            b'-' => Value::Error(text(body)?),
            b':' => Value::Integer(number(body)?),
            b'_' => Value::Null,
            b'#' => match body {
                b"t" => Value::Boolean(true),
                b"f" => Value::Boolean(false),
                other => {
                    return Err(RespError::InvalidBoolean(
                        String::from_utf8_lossy(other).into_owned(),
                    ));
                }
            },
            b',' => {
                let raw = text(body)?;
                let parsed = raw
                    .parse::<f64>()
                    .map_err(|_| RespError::InvalidNumber(raw.clone()))?;
                Value::Double(parsed)
            }
            b'(' => Value::BigNumber(big_number(body)?),
            b'$' | b'!' | b'=' => {
                let len: i64 = number(body)?;
                if len == -1 && marker == b'$' {
                    return Ok(Some((Value::Null, next)));
                }
                let Some((data, after)) = self.blob(buf, next, len, body)? else {
                    return Ok(None);
                };
                let value = match marker {
                    b'$' => Value::BulkString(data),
                    b'!' => Value::BlobError(data),
                    _ => verbatim(data)?,
                };
                return Ok(Some((value, after)));
            }
            b'*' | b'>' | b'~' => {
                let count: i64 = number(body)?;
                if count == -1 && marker == b'*' {
                    return Ok(Some((Value::Null, next)));
                }
                let count = self.checked_len(count, body)?;
                let Some((items, after)) = self.items(buf, next, count, depth)? else {
                    return Ok(None);
                };
                let value = match marker {
                    b'*' => Value::Array(items),
                    b'>' => Value::Push(items),
                    _ => Value::Set(items),
                };
                return Ok(Some((value, after)));
            }
            b'%' | b'|' => {
                let count = self.checked_len(number(body)?, body)?;
                let Some((pairs, after)) = self.pairs(buf, next, count, depth)? else {
                    return Ok(None);
                };
                if marker == b'%' {
                    return Ok(Some((Value::Map(pairs), after)));
                }
                let Some((value, end)) = self.parse(buf, after, depth + 1)? else {
                    return Ok(None);
                };
                let value = Value::Attribute {
                    attributes: pairs,
                    value: Box::new(value),
                };
                return Ok(Some((value, end)));
            }
            other => return Err(RespError::InvalidTypeByte(other)),
        };
        Ok(Some((value, next)))
    }

    /// Finds the CRLF-terminated line at `pos`, returning its content and the
    /// offset after the terminator.
    fn line<'b>(&self, buf: &'b [u8], pos: usize) -> Result<Option<(&'b [u8], usize)>, RespError> {
        let rest = &buf[pos..];
        let Some(lf) = memchr::memchr(b'\n', rest) else {
            if rest.len() > self.max_frame_length {
                return Err(RespError::FrameTooLarge {
                    len: rest.len(),
                    max: self.max_frame_length,
                });
            }
            return Ok(None);
        };
        if lf == 0 || rest[lf - 1] != b'\r' {
            return Err(RespError::InvalidLineTerminator);
        }
        Ok(Some((&rest[..lf - 1], pos + lf + 1)))
    }

    /// Reads a length-prefixed payload starting at `start`.
    fn blob(
        &self,
        buf: &[u8],
        start: usize,
        len: i64,
        raw: &[u8],
    ) -> Result<Option<(Bytes, usize)>, RespError> {
        let len = self.checked_len(len, raw)?;
        let end = start + len;
        if buf.len() < end + CRLF.len() {
            return Ok(None);
        }
        if &buf[end..end + CRLF.len()] != CRLF {
            return Err(RespError::InvalidLineTerminator);
        }
        Ok(Some((Bytes::copy_from_slice(&buf[start..end]), end + CRLF.len())))
    }

    fn items(
        &self,
        buf: &[u8],
        mut cursor: usize,
        count: usize,
        depth: usize,
    ) -> Result<Option<(Vec<Value>, usize)>, RespError> {
        if depth >= self.max_depth {
            return Err(RespError::NestingTooDeep(self.max_depth));
        }
        let mut items = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            let Some((item, after)) = self.parse(buf, cursor, depth + 1)? else {
                return Ok(None);
            };
            items.push(item);
            cursor = after;
        }
        Ok(Some((items, cursor)))
    }

    fn pairs(
        &self,
        buf: &[u8],
        mut cursor: usize,
        count: usize,
        depth: usize,
    ) -> Result<Option<(Vec<(Value, Value)>, usize)>, RespError> {
        if depth >= self.max_depth {
            return Err(RespError::NestingTooDeep(self.max_depth));
        }
        let mut pairs = Vec::with_capacity(count.min(32));
        for _ in 0..count {
            let Some((key, after_key)) = self.parse(buf, cursor, depth + 1)? else {
                return Ok(None);
            };
            let Some((value, after)) = self.parse(buf, after_key, depth + 1)? else {
                return Ok(None);
            };
            pairs.push((key, value));
            cursor = after;
        }
        Ok(Some((pairs, cursor)))
    }

    fn checked_len(&self, len: i64, raw: &[u8]) -> Result<usize, RespError> {
        let len = usize::try_from(len)
            .map_err(|_| RespError::InvalidNumber(String::from_utf8_lossy(raw).into_owned()))?;
        if len > self.max_frame_length {
            return Err(RespError::FrameTooLarge {
                len,
                max: self.max_frame_length,
            });
        }
        Ok(len)
    }

    fn write_value(&self, value: &Value, dst: &mut BytesMut) -> Result<(), RespError> {
        let mut header = String::new();
        match value {
            Value::SimpleString(s) => write_simple(b'+', s, dst)?,
            Value::Error(s) => write_simple(b'-', s, dst)?,
            Value::Integer(n) => {
                let _ = write!(header, ":{n}\r\n");
                dst.extend_from_slice(header.as_bytes());
            }
            Value::BulkString(data) => write_blob(b'$', data, dst),
            Value::BlobError(data) => write_blob(b'!', data, dst),
            Value::Verbatim { format, text } => {
                if format.len() != 3 {
                    return Err(RespError::InvalidVerbatim);
                }
                let _ = write!(header, "={}\r\n{format}:", text.len() + 4);
                dst.reserve(header.len() + text.len() + CRLF.len());
                dst.extend_from_slice(header.as_bytes());
                dst.extend_from_slice(text);
                dst.extend_from_slice(CRLF);
            }
            Value::Null => dst.extend_from_slice(b"_\r\n"),
            Value::Boolean(b) => dst.extend_from_slice(if *b { b"#t\r\n" } else { b"#f\r\n" }),
            Value::Double(d) if d.is_nan() => dst.extend_from_slice(b",nan\r\n"),
            Value::Double(d) => {
                let _ = write!(header, ",{d}\r\n");
                dst.extend_from_slice(header.as_bytes());
            }
            Value::BigNumber(n) => {
                big_number(n.as_bytes())?;
                write_simple(b'(', n, dst)?;
            }
            Value::Array(items) | Value::Set(items) | Value::Push(items) => {
                let marker = match value {
                    Value::Set(_) => '~',
                    Value::Push(_) => '>',
                    _ => '*',
                };
                let _ = write!(header, "{marker}{}\r\n", items.len());
                dst.extend_from_slice(header.as_bytes());
                for item in items {
                    self.write_value(item, dst)?;
                }
            }
            Value::Map(pairs) => {
                let _ = write!(header, "%{}\r\n", pairs.len());
                dst.extend_from_slice(header.as_bytes());
                self.write_pairs(pairs, dst)?;
            }
            Value::Attribute { attributes, value } => {
                let _ = write!(header, "|{}\r\n", attributes.len());
                dst.extend_from_slice(header.as_bytes());
                self.write_pairs(attributes, dst)?;
                self.write_value(value, dst)?;
            }
        }
        Ok(())
    }

    fn write_pairs(&self, pairs: &[(Value, Value)], dst: &mut BytesMut) -> Result<(), RespError> {
        for (key, value) in pairs {
            self.write_value(key, dst)?;
            self.write_value(value, dst)?;
        }
        Ok(())
    }
}

fn write_blob(marker: u8, data: &[u8], dst: &mut BytesMut) {
    let mut header = String::new();
    let _ = write!(header, "{}{}\r\n", char::from(marker), data.len());
    dst.reserve(header.len() + data.len() + CRLF.len());
    dst.extend_from_slice(header.as_bytes());
    dst.extend_from_slice(data);
    dst.extend_from_slice(CRLF);
}

fn write_simple(marker: u8, text: &str, dst: &mut BytesMut) -> Result<(), RespError> {
    if text.bytes().any(|b| b == b'\r' || b == b'\n') {
        return Err(RespError::UnencodableText);
    }
    dst.reserve(text.len() + 3);
    dst.extend_from_slice(&[marker]);
    dst.extend_from_slice(text.as_bytes());
    dst.extend_from_slice(CRLF);
    Ok(())
}

fn text(raw: &[u8]) -> Result<String, RespError> {
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|_| RespError::InvalidUtf8)
}

fn big_number(raw: &[u8]) -> Result<String, RespError> {
    let digits = raw.strip_prefix(b"-").or_else(|| raw.strip_prefix(b"+")).unwrap_or(raw);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(RespError::InvalidNumber(String::from_utf8_lossy(raw).into_owned()));
    }
    text(raw)
}

/// Splits a `=` payload into its format tag and text.
fn verbatim(data: Bytes) -> Result<Value, RespError> {
    if data.len() < 4 || data[3] != b':' {
        return Err(RespError::InvalidVerbatim);
    }
    let format = std::str::from_utf8(&data[..3])
        .map_err(|_| RespError::InvalidUtf8)?
        .to_owned();
    Ok(Value::Verbatim {
        format,
        text: data.slice(4..),
    })
}

fn number(raw: &[u8]) -> Result<i64, RespError> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| RespError::InvalidNumber(String::from_utf8_lossy(raw).into_owned()))
}

impl Decoder for RespCodec {
    type Item = Value;
    type Error = RespError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Value>, RespError> {
        if src.is_empty() {
            return Ok(None);
        }
        match self.parse(src, 0, 0)? {
            Some((value, consumed)) => {
                src.advance(consumed);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

impl Encoder<Value> for RespCodec {
    type Error = RespError;

    fn encode(&mut self, item: Value, dst: &mut BytesMut) -> Result<(), RespError> {
        <Self as Encoder<&Value>>::encode(self, &item, dst)
    }
}

impl Encoder<&Value> for RespCodec {
    type Error = RespError;

    fn encode(&mut self, item: &Value, dst: &mut BytesMut) -> Result<(), RespError> {
        // Encode into a scratch buffer so a rejected nested value leaves `dst` untouched.
        let mut frame = BytesMut::new();
        self.write_value(item, &mut frame)?;
        dst.extend_from_slice(&frame);
        Ok(())
    }
}
