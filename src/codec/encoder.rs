//! Encoder trait for framed transports.

use bytes::BytesMut;
use std::io;

/// Encode items into bytes.
///
/// An encoder appends one complete frame per call to `dst`. The surrounding
/// driver writes the buffer out as a single unit, which is what lets a trace
/// tap report one outbound span per encoded item.
pub trait Encoder<Item> {
    /// Encoding error type.
    type Error: From<io::Error>;

    /// Encode an item into the buffer.
    fn encode(&mut self, item: Item, dst: &mut BytesMut) -> Result<(), Self::Error>;
}

impl<Item, E: Encoder<Item> + ?Sized> Encoder<Item> for &mut E {
    type Error = E::Error;

    fn encode(&mut self, item: Item, dst: &mut BytesMut) -> Result<(), Self::Error> {
        (**self).encode(item, dst)
    }
}

/// Pass-through encoder for callers that already hold encoded frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BytesCodec;

impl BytesCodec {
    /// Creates a new pass-through encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<T: AsRef<[u8]>> Encoder<T> for BytesCodec {
    type Error = io::Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> io::Result<()> {
        dst.extend_from_slice(item.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_codec_appends() {
        let mut dst = BytesMut::new();
        let mut codec = BytesCodec::new();
        codec.encode(&b"abc"[..], &mut dst).unwrap();
        codec.encode(vec![b'd'], &mut dst).unwrap();
        assert_eq!(dst.as_ref(), b"abcd");
    }

    #[test]
    fn encoder_by_mut_ref() {
        fn encode_with<E: Encoder<&'static str>>(mut encoder: E, dst: &mut BytesMut) {
            assert!(encoder.encode("hi", dst).is_ok());
        }

        let mut codec = BytesCodec::new();
        let mut dst = BytesMut::new();
        encode_with(&mut codec, &mut dst);
        assert_eq!(dst.as_ref(), b"hi");
    }
}
