//! Duplicating reader.

use std::io::{self, Read, Write};

/// Reader that copies every byte it reads into a side writer.
///
/// The copy happens after the inner read returns and before the bytes are
/// handed to the caller, so the side writer sees exactly what the caller sees,
/// in order. A failing side writer fails the read.
#[derive(Debug)]
pub struct TeeReader<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> TeeReader<R, W> {
    /// Creates a tee over `reader` copying into `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Gets a reference to the source.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Gets a reference to the side writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Returns the source and the side writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: Read, W: Write> Read for TeeReader<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.writer.write_all(&buf[..n])?;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn copies_exactly_what_was_read() {
        let mut tee = TeeReader::new(Cursor::new(b"hello world".to_vec()), Vec::<u8>::new());
        let mut buf = [0u8; 5];
        assert_eq!(tee.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");
        assert_eq!(tee.writer(), b"hello");

        let mut rest = Vec::new();
        tee.read_to_end(&mut rest).unwrap();
        let (_, copy) = tee.into_parts();
        assert_eq!(copy, b"hello world");
    }

    #[test]
    fn side_writer_failure_fails_read() {
        struct Full;
        impl Write for Full {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Ok(0)
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut tee = TeeReader::new(Cursor::new(b"x".to_vec()), Full);
        let err = tee.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[test]
    fn eof_writes_nothing() {
        let mut tee = TeeReader::new(Cursor::new(Vec::<u8>::new()), Vec::<u8>::new());
        assert_eq!(tee.read(&mut [0u8; 4]).unwrap(), 0);
        assert!(tee.writer().is_empty());
    }
}
