//! Fan-out writer.

use std::io::{self, Write};

/// Writer that forwards every write to a primary sink and then to a mirror.
///
/// Each call to [`write`](Write::write) pushes the whole buffer into the
/// primary with `write_all` before the mirror sees it, so a write either
/// reaches both sinks completely or returns the first error. The primary is
/// never written partially without the caller hearing about it, and the mirror
/// never sees bytes the primary rejected.
///
/// An empty write is still passed to both sinks, so an observer on the mirror
/// sees one call per write even when there is nothing to copy.
#[derive(Debug)]
pub struct FanOutWriter<P, M> {
    primary: P,
    mirror: M,
}

impl<P, M> FanOutWriter<P, M> {
    /// Creates a fan-out over `primary` and `mirror`.
    pub fn new(primary: P, mirror: M) -> Self {
        Self { primary, mirror }
    }

    /// Gets a reference to the primary sink.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// Gets a mutable reference to the primary sink.
    pub fn primary_mut(&mut self) -> &mut P {
        &mut self.primary
    }

    /// Gets a reference to the mirror sink.
    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    /// Returns both sinks.
    pub fn into_parts(self) -> (P, M) {
        (self.primary, self.mirror)
    }
}

impl<P: Write, M: Write> Write for FanOutWriter<P, M> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            let primary = self.primary.write(buf)?;
            let mirror = self.mirror.write(buf)?;
            return Ok(primary.min(mirror));
        }
        self.primary.write_all(buf)?;
        self.mirror.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.mirror.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Write for Failing {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn both_sinks_receive_identical_bytes() {
        let mut fan = FanOutWriter::new(Vec::<u8>::new(), Vec::<u8>::new());
        fan.write_all(b"abc").unwrap();
        fan.write_all(b"def").unwrap();
        fan.flush().unwrap();
        let (primary, mirror) = fan.into_parts();
        assert_eq!(primary, b"abcdef");
        assert_eq!(mirror, primary);
    }

    #[test]
    fn primary_failure_skips_mirror() {
        let mut fan = FanOutWriter::new(Failing, Vec::<u8>::new());
        let err = fan.write(b"abc").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(fan.mirror().is_empty());
        assert!(fan.flush().is_err());
    }

    /// Sink counting write calls.
    #[derive(Default)]
    struct Calls(usize);

    impl Write for Calls {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0 += 1;
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_write_reaches_both_sinks() {
        let mut fan = FanOutWriter::new(Calls::default(), Calls::default());
        assert_eq!(fan.write(b"").unwrap(), 0);
        let (primary, mirror) = fan.into_parts();
        assert_eq!((primary.0, mirror.0), (1, 1));

        let mut fan = FanOutWriter::new(Failing, Calls::default());
        assert!(fan.write(b"").is_err());
        assert_eq!(fan.mirror().0, 0);
    }
}
