//! Trace callback contract and stock callbacks.

use crate::tracing_compat::warn;
use core::fmt;
use std::io::Write;

/// Direction of a traced byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Bytes written to the peer.
    Outbound,
    /// Bytes consumed while decoding one inbound value.
    Inbound,
}

impl Direction {
    /// Returns `true` for bytes sent to the peer.
    #[must_use]
    pub const fn is_outbound(self) -> bool {
        matches!(self, Self::Outbound)
    }

    /// Returns `true` for bytes decoded from the peer.
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        matches!(self, Self::Inbound)
    }

    /// Returns the direction name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Outbound => "outbound",
            Self::Inbound => "inbound",
        }
    }

    /// Returns the arrow used in trace printouts: `->` out, `<-` in.
    #[must_use]
    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Outbound => "->",
            Self::Inbound => "<-",
        }
    }
}

impl From<Direction> for bool {
    fn from(direction: Direction) -> Self {
        direction.is_outbound()
    }
}

impl From<bool> for Direction {
    fn from(outbound: bool) -> Self {
        if outbound { Self::Outbound } else { Self::Inbound }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of traced byte spans.
///
/// Every outbound frame write and every successfully decoded inbound value is
/// reported as one call. Calls from the same traced connection are serialized
/// and never overlap, even when the encoder and decoder run on different
/// threads.
///
/// `data` is lent for the duration of the call only; copy it to keep it. The
/// callback must not use the traced connection it is observing, since the
/// dispatch lock is held while it runs.
///
/// Any `FnMut(Direction, &[u8]) + Send` closure is a `TraceCallback`.
pub trait TraceCallback: Send {
    /// Observes one span.
    fn trace(&mut self, direction: Direction, data: &[u8]);
}

impl<F> TraceCallback for F
where
    F: FnMut(Direction, &[u8]) + Send,
{
    fn trace(&mut self, direction: Direction, data: &[u8]) {
        self(direction, data);
    }
}

/// Callback that ignores every span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopCallback;

impl TraceCallback for NoopCallback {
    fn trace(&mut self, _direction: Direction, _data: &[u8]) {}
}

/// Callback printing spans as escaped text, one line per span.
///
/// ```text
/// -> *3\r\n$3\r\nSET\r\n$5\r\nmykey\r\n$5\r\nHello\r\n
/// <- +OK\r\n
/// ```
///
/// Write failures on the sink are logged and otherwise ignored; tracing never
/// fails the connection.
#[derive(Debug)]
pub struct WriterCallback<W> {
    sink: W,
}

impl<W> WriterCallback<W> {
    /// Creates a callback printing to `sink`.
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Gets a reference to the sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Returns the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write + Send> TraceCallback for WriterCallback<W> {
    fn trace(&mut self, direction: Direction, data: &[u8]) {
        let result = writeln!(self.sink, "{} {}", direction.arrow(), data.escape_ascii())
            .and_then(|()| self.sink.flush());
        if let Err(err) = result {
            warn!(error = %err, %direction, len = data.len(), "trace sink write failed");
        }
    }
}

/// Callback emitting each span as a `tracing` event at debug level.
///
/// Events use the `resptap::wire` target with `direction`, `len` and the
/// escaped `data` as fields.
#[cfg(feature = "tracing-integration")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogCallback;

#[cfg(feature = "tracing-integration")]
impl TraceCallback for LogCallback {
    fn trace(&mut self, direction: Direction, data: &[u8]) {
        tracing::debug!(
            target: "resptap::wire",
            %direction,
            len = data.len(),
            data = %data.escape_ascii(),
            "wire span"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn direction_bool_mapping() {
        assert!(bool::from(Direction::Outbound));
        assert!(!bool::from(Direction::Inbound));
        assert_eq!(Direction::from(true), Direction::Outbound);
        assert_eq!(Direction::from(false), Direction::Inbound);
        assert!(Direction::Inbound.is_inbound());
        assert_eq!(Direction::Outbound.to_string(), "outbound");
        assert_eq!(Direction::Inbound.arrow(), "<-");
    }

    #[test]
    fn closures_are_callbacks() {
        let mut seen = Vec::new();
        {
            let mut cb = |direction: Direction, data: &[u8]| seen.push((direction, data.to_vec()));
            cb.trace(Direction::Outbound, b"abc");
        }
        assert_eq!(seen, vec![(Direction::Outbound, b"abc".to_vec())]);
    }

    #[test]
    fn writer_callback_escapes() {
        let mut cb = WriterCallback::new(Vec::new());
        cb.trace(Direction::Outbound, b"PING\r\n");
        cb.trace(Direction::Inbound, b"+PONG\r\n");
        let printed = String::from_utf8(cb.into_inner()).unwrap();
        assert_eq!(printed, "-> PING\\r\\n\n<- +PONG\\r\\n\n");
    }

    #[test]
    fn writer_callback_swallows_sink_errors() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut cb = WriterCallback::new(Closed);
        cb.trace(Direction::Inbound, b"x");
    }

    #[test]
    fn noop_callback() {
        let mut cb = NoopCallback;
        cb.trace(Direction::Outbound, b"ignored");
    }
}
