//! Pending inbound span accumulator.
//!
//! The accumulator mirrors the decode read buffer: every byte read from the
//! stream is appended here as it is appended there, and the decoder only ever
//! removes bytes from the front of the read buffer. So at any point the
//! trailing `read_buffer.len()` bytes of the accumulator are the unconsumed
//! read-ahead, and everything before them is what the last decode attempt
//! consumed.

use bytes::BytesMut;

/// State of the inbound span machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanState {
    /// No bytes pending.
    Idle,
    /// Bytes have been read and not yet attributed to a decoded value.
    Accumulating,
}

/// Bytes read from the stream since the last completed decode.
#[derive(Debug, Default)]
pub struct SpanAccumulator {
    pending: BytesMut,
}

impl SpanAccumulator {
    /// Creates an empty accumulator with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: BytesMut::with_capacity(capacity),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SpanState {
        if self.pending.is_empty() {
            SpanState::Idle
        } else {
            SpanState::Accumulating
        }
    }

    /// Number of pending bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending bytes, oldest first.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Records bytes read from the stream.
    pub fn append(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Takes the span of a successful decode.
    ///
    /// `unconsumed` is the number of bytes still in the read buffer; they stay
    /// pending for the next decode. Everything before them is returned.
    pub fn complete(&mut self, unconsumed: usize) -> BytesMut {
        let consumed = self.pending.len().saturating_sub(unconsumed);
        self.pending.split_to(consumed)
    }

    /// Drops the span of a failed decode, keeping the `unconsumed` tail.
    ///
    /// Returns the number of bytes dropped.
    pub fn discard(&mut self, unconsumed: usize) -> usize {
        let consumed = self.pending.len().saturating_sub(unconsumed);
        let _ = self.pending.split_to(consumed);
        consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_until_bytes_arrive() {
        let mut span = SpanAccumulator::with_capacity(8);
        assert_eq!(span.state(), SpanState::Idle);
        span.append(b"+OK");
        assert_eq!(span.state(), SpanState::Accumulating);
        assert_eq!(span.len(), 3);
    }

    #[test]
    fn complete_keeps_read_ahead() {
        let mut span = SpanAccumulator::default();
        span.append(b"+OK\r\n:1");
        let done = span.complete(2);
        assert_eq!(done.as_ref(), b"+OK\r\n");
        assert_eq!(span.pending(), b":1");
        assert_eq!(span.state(), SpanState::Accumulating);

        span.append(b"\r\n");
        assert_eq!(span.complete(0).as_ref(), b":1\r\n");
        assert_eq!(span.state(), SpanState::Idle);
    }

    #[test]
    fn complete_with_nothing_consumed_is_empty_span() {
        let mut span = SpanAccumulator::default();
        span.append(b"abc");
        assert!(span.complete(3).is_empty());
        assert_eq!(span.pending(), b"abc");
    }

    #[test]
    fn discard_drops_consumed_prefix() {
        let mut span = SpanAccumulator::default();
        span.append(b"garbage+OK\r\n");
        assert_eq!(span.discard(5), 7);
        assert_eq!(span.pending(), b"+OK\r\n");
        assert_eq!(span.discard(0), 5);
        assert_eq!(span.state(), SpanState::Idle);
        assert_eq!(span.discard(10), 0);
    }
}
