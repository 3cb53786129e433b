//! Shared per-connection trace state.

use super::callback::{Direction, TraceCallback};
use super::span::{SpanAccumulator, SpanState};
use crate::tracing_compat::debug;
use core::fmt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// State shared by the traced encoder and decoder of one connection.
///
/// Holds the user callback behind the dispatch lock, the pending inbound span
/// and the connection's trace counters. The dispatch lock is taken only around
/// a callback call; the span has its own lock, which is never held while the
/// callback runs.
pub struct TraceState {
    callback: Mutex<Box<dyn TraceCallback>>,
    pending: Mutex<SpanAccumulator>,
    stats: TraceStats,
}

impl TraceState {
    pub(crate) fn new(callback: Box<dyn TraceCallback>, span_capacity: usize) -> Self {
        Self {
            callback: Mutex::new(callback),
            pending: Mutex::new(SpanAccumulator::with_capacity(span_capacity)),
            stats: TraceStats::default(),
        }
    }

    /// Invokes the callback under the dispatch lock.
    fn call(&self, direction: Direction, data: &[u8]) {
        let mut callback = self.callback.lock();
        callback.trace(direction, data);
    }

    /// Outbound tap: report a written frame immediately.
    pub(crate) fn write_outbound(&self, data: &[u8]) {
        self.stats.record(Direction::Outbound, data.len());
        self.call(Direction::Outbound, data);
    }

    /// Inbound tap: remember bytes read from the stream.
    pub(crate) fn write_inbound(&self, data: &[u8]) {
        self.pending.lock().append(data);
    }

    /// Delivers the span of a successful decode.
    pub(crate) fn complete_inbound(&self, unconsumed: usize) {
        let span = self.pending.lock().complete(unconsumed);
        self.stats.record(Direction::Inbound, span.len());
        self.call(Direction::Inbound, &span);
    }

    /// Drops the span of a failed or empty decode attempt.
    pub(crate) fn discard_inbound(&self, unconsumed: usize) {
        let dropped = self.pending.lock().discard(unconsumed);
        if dropped > 0 {
            self.stats.record_discard(dropped);
            debug!(dropped, "discarded inbound span of failed decode");
        }
    }

    /// Returns a snapshot of the trace counters.
    #[must_use]
    pub fn stats(&self) -> TraceStatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns the inbound span state.
    #[must_use]
    pub fn span_state(&self) -> SpanState {
        self.pending.lock().state()
    }

    /// Number of bytes read but not yet attributed to a decoded value.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

impl fmt::Debug for TraceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceState")
            .field("pending_len", &self.pending_len())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Trace counters for one connection.
#[derive(Debug, Default)]
struct TraceStats {
    outbound_spans: AtomicU64,
    outbound_bytes: AtomicU64,
    inbound_spans: AtomicU64,
    inbound_bytes: AtomicU64,
    discarded_spans: AtomicU64,
    discarded_bytes: AtomicU64,
}

impl TraceStats {
    fn record(&self, direction: Direction, len: usize) {
        let (spans, bytes) = match direction {
            Direction::Outbound => (&self.outbound_spans, &self.outbound_bytes),
            Direction::Inbound => (&self.inbound_spans, &self.inbound_bytes),
        };
        spans.fetch_add(1, Ordering::Relaxed);
        bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    fn record_discard(&self, len: usize) {
        self.discarded_spans.fetch_add(1, Ordering::Relaxed);
        self.discarded_bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> TraceStatsSnapshot {
        TraceStatsSnapshot {
            outbound_spans: self.outbound_spans.load(Ordering::Relaxed),
            outbound_bytes: self.outbound_bytes.load(Ordering::Relaxed),
            inbound_spans: self.inbound_spans.load(Ordering::Relaxed),
            inbound_bytes: self.inbound_bytes.load(Ordering::Relaxed),
            discarded_spans: self.discarded_spans.load(Ordering::Relaxed),
            discarded_bytes: self.discarded_bytes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a connection's trace counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStatsSnapshot {
    /// Outbound spans reported.
    pub outbound_spans: u64,
    /// Outbound bytes reported.
    pub outbound_bytes: u64,
    /// Inbound spans reported.
    pub inbound_spans: u64,
    /// Inbound bytes reported.
    pub inbound_bytes: u64,
    /// Failed decode attempts whose bytes were dropped.
    pub discarded_spans: u64,
    /// Bytes dropped with failed decodes.
    pub discarded_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    fn recording() -> (Arc<Mutex<Vec<(Direction, Vec<u8>)>>>, Box<dyn TraceCallback>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: Box<dyn TraceCallback> = Box::new(move |direction: Direction, data: &[u8]| {
            sink.lock().push((direction, data.to_vec()));
        });
        (events, callback)
    }

    #[test]
    fn outbound_reports_immediately() {
        let (events, callback) = recording();
        let state = TraceState::new(callback, 0);
        state.write_outbound(b"PING\r\n");
        assert_eq!(
            *events.lock(),
            vec![(Direction::Outbound, b"PING\r\n".to_vec())]
        );
        assert_eq!(state.stats().outbound_spans, 1);
        assert_eq!(state.stats().outbound_bytes, 6);
    }

    #[test]
    fn inbound_waits_for_completion() {
        let (events, callback) = recording();
        let state = TraceState::new(callback, 0);
        state.write_inbound(b"+OK\r\n+Q");
        assert!(events.lock().is_empty());
        assert_eq!(state.span_state(), SpanState::Accumulating);

        state.complete_inbound(2);
        assert_eq!(*events.lock(), vec![(Direction::Inbound, b"+OK\r\n".to_vec())]);
        assert_eq!(state.pending_len(), 2);
    }

    #[test]
    fn discard_never_reaches_callback() {
        let (events, callback) = recording();
        let state = TraceState::new(callback, 0);
        state.write_inbound(b"!bad");
        state.discard_inbound(0);
        assert!(events.lock().is_empty());
        assert_eq!(state.span_state(), SpanState::Idle);
        let stats = state.stats();
        assert_eq!((stats.discarded_spans, stats.discarded_bytes), (1, 4));

        state.discard_inbound(0);
        assert_eq!(state.stats().discarded_spans, 1);
    }

    #[test]
    fn callback_calls_never_overlap() {
        let busy = Arc::new(AtomicBool::new(false));
        let overlaps = Arc::new(AtomicU64::new(0));
        let callback = {
            let busy = Arc::clone(&busy);
            let overlaps = Arc::clone(&overlaps);
            move |_direction: Direction, _data: &[u8]| {
                if busy.swap(true, Ordering::SeqCst) {
                    overlaps.fetch_add(1, Ordering::SeqCst);
                }
                thread::yield_now();
                busy.store(false, Ordering::SeqCst);
            }
        };
        let state = Arc::new(TraceState::new(Box::new(callback), 0));

        let writers: Vec<_> = (0..4)
            .map(|_| {
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    for _ in 0..200 {
                        state.write_outbound(b"x");
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
        assert_eq!(state.stats().outbound_spans, 800);
    }
}
