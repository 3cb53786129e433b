//! Tap writers: byte sinks feeding the trace state.

use super::state::TraceState;
use core::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// Byte sink forwarding every write to one trace state function.
///
/// The outbound writer reports each write to the callback on the spot. The
/// inbound writer only appends to the pending span; delivery waits for the
/// decode to succeed. Neither ever fails or short-writes.
pub struct TapWriter {
    state: Arc<TraceState>,
    sink: fn(&TraceState, &[u8]),
}

impl TapWriter {
    /// Writer for bytes sent to the peer.
    pub(crate) fn outbound(state: Arc<TraceState>) -> Self {
        Self {
            state,
            sink: TraceState::write_outbound,
        }
    }

    /// Writer for bytes read from the peer.
    pub(crate) fn inbound(state: Arc<TraceState>) -> Self {
        Self {
            state,
            sink: TraceState::write_inbound,
        }
    }
}

impl Write for TapWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (self.sink)(&self.state, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for TapWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapWriter")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
