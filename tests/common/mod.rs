//! Shared helpers for integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use resptap::{Direction, TraceCallback};
use std::io::{self, Write};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Installs a test subscriber once per test binary. Honors `RUST_LOG`.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("resptap=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Marks the start of a test phase in the log.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "test phase start");
    };
}

/// Marks a test as completed in the log.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test complete");
    };
}

/// Asserts `cond`, logging expected and actual values on failure.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        if !$cond {
            tracing::error!(
                expected = ?$expected,
                actual = ?$actual,
                "assertion failed: {}",
                $msg
            );
        }
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}

/// Spans recorded by a [`recorder`] callback.
pub type Events = Arc<Mutex<Vec<(Direction, Vec<u8>)>>>;

/// Callback that records every span it receives.
pub fn recorder() -> (Events, impl TraceCallback + 'static) {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    (events, move |direction: Direction, data: &[u8]| {
        sink.lock().push((direction, data.to_vec()));
    })
}

/// Concatenates the recorded spans of one direction.
pub fn concat(events: &Events, direction: Direction) -> Vec<u8> {
    events
        .lock()
        .iter()
        .filter(|(d, _)| *d == direction)
        .flat_map(|(_, data)| data.iter().copied())
        .collect()
}

/// Cloneable in-memory sink, readable after being handed to a callback.
#[derive(Debug, Clone, Default)]
pub struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().clone()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
