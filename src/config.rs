//! Trace tap configuration.
//!
//! [`TraceConfig`] controls buffer sizing for the traced encoder/decoder pair.
//! Defaults are suitable for interactive client connections; every field has a
//! builder-style setter and the whole config is checked by
//! [`TraceConfig::validate`] before a tap is built.
//!
//! With the `config-file` feature, configs can be loaded from a TOML document
//! containing a `[trace]` table:
//!
//! ```toml
//! [trace]
//! read_chunk_size = 4096
//! span_capacity = 128
//! ```

use serde::Deserialize;
use thiserror::Error;

/// Default number of bytes requested from the stream per read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 8192;

/// Default initial capacity of the pending inbound span.
pub const DEFAULT_SPAN_CAPACITY: usize = 64;

/// Default initial capacity of the outbound encode buffer.
pub const DEFAULT_WRITE_BUFFER_CAPACITY: usize = 8192;

/// Errors produced while building or loading a [`TraceConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value the tap cannot work with.
    #[error("invalid trace config: {field} {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// The config file could not be read.
    #[error("failed to read trace config file: {0}")]
    Io(#[from] std::io::Error),
    /// The config document is not valid TOML or has the wrong shape.
    #[cfg(feature = "config-file")]
    #[error("failed to parse trace config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Buffer sizing for a traced connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceConfig {
    /// Bytes requested from the stream per read call.
    pub read_chunk_size: usize,
    /// Initial capacity of the pending inbound span.
    pub span_capacity: usize,
    /// Initial capacity of the outbound encode buffer.
    pub write_buffer_capacity: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            span_capacity: DEFAULT_SPAN_CAPACITY,
            write_buffer_capacity: DEFAULT_WRITE_BUFFER_CAPACITY,
        }
    }
}

impl TraceConfig {
    /// Creates a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of bytes requested per stream read.
    #[must_use]
    pub const fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    /// Sets the initial capacity of the pending inbound span.
    #[must_use]
    pub const fn with_span_capacity(mut self, capacity: usize) -> Self {
        self.span_capacity = capacity;
        self
    }

    /// Sets the initial capacity of the outbound encode buffer.
    #[must_use]
    pub const fn with_write_buffer_capacity(mut self, capacity: usize) -> Self {
        self.write_buffer_capacity = capacity;
        self
    }

    /// Checks that the config can drive a tap.
    ///
    /// Capacities may be zero (buffers grow on demand); a zero read chunk
    /// would make every read look like end of stream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_chunk_size == 0 {
            return Err(ConfigError::Invalid {
                field: "read_chunk_size",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    /// Parses a config from a TOML document with a `[trace]` table.
    ///
    /// A document without the table yields the defaults.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct Document {
            #[serde(default)]
            trace: TraceConfig,
        }

        let doc: Document = toml::from_str(source)?;
        doc.trace.validate()?;
        Ok(doc.trace)
    }

    /// Reads and parses a TOML config file.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
