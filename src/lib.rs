//! Resptap: wire-level trace tap for RESP clients.
//!
//! # Overview
//!
//! Resptap wraps the two halves of a client connection so that a diagnostic
//! callback sees the exact bytes exchanged with the server: every frame the
//! encoder writes, and every byte range the decoder consumes for a value it
//! successfully decodes. The stream and the codec behave exactly as they would
//! without the tap.
//!
//! # Core Guarantees
//!
//! - **Exact spans**: an inbound span is precisely the bytes consumed for one
//!   decoded value; read-ahead is attributed to the next value
//! - **Single buffering**: the decoder reads from one buffer; the tap mirrors
//!   it instead of adding a second one
//! - **No partial reports**: a failed decode or rejected write never reaches
//!   the callback
//! - **Serialized dispatch**: callback calls for one connection never overlap
//!
//! # Module Structure
//!
//! - [`tap`]: Traced encoder/decoder halves, callbacks and the [`TraceTap`] builder
//! - [`codec`]: `Encoder`/`Decoder` traits, framed drivers, RESP3 and line codecs
//! - [`io`]: Byte-flow duplication adapters (`TeeReader`, `FanOutWriter`)
//! - [`net`]: Splitting established connections into owned halves
//! - [`config`]: Buffer sizing, with optional TOML loading (`config-file` feature)
//!
//! # Quick start
//!
//! ```no_run
//! use resptap::codec::Value;
//! use resptap::tap::WriterCallback;
//! use std::net::TcpStream;
//!
//! let stream = TcpStream::connect("127.0.0.1:6379")?;
//! let (mut enc, mut dec) = resptap::tracer(WriterCallback::new(std::io::stderr()), stream)?;
//!
//! enc.send(Value::command(["PING"]))?;
//! let reply = dec.decode()?;
//! println!("{reply:?}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

pub mod codec;
pub mod config;
pub mod io;
pub mod net;
pub mod tap;
pub(crate) mod tracing_compat;

pub use config::{ConfigError, TraceConfig};
pub use tap::{Direction, TraceCallback, TraceTap, TracedDecoder, TracedEncoder, tracer};
