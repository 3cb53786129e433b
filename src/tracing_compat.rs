//! Optional tracing integration.
//!
//! With the `tracing-integration` feature enabled, the macros re-exported here
//! are the ones from the [`tracing`] crate. Without it they expand to nothing,
//! so call sites never need their own `cfg` gates.

#[cfg(feature = "tracing-integration")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing-integration"))]
mod noop {
    macro_rules! debug {
        ($($arg:tt)*) => {{}};
    }
    macro_rules! trace {
        ($($arg:tt)*) => {{}};
    }
    macro_rules! warn {
        ($($arg:tt)*) => {{}};
    }

    #[allow(unused_imports)]
    pub(crate) use {debug, trace, warn};
}

#[cfg(not(feature = "tracing-integration"))]
#[allow(unused_imports)]
pub(crate) use noop::{debug, trace, warn};
