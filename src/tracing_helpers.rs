//! Logging macros that compile away unless the `tracing` feature is on.
//!
//! ```bash
//! RUST_LOG=rwavl=trace cargo test --features tracing
//! ```

#![allow(unused_macros)]

/// Trace level, used for individual rotations.
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Debug level, used for whole tree operations.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}
