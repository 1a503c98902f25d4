//! Logging utilities for explorer-browser
//!
//! Native engine failures never cross the callback boundary; they are
//! recorded here instead. All output goes through `tracing` when the
//! `tracing` feature is enabled and compiles to nothing otherwise.

use crate::error::NativeError;

/// Filter used by [`init_tracing`] when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "explorer_browser=info,warn";

/// Install a global `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Returns `false` when a global subscriber was already installed (or the
/// `tracing` feature is off).
#[cfg(feature = "tracing")]
pub fn init_tracing() -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));
    install(filter)
}

/// Like [`init_tracing`], with an explicit filter directive such as
/// `"explorer_browser=debug"`.
#[cfg(feature = "tracing")]
pub fn init_tracing_with_filter(filter: &str) -> bool {
    install(tracing_subscriber::EnvFilter::new(filter))
}

#[cfg(feature = "tracing")]
fn install(filter: tracing_subscriber::EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok()
}

#[cfg(not(feature = "tracing"))]
pub fn init_tracing() -> bool {
    false
}

#[cfg(not(feature = "tracing"))]
pub fn init_tracing_with_filter(_filter: &str) -> bool {
    false
}

/// Record a failed native call together with the name of the operation.
#[cfg(feature = "tracing")]
pub(crate) fn api_error(operation: &str, error: &NativeError) {
    tracing::warn!(
        event = "native.failed",
        operation,
        code = %error.code(),
        "native call failed"
    );
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn api_error(_operation: &str, _error: &NativeError) {}

macro_rules! eb_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*);
    };
}

macro_rules! eb_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    };
}

macro_rules! eb_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::warn!($($arg)*);
    };
}

pub(crate) use {eb_debug, eb_trace, eb_warn};
