use thiserror::Error;

use crate::logging::api_error;
use crate::status::HResult;

/// A failed engine call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("native call failed with {code}")]
pub struct NativeError {
    code: HResult,
}

impl NativeError {
    /// Wrap a failure code.
    pub const fn new(code: HResult) -> Self {
        Self { code }
    }

    /// Unspecified failure (`E_FAIL`).
    pub const fn fail() -> Self {
        Self::new(HResult::E_FAIL)
    }

    /// The native status code.
    pub fn code(&self) -> HResult {
        self.code
    }
}

impl From<HResult> for NativeError {
    fn from(code: HResult) -> Self {
        Self::new(code)
    }
}

/// Result of a call into the engine.
pub type NativeResult<T> = Result<T, NativeError>;

/// Errors returned by [`ExplorerBrowser`](crate::ExplorerBrowser) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    /// The operation requires a created browser.
    #[error("explorer browser has not been created")]
    NotCreated,
    /// `create` was called on a browser that was already created.
    #[error("explorer browser has already been created")]
    AlreadyCreated,
    /// The browser was destroyed.
    #[error("explorer browser has been destroyed")]
    Destroyed,
    /// An item kind set was empty where at least one kind is required.
    #[error("at least one item kind must be specified")]
    NoItemKinds,
    /// An engine call failed.
    #[error("{operation} failed: {source}")]
    Native {
        /// Name of the failing engine operation.
        operation: &'static str,
        /// Native failure.
        #[source]
        source: NativeError,
    },
    /// A native item returned by the engine could not be converted.
    #[error("could not convert the item returned by {operation}")]
    ItemConversion {
        /// Name of the engine operation that produced the item.
        operation: &'static str,
    },
    /// A capability the platform did not provide.
    #[error("{0} is not available on this platform")]
    Unsupported(&'static str),
}

impl BrowserError {
    /// The native failure code, when the error came from the engine.
    pub fn native_code(&self) -> Option<HResult> {
        match self {
            BrowserError::Native { source, .. } => Some(source.code()),
            _ => None,
        }
    }
}

/// Attach an operation name to a native result, logging failures.
pub(crate) trait NativeResultExt<T> {
    fn op(self, operation: &'static str) -> Result<T, BrowserError>;
}

impl<T> NativeResultExt<T> for NativeResult<T> {
    fn op(self, operation: &'static str) -> Result<T, BrowserError> {
        self.map_err(|source| {
            api_error(operation, &source);
            BrowserError::Native { operation, source }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_tags_failures_with_the_operation() {
        let r: NativeResult<()> = Err(NativeError::fail());
        let err = r.op("ExplorerEngine::refresh").unwrap_err();
        assert_eq!(err.native_code(), Some(HResult::E_FAIL));
        assert_eq!(
            err.to_string(),
            "ExplorerEngine::refresh failed: native call failed with 0x80004005"
        );
    }

    #[test]
    fn op_passes_values_through() {
        let r: NativeResult<u32> = Ok(7);
        assert_eq!(r.op("anything"), Ok(7));
    }
}
