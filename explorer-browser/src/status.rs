//! Status values exchanged with the engine at the callback boundary.
//!
//! Callbacks speak in terms of [`Verdict`] and [`CallbackError`]. Only the
//! native side needs the role-specific status codes; [`native_status`] maps
//! one onto the other per [`Callback`].

use std::fmt;

use thiserror::Error;

/// Outcome of a callback that may influence the engine's built-in behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Continue with the engine's built-in behavior (or: show the item).
    Proceed,
    /// The host rejected the action; the engine must not perform it
    /// (or: hide the item).
    Suppress,
    /// The callback did not handle the request; the engine falls back to its
    /// default handling.
    NotHandled,
}

impl Verdict {
    /// `Proceed` when `allowed`, otherwise `Suppress`.
    pub fn from_allowed(allowed: bool) -> Self {
        if allowed {
            Verdict::Proceed
        } else {
            Verdict::Suppress
        }
    }
}

/// Negative callback result understood by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum CallbackError {
    /// The request named something the adapter does not know.
    #[error("invalid argument")]
    InvalidArgument,
    /// The request could not be completed.
    #[error("unspecified failure")]
    Failure,
    /// The requested interface or service is not provided.
    #[error("no such interface")]
    NoInterface,
    /// The callback is part of the contract but has no implementation.
    #[error("not implemented")]
    NotImplemented,
}

/// Native status code (`HRESULT` layout: negative values are failures).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HResult(pub i32);

impl HResult {
    /// Success.
    pub const S_OK: HResult = HResult(0);
    /// Success, with a "false"/"not handled" meaning.
    pub const S_FALSE: HResult = HResult(1);
    /// Not implemented.
    pub const E_NOTIMPL: HResult = HResult(0x8000_4001_u32 as i32);
    /// No such interface supported.
    pub const E_NOINTERFACE: HResult = HResult(0x8000_4002_u32 as i32);
    /// Unspecified failure.
    pub const E_FAIL: HResult = HResult(0x8000_4005_u32 as i32);
    /// One or more arguments are invalid.
    pub const E_INVALIDARG: HResult = HResult(0x8007_0057_u32 as i32);
    /// The system cannot find the file specified.
    pub const E_FILE_NOT_FOUND: HResult = HResult(0x8007_0002_u32 as i32);

    /// Whether the code denotes success (`S_OK`, `S_FALSE`, ...).
    pub fn is_success(self) -> bool {
        self.0 >= 0
    }

    /// Whether the code denotes failure.
    pub fn is_failure(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0 as u32)
    }
}

impl fmt::Debug for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HResult({self})")
    }
}

impl From<CallbackError> for HResult {
    fn from(value: CallbackError) -> Self {
        match value {
            CallbackError::InvalidArgument => HResult::E_INVALIDARG,
            CallbackError::Failure => HResult::E_FAIL,
            CallbackError::NoInterface => HResult::E_NOINTERFACE,
            CallbackError::NotImplemented => HResult::E_NOTIMPL,
        }
    }
}

/// Every engine callback the adapter answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Callback {
    /// Service lookup.
    QueryService,
    /// Default command (activate / double-click).
    DefaultCommand,
    /// View state change.
    StateChange,
    /// Per-item include check of the command interceptor.
    IncludeObject,
    /// Generic view notification (context menu start/done).
    Notify,
    /// Default context menu text.
    DefaultMenuText,
    /// View flags query.
    ViewFlags,
    /// Current filter string query.
    CurrentFilter,
    /// Column header click.
    ColumnClicked,
    /// View about to be created.
    PreViewCreated,
    /// Navigation about to happen.
    NavigationPending,
    /// View created.
    ViewCreated,
    /// Navigation completed.
    NavigationComplete,
    /// Navigation failed.
    NavigationFailed,
    /// Enumeration flags of the folder filter.
    EnumFlags,
    /// Per-item filter predicate.
    ShouldShow,
    /// Pane visibility query.
    PaneState,
}

/// Map a callback result onto the status code the engine expects for
/// `callback`.
///
/// The same [`Verdict`] means different codes for different callbacks: a
/// suppressed default command is `S_OK` ("handled, skip the default"), while
/// a suppressed navigation is `E_FAIL`.
pub fn native_status(callback: Callback, result: Result<Verdict, CallbackError>) -> HResult {
    let verdict = match result {
        Ok(v) => v,
        Err(e) => return e.into(),
    };
    match callback {
        Callback::DefaultCommand | Callback::Notify => match verdict {
            Verdict::Suppress => HResult::S_OK,
            Verdict::Proceed | Verdict::NotHandled => HResult::S_FALSE,
        },
        Callback::DefaultMenuText => HResult::S_FALSE,
        Callback::NavigationPending => match verdict {
            Verdict::Suppress => HResult::E_FAIL,
            Verdict::Proceed | Verdict::NotHandled => HResult::S_OK,
        },
        Callback::ShouldShow => match verdict {
            Verdict::Suppress => HResult::S_FALSE,
            Verdict::Proceed | Verdict::NotHandled => HResult::S_OK,
        },
        _ => HResult::S_OK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppress_means_handled_for_default_command() {
        assert_eq!(
            native_status(Callback::DefaultCommand, Ok(Verdict::Suppress)),
            HResult::S_OK
        );
        assert_eq!(
            native_status(Callback::DefaultCommand, Ok(Verdict::Proceed)),
            HResult::S_FALSE
        );
    }

    #[test]
    fn context_menu_not_handled_keeps_native_menu() {
        assert_eq!(
            native_status(Callback::Notify, Ok(Verdict::NotHandled)),
            HResult::S_FALSE
        );
        assert_eq!(
            native_status(Callback::Notify, Ok(Verdict::Suppress)),
            HResult::S_OK
        );
    }

    #[test]
    fn vetoed_navigation_is_a_failure() {
        let code = native_status(Callback::NavigationPending, Ok(Verdict::Suppress));
        assert_eq!(code, HResult::E_FAIL);
        assert!(code.is_failure());
        assert!(native_status(Callback::NavigationPending, Ok(Verdict::Proceed)).is_success());
    }

    #[test]
    fn errors_map_to_their_codes() {
        assert_eq!(
            native_status(Callback::PaneState, Err(CallbackError::InvalidArgument)),
            HResult::E_INVALIDARG
        );
        assert_eq!(
            native_status(Callback::QueryService, Err(CallbackError::NoInterface)),
            HResult::E_NOINTERFACE
        );
        assert_eq!(
            native_status(Callback::CurrentFilter, Err(CallbackError::NotImplemented)),
            HResult::E_NOTIMPL
        );
        assert_eq!(
            native_status(Callback::ShouldShow, Err(CallbackError::Failure)),
            HResult::E_FAIL
        );
    }

    #[test]
    fn hresult_display_is_hex() {
        assert_eq!(HResult::E_FAIL.to_string(), "0x80004005");
        assert_eq!(HResult::S_FALSE.to_string(), "0x00000001");
    }
}
