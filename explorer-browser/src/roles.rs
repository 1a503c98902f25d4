//! The callback contract the engine drives.
//!
//! One object plays every role; the engine finds a role by interface
//! identifier through [`role_for_interface`] and then calls the matching
//! trait. Results are typed ([`Verdict`], [`CallbackError`]) and only turned
//! into native status codes by [`native_status`](crate::status::native_status).

use bitflags::bitflags;

use crate::guid::{Guid, iid, sid};
use crate::pane::PaneState;
use crate::status::{CallbackError, Verdict};

/// The callback roles of the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Object identity.
    Identity,
    /// [`ServiceProvider`]
    ServiceProvider,
    /// [`CommandInterceptor`]
    CommandInterceptor,
    /// [`NavigationEvents`]
    NavigationEvents,
    /// [`ItemFilter`]
    ItemFilter,
    /// [`PaneVisibilityProvider`]
    PaneVisibility,
}

const ROLE_TABLE: &[(Guid, Role)] = &[
    (iid::UNKNOWN, Role::Identity),
    (iid::SERVICE_PROVIDER, Role::ServiceProvider),
    (iid::COMMDLG_BROWSER, Role::CommandInterceptor),
    (iid::COMMDLG_BROWSER2, Role::CommandInterceptor),
    (iid::COMMDLG_BROWSER3, Role::CommandInterceptor),
    (iid::EXPLORER_BROWSER_EVENTS, Role::NavigationEvents),
    (iid::FOLDER_FILTER, Role::ItemFilter),
    (iid::EXPLORER_PANE_VISIBILITY, Role::PaneVisibility),
];

/// The role answering `interface`, or `None` when the adapter does not
/// implement it.
pub fn role_for_interface(interface: &Guid) -> Option<Role> {
    ROLE_TABLE
        .iter()
        .find(|(id, _)| id == interface)
        .map(|&(_, role)| role)
}

/// Services the adapter resolves through [`ServiceProvider::query_service`].
pub const SUPPORTED_SERVICES: [Guid; 2] = [sid::EXPLORER_BROWSER_FRAME, sid::EXPLORER_PANE_VISIBILITY];

bitflags! {
    /// Answer to [`CommandInterceptor::view_flags`].
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ViewFlags: u32 {
        /// Do not call the per-item include/filter callbacks
        const NO_INCLUDE_ITEM = 0x0000_0010;
        /// Do not show the "select" verb in context menus
        const NO_SELECT_VERB = 0x0000_0020;
    }
}

/// View state changes reported to [`CommandInterceptor::on_state_change`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateChange {
    /// The view gained focus.
    SetFocus,
    /// The view lost focus.
    KillFocus,
    /// The selection changed.
    SelectionChange,
    /// An item is being renamed.
    Rename,
    /// Check state of an item changed.
    StateChange,
    /// Any code the adapter does not know.
    Other(u32),
}

impl StateChange {
    /// Decode the native change code.
    pub fn from_raw(code: u32) -> Self {
        match code {
            0 => StateChange::SetFocus,
            1 => StateChange::KillFocus,
            2 => StateChange::SelectionChange,
            3 => StateChange::Rename,
            4 => StateChange::StateChange,
            other => StateChange::Other(other),
        }
    }
}

/// Notifications delivered through [`CommandInterceptor::notify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotifyKind {
    /// The context menu was dismissed.
    ContextMenuDone,
    /// The context menu is about to be shown.
    ContextMenuStart,
    /// Any code the adapter does not know.
    Other(u32),
}

impl NotifyKind {
    /// Decode the native notification code.
    pub fn from_raw(code: u32) -> Self {
        match code {
            1 => NotifyKind::ContextMenuDone,
            2 => NotifyKind::ContextMenuStart,
            other => NotifyKind::Other(other),
        }
    }
}

/// Resolves services the engine asks its site for.
pub trait ServiceProvider {
    /// The role answering `interface` within `service`.
    fn query_service(&self, service: &Guid, interface: &Guid) -> Result<Role, CallbackError>;
}

/// Intercepts commands of the folder view.
pub trait CommandInterceptor {
    /// Native item type.
    type Item;

    /// The user activated the selection. `Suppress` skips the default
    /// action.
    fn on_default_command(&self) -> Verdict;

    /// The view state changed.
    fn on_state_change(&self, change: StateChange) -> Verdict;

    /// A context menu notification. `Suppress` prevents the menu.
    fn notify(&self, kind: NotifyKind) -> Verdict;

    /// Flags controlling which callbacks the view makes.
    fn view_flags(&self) -> ViewFlags;

    /// Per-item include check.
    fn include_object(&self, _item: &Self::Item) -> Verdict {
        Verdict::Proceed
    }

    /// Text of the default context menu item.
    fn default_menu_text(&self) -> Verdict {
        Verdict::NotHandled
    }

    /// The file pattern the view should filter with.
    fn current_filter(&self) -> Result<String, CallbackError> {
        Err(CallbackError::NotImplemented)
    }

    /// A column header was clicked.
    fn on_column_clicked(&self, _column: i32) -> Verdict {
        Verdict::Proceed
    }

    /// A view is about to be created.
    fn on_pre_view_created(&self) -> Verdict {
        Verdict::Proceed
    }
}

/// Navigation and view lifecycle notifications.
pub trait NavigationEvents {
    /// Native item type.
    type Item;
    /// Folder view type.
    type View;

    /// About to navigate to `folder`. `Suppress` or an error cancels the
    /// navigation.
    fn on_navigation_pending(&self, folder: &Self::Item) -> Result<Verdict, CallbackError>;

    /// A view for the new folder exists.
    fn on_view_created(&self, view: &Self::View) -> Result<Verdict, CallbackError>;

    /// Navigation to `folder` finished.
    fn on_navigation_complete(&self, folder: &Self::Item) -> Verdict;

    /// Navigation to `folder` failed or was cancelled.
    fn on_navigation_failed(&self, folder: &Self::Item) -> Verdict;
}

/// Per-item visibility predicate of the folder view.
pub trait ItemFilter {
    /// Native item type.
    type Item;

    /// Enumeration flags for the folder; the adapter leaves them alone.
    fn enum_flags(&self) -> Verdict {
        Verdict::Proceed
    }

    /// `Proceed` shows the item, `Suppress` hides it. An item that cannot be
    /// classified is an error.
    fn should_show(&self, item: &Self::Item) -> Result<Verdict, CallbackError>;
}

/// Negotiates the visibility of explorer panes.
pub trait PaneVisibilityProvider {
    /// The directive for `pane`; unknown panes are an invalid argument.
    fn pane_state(&self, pane: &Guid) -> Result<PaneState, CallbackError>;
}
