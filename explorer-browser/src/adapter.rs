//! The object the engine calls back into.
//!
//! [`BrowserEventAdapter`] plays all five callback roles of
//! [`roles`](crate::roles). It turns native items into [`BrowserItem`]s,
//! drops doubled selection notifications, applies the [`FilterSpec`] and
//! forwards everything the host cares about to the [`EventDispatcher`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::engine::{ExplorerEngine, FolderView};
use crate::events::{EventDispatcher, EventKind};
use crate::filter::FilterSpec;
use crate::guid::Guid;
use crate::item::{BrowserItem, ItemKind, convert_shell_item};
use crate::logging::{api_error, eb_debug, eb_trace};
use crate::pane::{PaneState, PaneVisibilitySettings};
use crate::roles::{
    CommandInterceptor, ItemFilter, NavigationEvents, NotifyKind, PaneVisibilityProvider, Role,
    SUPPORTED_SERVICES, ServiceProvider, StateChange, ViewFlags, role_for_interface,
};
use crate::selection_guard::{Clock, SelectionChangeGuard};
use crate::status::{CallbackError, Verdict};

/// Callback sink registered with the engine.
///
/// The engine keeps an `Rc` to the adapter while it is subscribed; the
/// adapter only holds a weak reference back, so callbacks that arrive while
/// the engine is being torn down see "no selection".
///
/// Configuration is replaced wholesale and read as snapshots; no borrow is
/// held while a host handler or an engine call runs, so handlers may
/// reconfigure the browser from inside a callback.
pub struct BrowserEventAdapter<E: ExplorerEngine> {
    engine: Weak<E>,
    events: Rc<EventDispatcher>,
    filter: RefCell<Rc<FilterSpec>>,
    panes: Cell<PaneVisibilitySettings>,
    selection_guard: RefCell<SelectionChangeGuard>,
    clock: Rc<dyn Clock>,
}

impl<E: ExplorerEngine> fmt::Debug for BrowserEventAdapter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserEventAdapter")
            .field("engine_alive", &(self.engine.strong_count() > 0))
            .field("filter", &self.filter.borrow())
            .field("panes", &self.panes.get())
            .finish_non_exhaustive()
    }
}

impl<E: ExplorerEngine> BrowserEventAdapter<E> {
    /// An adapter reporting to `events`, with no filter and default panes.
    pub fn new(engine: Weak<E>, events: Rc<EventDispatcher>, clock: Rc<dyn Clock>) -> Self {
        Self {
            engine,
            events,
            filter: RefCell::new(Rc::new(FilterSpec::default())),
            panes: Cell::new(PaneVisibilitySettings::default()),
            selection_guard: RefCell::new(SelectionChangeGuard::new()),
            clock,
        }
    }

    /// Replace the active filter.
    pub fn set_filter(&self, filter: FilterSpec) {
        eb_debug!(?filter, "filter set");
        *self.filter.borrow_mut() = Rc::new(filter);
    }

    /// Drop all masks; every item is shown again.
    pub fn remove_filter(&self) {
        let kinds = self.filter.borrow().kinds();
        *self.filter.borrow_mut() = Rc::new(FilterSpec::new(Vec::<String>::new(), kinds));
    }

    /// Snapshot of the active filter.
    pub fn filter(&self) -> Rc<FilterSpec> {
        Rc::clone(&self.filter.borrow())
    }

    /// Replace the pane policy; the engine picks it up with its next view.
    pub fn set_pane_settings(&self, settings: PaneVisibilitySettings) {
        self.panes.set(settings);
    }

    /// Current pane policy.
    pub fn pane_settings(&self) -> PaneVisibilitySettings {
        self.panes.get()
    }

    /// The role answering `interface`.
    pub fn query_interface(&self, interface: &Guid) -> Result<Role, CallbackError> {
        role_for_interface(interface).ok_or(CallbackError::NoInterface)
    }

    /// First selected item of the current view. `None` when nothing is
    /// selected, the engine is gone, or the item cannot be converted.
    fn selected_item(&self) -> Option<BrowserItem> {
        let engine = self.engine.upgrade()?;
        let view = match engine.current_view() {
            Ok(view) => view,
            Err(e) => {
                api_error("ExplorerEngine::current_view", &e);
                return None;
            }
        };
        match view.selected_item() {
            Ok(Some(item)) => convert_shell_item(&item),
            Ok(None) => None,
            Err(e) => {
                api_error("FolderView::selected_item", &e);
                None
            }
        }
    }

    /// Dispatch `kind` about the native `item`. `None` when the item could
    /// not be converted and nothing was sent.
    fn send_native(&self, kind: EventKind, item: &E::Item) -> Option<bool> {
        let item = convert_shell_item(item)?;
        Some(self.events.dispatch(kind, item))
    }
}

impl<E: ExplorerEngine> ServiceProvider for BrowserEventAdapter<E> {
    fn query_service(&self, service: &Guid, interface: &Guid) -> Result<Role, CallbackError> {
        if SUPPORTED_SERVICES.contains(service) {
            return self.query_interface(interface);
        }
        eb_trace!(%service, "unsupported service requested");
        Err(CallbackError::NoInterface)
    }
}

impl<E: ExplorerEngine> CommandInterceptor for BrowserEventAdapter<E> {
    type Item = E::Item;

    fn on_default_command(&self) -> Verdict {
        if !self.events.has_subscribers(EventKind::DefaultCommand) {
            return Verdict::Proceed;
        }
        match self.selected_item() {
            Some(item) => Verdict::from_allowed(self.events.dispatch(EventKind::DefaultCommand, item)),
            None => Verdict::Proceed,
        }
    }

    fn on_state_change(&self, change: StateChange) -> Verdict {
        if change != StateChange::SelectionChange {
            return Verdict::Proceed;
        }
        let item = self.selected_item().unwrap_or_default();
        let now = self.clock.now();
        let report = self.selection_guard.borrow_mut().observe(&item, now);
        if report {
            self.events.dispatch(EventKind::SelectionChanged, item);
        } else {
            eb_trace!(event = "selection.deduped", "doubled selection notification dropped");
        }
        Verdict::Proceed
    }

    fn notify(&self, kind: NotifyKind) -> Verdict {
        if kind != NotifyKind::ContextMenuStart
            || !self.events.has_subscribers(EventKind::ContextMenuStart)
        {
            return Verdict::NotHandled;
        }
        let Some(item) = self.selected_item() else {
            return Verdict::NotHandled;
        };
        if self.events.dispatch(EventKind::ContextMenuStart, item) {
            Verdict::NotHandled
        } else {
            Verdict::Suppress
        }
    }

    fn view_flags(&self) -> ViewFlags {
        // without this flag neither include_object nor should_show is called
        if self.filter.borrow().is_active() {
            ViewFlags::NO_SELECT_VERB
        } else {
            ViewFlags::NO_SELECT_VERB | ViewFlags::NO_INCLUDE_ITEM
        }
    }
}

impl<E: ExplorerEngine> NavigationEvents for BrowserEventAdapter<E> {
    type Item = E::Item;
    type View = E::View;

    fn on_navigation_pending(&self, folder: &E::Item) -> Result<Verdict, CallbackError> {
        match self.send_native(EventKind::Navigating, folder) {
            Some(allowed) => Ok(Verdict::from_allowed(allowed)),
            None => Err(CallbackError::Failure),
        }
    }

    fn on_view_created(&self, view: &E::View) -> Result<Verdict, CallbackError> {
        let folder = view.folder().map_err(|e| {
            api_error("FolderView::folder", &e);
            CallbackError::Failure
        })?;
        self.send_native(EventKind::ViewCreated, &folder);
        Ok(Verdict::Proceed)
    }

    fn on_navigation_complete(&self, folder: &E::Item) -> Verdict {
        self.send_native(EventKind::NavigationComplete, folder);
        Verdict::Proceed
    }

    fn on_navigation_failed(&self, folder: &E::Item) -> Verdict {
        self.send_native(EventKind::NavigationFailed, folder);
        Verdict::Proceed
    }
}

impl<E: ExplorerEngine> ItemFilter for BrowserEventAdapter<E> {
    type Item = E::Item;

    fn should_show(&self, item: &E::Item) -> Result<Verdict, CallbackError> {
        let filter = self.filter();
        if !filter.is_active() {
            return Ok(Verdict::Proceed);
        }
        let item = convert_shell_item(item).ok_or(CallbackError::Failure)?;
        if item.kind() == ItemKind::Unknown {
            return Err(CallbackError::Failure);
        }
        Ok(Verdict::from_allowed(filter.matches(&item)))
    }
}

impl<E: ExplorerEngine> PaneVisibilityProvider for BrowserEventAdapter<E> {
    fn pane_state(&self, pane: &Guid) -> Result<PaneState, CallbackError> {
        self.panes.get().state_for(pane)
    }
}
