use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::item::BrowserItem;
use crate::logging::{eb_debug, eb_trace};

/// Kinds of events the browser sends to its host.
///
/// Events concern only the items of the folder view; the navigation pane
/// does not produce any.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Sent before the default action is taken on the selected item(s).
    /// Vetoing it prevents the default action.
    DefaultCommand,
    /// Sent after the selection changed. With an empty selection the item is
    /// `Unknown` and carries no other information.
    SelectionChanged,
    /// Sent before the context menu for the selected item(s) is shown.
    /// Vetoing it prevents the menu.
    ContextMenuStart,
    /// Sent before the folder changes; the item is the target folder.
    /// Vetoing it cancels the navigation.
    Navigating,
    /// Sent after the folder changed.
    NavigationComplete,
    /// Sent when the folder could not be changed, for example because the
    /// navigation was vetoed or the folder is not available.
    NavigationFailed,
    /// Sent when the view for a folder was created.
    ViewCreated,
}

impl EventKind {
    /// Whether a handler may veto this event.
    pub fn is_vetoable(self) -> bool {
        matches!(
            self,
            EventKind::DefaultCommand | EventKind::ContextMenuStart | EventKind::Navigating
        )
    }
}

/// An event delivered to host handlers.
///
/// For events about the selection, the item is the first selected item;
/// use [`ExplorerBrowser::selected_items`](crate::ExplorerBrowser::selected_items)
/// to obtain all of them.
#[derive(Clone, Debug)]
pub struct BrowserEvent {
    kind: EventKind,
    item: BrowserItem,
    vetoed: bool,
}

impl BrowserEvent {
    pub(crate) fn new(kind: EventKind, item: BrowserItem) -> Self {
        Self {
            kind,
            item,
            vetoed: false,
        }
    }

    /// What happened.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The item the event is about.
    pub fn item(&self) -> &BrowserItem {
        &self.item
    }

    /// Reject the proposed action. Ignored for events that are not
    /// vetoable.
    pub fn veto(&mut self) {
        if self.kind.is_vetoable() {
            self.vetoed = true;
        } else {
            eb_debug!(kind = ?self.kind, "veto ignored for a notification-only event");
        }
    }

    /// Whether a handler vetoed the event.
    pub fn is_vetoed(&self) -> bool {
        self.vetoed
    }

    /// Whether the proposed action may go ahead.
    pub fn is_allowed(&self) -> bool {
        !self.vetoed
    }
}

/// Identifies a handler registered with [`EventDispatcher::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&mut BrowserEvent)>;

struct Subscription {
    id: SubscriptionId,
    kind: Option<EventKind>,
    handler: Handler,
}

/// Synchronous, in-order delivery of [`BrowserEvent`]s.
///
/// Handlers run on the calling thread in subscription order. They may
/// subscribe, unsubscribe or call back into the browser while an event is
/// being delivered; such changes apply from the next event on.
#[derive(Default)]
pub struct EventDispatcher {
    subscriptions: RefCell<Vec<Subscription>>,
    next_id: Cell<u64>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscriptions", &self.subscriptions.borrow().len())
            .finish()
    }
}

impl EventDispatcher {
    /// An empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `handler` for every event of `kind`.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&mut BrowserEvent) + 'static,
    {
        self.insert(Some(kind), Rc::new(handler))
    }

    /// Call `handler` for every event.
    pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&mut BrowserEvent) + 'static,
    {
        self.insert(None, Rc::new(handler))
    }

    /// Remove a handler. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscriptions.borrow_mut();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    /// Whether any handler listens for `kind`.
    pub fn has_subscribers(&self, kind: EventKind) -> bool {
        self.subscriptions
            .borrow()
            .iter()
            .any(|s| s.kind.is_none_or(|k| k == kind))
    }

    /// Deliver an event and report whether its action may go ahead.
    ///
    /// Always `true` for notification-only events and when nobody listens.
    pub fn dispatch(&self, kind: EventKind, item: BrowserItem) -> bool {
        let handlers: Vec<Handler> = self
            .subscriptions
            .borrow()
            .iter()
            .filter(|s| s.kind.is_none_or(|k| k == kind))
            .map(|s| Rc::clone(&s.handler))
            .collect();

        let mut event = BrowserEvent::new(kind, item);
        for handler in handlers {
            handler(&mut event);
        }
        eb_trace!(
            event = "host.dispatched",
            ?kind,
            vetoed = event.is_vetoed(),
            "event dispatched"
        );
        event.is_allowed()
    }

    fn insert(&self, kind: Option<EventKind>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscriptions
            .borrow_mut()
            .push(Subscription { id, kind, handler });
        id
    }
}
