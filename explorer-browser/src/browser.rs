//! Toolkit-neutral facade over the embedded engine.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::adapter::BrowserEventAdapter;
use crate::engine::{
    AdviseCookie, BrowseFlags, BrowseTarget, EnginePlatform, ExplorerEngine, Extent, FolderView,
    HostWindow, RawMessage, Rect, SelectFlags, ShellItem, SiteSetter,
};
use crate::error::{BrowserError, NativeResultExt};
use crate::events::EventDispatcher;
use crate::filter::FilterSpec;
use crate::item::{BrowserItem, ItemKinds, convert_shell_item};
use crate::logging::{api_error, eb_debug, eb_warn};
use crate::pane::PaneVisibilitySettings;
use crate::selection_guard::{Clock, SystemClock};
use crate::settings::{CreateOptions, FolderSettings, Options};

type Engine<P> = <P as EnginePlatform>::Engine;

struct Session<E: ExplorerEngine> {
    engine: Rc<E>,
    adapter: Rc<BrowserEventAdapter<E>>,
    site_attached: bool,
    filter_registered: bool,
    cookie: Option<AdviseCookie>,
}

impl<E: ExplorerEngine> Clone for Session<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Rc::clone(&self.engine),
            adapter: Rc::clone(&self.adapter),
            site_attached: self.site_attached,
            filter_registered: self.filter_registered,
            cookie: self.cookie,
        }
    }
}

impl<E: ExplorerEngine> Session<E> {
    /// Unregister the adapter and destroy the engine. Every step is
    /// attempted; failures are logged.
    fn teardown(self, site_setter: Option<SiteSetter<E>>) {
        let Session {
            engine,
            adapter,
            site_attached,
            filter_registered,
            cookie,
        } = self;

        if site_attached {
            if let Some(set_site) = site_setter {
                if let Err(e) = set_site(&engine, None) {
                    api_error("set_site(None)", &e);
                }
            }
        }
        if let Some(cookie) = cookie {
            if let Err(e) = engine.unadvise(cookie) {
                api_error("ExplorerEngine::unadvise", &e);
            }
        }
        if filter_registered {
            if let Err(e) = engine.set_filter(None) {
                api_error("ExplorerEngine::set_filter(None)", &e);
            }
        }
        if let Err(e) = engine.destroy() {
            api_error("ExplorerEngine::destroy", &e);
        }
        eb_debug!(
            event = "browser.destroyed",
            adapter_refs = Rc::strong_count(&adapter),
            "engine destroyed"
        );
        drop(engine);
        drop(adapter);
    }
}

enum Lifecycle<E: ExplorerEngine> {
    Uncreated,
    Created(Session<E>),
    Destroyed,
}

/// An embedded folder browser.
///
/// Created in two steps: [`new`](Self::new) resolves the platform entry
/// points, [`create`](Self::create) instantiates the engine inside a host
/// window and navigates to the first folder. Every operation other than
/// `create` requires a created browser and returns
/// [`BrowserError::NotCreated`] (or [`BrowserError::Destroyed`]) otherwise.
///
/// All methods take `&self`. The engine calls back synchronously, and event
/// handlers may call into the browser again while an operation is still
/// running.
///
/// Dropping the browser destroys the engine.
pub struct ExplorerBrowser<P: EnginePlatform> {
    platform: P,
    site_setter: Option<SiteSetter<Engine<P>>>,
    events: Rc<EventDispatcher>,
    clock: Rc<dyn Clock>,
    state: RefCell<Lifecycle<Engine<P>>>,
}

impl<P: EnginePlatform> fmt::Debug for ExplorerBrowser<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.borrow() {
            Lifecycle::Uncreated => "uncreated",
            Lifecycle::Created(_) => "created",
            Lifecycle::Destroyed => "destroyed",
        };
        f.debug_struct("ExplorerBrowser")
            .field("state", &state)
            .field("site_setter", &self.site_setter.is_some())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl<P: EnginePlatform> ExplorerBrowser<P> {
    /// A browser on `platform`, timing selection notifications with the
    /// system clock.
    pub fn new(platform: P) -> Self {
        Self::with_clock(platform, Rc::new(SystemClock))
    }

    /// A browser on `platform` using `clock` to collapse doubled selection
    /// notifications.
    pub fn with_clock(platform: P, clock: Rc<dyn Clock>) -> Self {
        let site_setter = platform.resolve_site_setter();
        if site_setter.is_none() {
            eb_warn!("platform provides no site setter; create() will fail");
        }
        Self {
            platform,
            site_setter,
            events: Rc::new(EventDispatcher::new()),
            clock,
            state: RefCell::new(Lifecycle::Uncreated),
        }
    }

    /// Where host handlers subscribe. Handlers may be added before or after
    /// [`create`](Self::create).
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Whether [`create`](Self::create) succeeded and the browser was not
    /// destroyed since.
    pub fn is_created(&self) -> bool {
        matches!(*self.state.borrow(), Lifecycle::Created(_))
    }

    fn session(&self) -> Result<Session<Engine<P>>, BrowserError> {
        match &*self.state.borrow() {
            Lifecycle::Created(session) => Ok(session.clone()),
            Lifecycle::Uncreated => Err(BrowserError::NotCreated),
            Lifecycle::Destroyed => Err(BrowserError::Destroyed),
        }
    }

    fn view(&self) -> Result<<Engine<P> as ExplorerEngine>::View, BrowserError> {
        self.session()?
            .engine
            .current_view()
            .op("ExplorerEngine::current_view")
    }

    /// Create the engine inside `host` and navigate to `initial_path`.
    ///
    /// Can be called once. On failure everything set up so far is torn down
    /// again and the browser stays uncreated.
    pub fn create(
        &self,
        host: HostWindow,
        options: CreateOptions,
        initial_path: &str,
    ) -> Result<(), BrowserError> {
        match &*self.state.borrow() {
            Lifecycle::Uncreated => {}
            Lifecycle::Created(_) => return Err(BrowserError::AlreadyCreated),
            Lifecycle::Destroyed => return Err(BrowserError::Destroyed),
        }

        let engine = Rc::new(self.platform.instantiate().op("EnginePlatform::instantiate")?);
        let adapter = Rc::new(BrowserEventAdapter::new(
            Rc::downgrade(&engine),
            Rc::clone(&self.events),
            Rc::clone(&self.clock),
        ));
        adapter.set_pane_settings(*options.initial_pane_settings());

        let mut session = Session {
            engine,
            adapter,
            site_attached: false,
            filter_registered: false,
            cookie: None,
        };
        if let Err(e) = self.attach(&mut session, host, &options) {
            eb_warn!(event = "browser.create_failed", error = %e, "create failed");
            session.teardown(self.site_setter);
            return Err(e);
        }

        *self.state.borrow_mut() = Lifecycle::Created(session.clone());

        let location = session
            .engine
            .parse_location(initial_path)
            .op("ExplorerEngine::parse_location")
            .and_then(|location| {
                session
                    .engine
                    .browse_to(Some(&location), BrowseFlags::empty())
                    .op("ExplorerEngine::browse_to")
            });
        if let Err(e) = location {
            eb_warn!(event = "browser.create_failed", error = %e, "initial navigation failed");
            drop(session);
            // a handler may have destroyed the browser during the navigation
            let previous = self.state.replace(Lifecycle::Uncreated);
            match previous {
                Lifecycle::Created(session) => session.teardown(self.site_setter),
                other => *self.state.borrow_mut() = other,
            }
            return Err(e);
        }
        eb_debug!(event = "browser.created", path = initial_path, "browser created");
        Ok(())
    }

    fn attach(
        &self,
        session: &mut Session<Engine<P>>,
        host: HostWindow,
        options: &CreateOptions,
    ) -> Result<(), BrowserError> {
        let engine = &session.engine;
        engine
            .set_options(options.engine_options())
            .op("ExplorerEngine::set_options")?;

        let set_site = self
            .site_setter
            .ok_or(BrowserError::Unsupported("setting the engine site"))?;
        set_site(engine, Some(Rc::clone(&session.adapter))).op("set_site")?;
        session.site_attached = true;

        engine
            .set_filter(Some(Rc::clone(&session.adapter)))
            .op("ExplorerEngine::set_filter")?;
        session.filter_registered = true;

        engine
            .initialize(host, Rect::default(), options.initial_folder_settings())
            .op("ExplorerEngine::initialize")?;

        let cookie = engine
            .advise(Rc::clone(&session.adapter))
            .op("ExplorerEngine::advise")?;
        session.cookie = Some(cookie);
        Ok(())
    }

    /// Tear the engine down. Further operations fail with
    /// [`BrowserError::Destroyed`]. Destroying twice is a no-op.
    pub fn destroy(&self) {
        let previous = self.state.replace(Lifecycle::Destroyed);
        match previous {
            Lifecycle::Created(session) => session.teardown(self.site_setter),
            Lifecycle::Uncreated | Lifecycle::Destroyed => {}
        }
    }

    /// The engine handle, for features this facade does not cover.
    pub fn engine(&self) -> Result<Rc<Engine<P>>, BrowserError> {
        Ok(self.session()?.engine)
    }

    // navigation

    /// Navigate to a path or parsing name. With `keep_filter_text` the
    /// search text of the current view is carried over.
    pub fn browse_to(&self, path: &str, keep_filter_text: bool) -> Result<(), BrowserError> {
        let engine = self.session()?.engine;
        let location = engine
            .parse_location(path)
            .op("ExplorerEngine::parse_location")?;
        engine
            .browse_to(Some(&location), browse_flags(keep_filter_text))
            .op("ExplorerEngine::browse_to")
    }

    /// Navigate relative to the current folder.
    pub fn browse_to_target(
        &self,
        target: BrowseTarget,
        keep_filter_text: bool,
    ) -> Result<(), BrowserError> {
        let engine = self.session()?.engine;
        engine
            .browse_to(None, target.flags() | browse_flags(keep_filter_text))
            .op("ExplorerEngine::browse_to")
    }

    // filtering

    /// Show only items of `kinds` whose names match one of `masks`; items of
    /// other kinds are always shown. The view is refreshed.
    ///
    /// Filtering does not apply to query-backed views such as libraries and
    /// search results.
    pub fn set_filter<I, S>(&self, masks: I, kinds: ItemKinds) -> Result<(), BrowserError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if kinds.is_empty() {
            return Err(BrowserError::NoItemKinds);
        }
        let session = self.session()?;
        session.adapter.set_filter(FilterSpec::new(masks, kinds));
        self.refresh_after_filter_change();
        Ok(())
    }

    /// Show all items again. The view is refreshed.
    pub fn remove_filter(&self) -> Result<(), BrowserError> {
        self.session()?.adapter.remove_filter();
        self.refresh_after_filter_change();
        Ok(())
    }

    /// The active filter.
    pub fn filter(&self) -> Result<FilterSpec, BrowserError> {
        Ok(FilterSpec::clone(&self.session()?.adapter.filter()))
    }

    fn refresh_after_filter_change(&self) {
        // the filter is in place even when the view cannot be refreshed now
        if let Err(e) = self.refresh() {
            eb_warn!(error = %e, "view not refreshed after filter change");
        }
    }

    // selection and items

    /// Add `items` to the selection. Each item is located in the current
    /// folder by path or, when it has none, by display name. Stops at the
    /// first item that cannot be located or selected.
    pub fn select_items(&self, items: &[BrowserItem], keep_focus: bool) -> Result<(), BrowserError> {
        let view = self.view()?;
        let mut flags = SelectFlags::SELECT;
        if keep_focus {
            flags |= SelectFlags::NO_TAKE_FOCUS;
        }
        for item in items {
            let child = view
                .parse_child(&item.parse_name())
                .op("FolderView::parse_child")?;
            view.select_item(Some(&child), flags)
                .op("FolderView::select_item")?;
        }
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect_all_items(&self, keep_focus: bool) -> Result<(), BrowserError> {
        let mut flags = SelectFlags::DESELECT_OTHERS;
        if keep_focus {
            flags |= SelectFlags::NO_TAKE_FOCUS;
        }
        self.view()?
            .select_item(None, flags)
            .op("FolderView::select_item")
    }

    /// Selected items of `kinds`, in selection order.
    pub fn selected_items(&self, kinds: ItemKinds) -> Result<Vec<BrowserItem>, BrowserError> {
        if kinds.is_empty() {
            return Err(BrowserError::NoItemKinds);
        }
        match self.view()?.selection() {
            Ok(items) => convert_items(&items, kinds, "FolderView::selection"),
            // the view reports an empty selection as a failure
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Items of `kinds` shown in the view, in view order.
    pub fn all_items(&self, kinds: ItemKinds) -> Result<Vec<BrowserItem>, BrowserError> {
        if kinds.is_empty() {
            return Err(BrowserError::NoItemKinds);
        }
        let items = self.view()?.items().op("FolderView::items")?;
        convert_items(&items, kinds, "FolderView::items")
    }

    /// The folder shown in the view.
    pub fn folder(&self) -> Result<BrowserItem, BrowserError> {
        let folder = self.view()?.folder().op("FolderView::folder")?;
        convert_shell_item(&folder).ok_or(BrowserError::ItemConversion {
            operation: "FolderView::folder",
        })
    }

    // view

    /// Replace the pane policy. Takes effect when the engine creates its
    /// next view, e.g. after navigating.
    pub fn set_pane_settings(&self, settings: PaneVisibilitySettings) -> Result<(), BrowserError> {
        self.session()?.adapter.set_pane_settings(settings);
        Ok(())
    }

    /// The pane policy.
    pub fn pane_settings(&self) -> Result<PaneVisibilitySettings, BrowserError> {
        Ok(self.session()?.adapter.pane_settings())
    }

    /// Re-enumerate the current folder.
    pub fn refresh(&self) -> Result<(), BrowserError> {
        self.view()?.refresh().op("FolderView::refresh")
    }

    /// Show only items matching `text`; an empty text cancels the search.
    pub fn search_folder(&self, text: &str) -> Result<(), BrowserError> {
        self.view()?.filter_view(text).op("FolderView::filter_view")
    }

    /// Remove all items from a results folder.
    pub fn remove_all_items(&self) -> Result<(), BrowserError> {
        self.session()?
            .engine
            .remove_all()
            .op("ExplorerEngine::remove_all")
    }

    /// Resize the engine to the host's client area.
    pub fn set_size(&self, extent: Extent) -> Result<(), BrowserError> {
        self.session()?
            .engine
            .set_rect(Rect::from_extent(extent))
            .op("ExplorerEngine::set_rect")
    }

    /// Offer a message from the host's message loop to the engine. Only
    /// keyboard messages are considered, and only while the engine has the
    /// focus. Returns whether the engine consumed the message.
    pub fn translate_accelerator(&self, message: &RawMessage) -> bool {
        if !message.is_keyboard() {
            return false;
        }
        let Ok(session) = self.session() else {
            return false;
        };
        let Some(input) = session.engine.input_object() else {
            return false;
        };
        input.has_focus() && input.translate_accelerator(message)
    }

    // engine settings

    /// Replace the view mode and display flags.
    pub fn set_folder_settings(&self, settings: FolderSettings) -> Result<(), BrowserError> {
        self.session()?
            .engine
            .set_folder_settings(settings)
            .op("ExplorerEngine::set_folder_settings")
    }

    /// Current engine options.
    pub fn options(&self) -> Result<Options, BrowserError> {
        self.session()?
            .engine
            .options()
            .op("ExplorerEngine::options")
    }

    /// Replace the engine options.
    pub fn set_options(&self, options: Options) -> Result<(), BrowserError> {
        self.session()?
            .engine
            .set_options(options)
            .op("ExplorerEngine::set_options")
    }

    /// Text shown when the view is empty.
    pub fn set_empty_text(&self, text: &str) -> Result<(), BrowserError> {
        self.session()?
            .engine
            .set_empty_text(text)
            .op("ExplorerEngine::set_empty_text")
    }

    /// Name under which the engine persists view state.
    pub fn set_property_bag(&self, name: &str) -> Result<(), BrowserError> {
        self.session()?
            .engine
            .set_property_bag(name)
            .op("ExplorerEngine::set_property_bag")
    }
}

impl<P: EnginePlatform> Drop for ExplorerBrowser<P> {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn browse_flags(keep_filter_text: bool) -> BrowseFlags {
    if keep_filter_text {
        BrowseFlags::KEEP_WORD_WHEEL_TEXT
    } else {
        BrowseFlags::empty()
    }
}

fn convert_items<I: ShellItem>(
    items: &[I],
    kinds: ItemKinds,
    operation: &'static str,
) -> Result<Vec<BrowserItem>, BrowserError> {
    let mut converted = Vec::with_capacity(items.len());
    for item in items {
        let item = convert_shell_item(item).ok_or(BrowserError::ItemConversion { operation })?;
        if kinds.contains_kind(item.kind()) {
            converted.push(item);
        }
    }
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimEngine, SimPlatform};

    fn browser() -> (SimEngine, ExplorerBrowser<SimPlatform>) {
        let engine = SimEngine::new();
        engine
            .add_folder("/home")
            .add_file("/home/notes.txt")
            .add_folder("/home/music");
        let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));
        (engine, browser)
    }

    #[test]
    fn operations_require_a_created_browser() {
        let (_engine, browser) = browser();
        assert_eq!(browser.refresh(), Err(BrowserError::NotCreated));
        assert_eq!(browser.folder(), Err(BrowserError::NotCreated));
        assert!(!browser.translate_accelerator(&RawMessage::new(RawMessage::KEY_DOWN, 0, 0)));
    }

    #[test]
    fn create_sets_up_in_order() {
        let (engine, browser) = browser();
        browser
            .create(HostWindow(7), CreateOptions::new(), "/home")
            .unwrap();
        assert_eq!(
            engine.calls()[..6],
            ["set_options", "set_site", "set_filter", "initialize", "advise", "parse_location"]
        );
        assert_eq!(engine.host(), Some(HostWindow(7)));
        assert_eq!(browser.folder().unwrap().display_name(), "home");
    }

    #[test]
    fn second_create_is_rejected() {
        let (_engine, browser) = browser();
        browser.create(HostWindow(1), CreateOptions::new(), "/home").unwrap();
        assert_eq!(
            browser.create(HostWindow(1), CreateOptions::new(), "/home"),
            Err(BrowserError::AlreadyCreated)
        );
    }

    #[test]
    fn destroy_tears_down_in_order() {
        let (engine, browser) = browser();
        browser.create(HostWindow(1), CreateOptions::new(), "/home").unwrap();
        engine.clear_calls();
        browser.destroy();
        assert_eq!(
            engine.calls(),
            ["set_site(none)", "unadvise", "set_filter(none)", "destroy"]
        );
        assert_eq!(browser.refresh(), Err(BrowserError::Destroyed));
        browser.destroy();
        assert_eq!(engine.calls().len(), 4);
    }

    #[test]
    fn empty_kind_sets_are_rejected() {
        let (_engine, browser) = browser();
        browser.create(HostWindow(1), CreateOptions::new(), "/home").unwrap();
        assert_eq!(browser.all_items(ItemKinds::empty()), Err(BrowserError::NoItemKinds));
        assert_eq!(
            browser.selected_items(ItemKinds::empty()),
            Err(BrowserError::NoItemKinds)
        );
        assert_eq!(
            browser.set_filter(["*.txt"], ItemKinds::empty()),
            Err(BrowserError::NoItemKinds)
        );
    }
}
