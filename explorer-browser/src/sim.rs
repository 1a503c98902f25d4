//! In-memory engine that drives the full callback contract.
//!
//! [`SimEngine`] keeps a flat namespace of [`SimItem`]s, navigates between
//! folders, and calls the registered adapter exactly where a native engine
//! would: navigation and view notifications go to every advised sink, the
//! command interceptor and the pane provider are looked up through the site,
//! and the per-item filter is consulted while the view is populated. Like the
//! native engine it reports every selection change twice.
//!
//! Used by the crate's tests and by headless hosts. Failures can be injected
//! per operation with [`SimEngine::fail_on`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::adapter::BrowserEventAdapter;
use crate::engine::{
    AdviseCookie, BrowseFlags, EnginePlatform, ExplorerEngine, FolderView, HostWindow, InputObject,
    RawMessage, Rect, SelectFlags, ShellItem, SiteSetter,
};
use crate::error::{NativeError, NativeResult};
use crate::guid::{iid, sid};
use crate::item::ShellAttributes;
use crate::pane::{PaneId, PaneState};
use crate::roles::{
    CommandInterceptor, ItemFilter, NavigationEvents, NotifyKind, PaneVisibilityProvider, Role,
    ServiceProvider, StateChange, ViewFlags,
};
use crate::selection_guard::Clock;
use crate::settings::{FolderSettings, Options};
use crate::status::{Callback, HResult, native_status};

/// Virtual key code of F5; [`SimEngine`] refreshes its view on it.
pub const VK_F5: usize = 0x74;

/// Class-not-registered status returned by a failing [`SimPlatform`].
const CLASS_NOT_REGISTERED: HResult = HResult(0x8004_0154_u32 as i32);

type Adapter = BrowserEventAdapter<SimEngine>;

/// An entry of the simulated namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimItem {
    key: PathBuf,
    parent: PathBuf,
    path: Option<PathBuf>,
    display_name: String,
    attributes: ShellAttributes,
    broken: bool,
}

fn leaf(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

impl SimItem {
    fn file_system(path: impl Into<PathBuf>, attributes: ShellAttributes) -> Self {
        let path = path.into();
        Self {
            parent: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            display_name: leaf(&path),
            key: path.clone(),
            path: Some(path),
            attributes,
            broken: false,
        }
    }

    /// A file system file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::file_system(path, ShellAttributes::FILESYSTEM | ShellAttributes::STREAM)
    }

    /// A file system directory.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::file_system(path, ShellAttributes::FILESYSTEM | ShellAttributes::FOLDER)
    }

    /// An archive: a file that can also be browsed as a folder.
    pub fn archive(path: impl Into<PathBuf>) -> Self {
        Self::file_system(path, ShellAttributes::KIND_MASK)
    }

    /// An item outside the file system, e.g. inside an archive.
    pub fn virtual_item(
        parent: impl Into<PathBuf>,
        name: &str,
        attributes: ShellAttributes,
    ) -> Self {
        let parent = parent.into();
        Self {
            key: parent.join(name),
            parent,
            path: None,
            display_name: name.to_owned(),
            attributes,
            broken: false,
        }
    }

    /// An item whose attributes cannot be read.
    pub fn broken(parent: impl Into<PathBuf>, name: &str) -> Self {
        Self {
            broken: true,
            ..Self::virtual_item(parent, name, ShellAttributes::empty())
        }
    }

    /// Location of the item in the simulated namespace.
    pub fn key(&self) -> &Path {
        &self.key
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.display_name
    }

    fn is_container(&self) -> bool {
        self.attributes.contains(ShellAttributes::FOLDER)
    }
}

impl ShellItem for SimItem {
    fn attributes(&self, mask: ShellAttributes) -> NativeResult<ShellAttributes> {
        if self.broken {
            return Err(NativeError::fail());
        }
        Ok(self.attributes & mask)
    }

    fn file_system_path(&self) -> NativeResult<PathBuf> {
        self.path
            .clone()
            .ok_or(NativeError::new(HResult::E_INVALIDARG))
    }

    fn display_name(&self) -> NativeResult<String> {
        Ok(self.display_name.clone())
    }
}

/// A resolved absolute location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimLocation(PathBuf);

impl SimLocation {
    /// The folder this location names.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// An item resolved relative to the current folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimChild(PathBuf);

#[derive(Default)]
struct SimState {
    options: Options,
    folder_settings: FolderSettings,
    empty_text: String,
    property_bag: String,
    host: Option<HostWindow>,
    bounds: Rect,
    current: Option<PathBuf>,
    history: Vec<PathBuf>,
    position: usize,
    view_items: Vec<SimItem>,
    selection: Vec<PathBuf>,
    search: String,
    panes: Vec<(PaneId, PaneState)>,
    focused: bool,
    destroyed: bool,
    single_selection_notifications: bool,
}

#[derive(Default)]
struct SimInner {
    entries: RefCell<Vec<SimItem>>,
    state: RefCell<SimState>,
    site: RefCell<Option<Rc<Adapter>>>,
    filter: RefCell<Option<Rc<Adapter>>>,
    sinks: RefCell<Vec<(AdviseCookie, Rc<Adapter>)>>,
    next_cookie: Cell<u32>,
    failures: RefCell<Vec<String>>,
    calls: RefCell<Vec<String>>,
}

/// Simulated browsing engine.
///
/// Cloning yields another handle to the same engine.
#[derive(Clone, Default)]
pub struct SimEngine {
    inner: Rc<SimInner>,
}

impl fmt::Debug for SimEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SimEngine")
            .field("current", &state.current)
            .field("items", &state.view_items.len())
            .field("destroyed", &state.destroyed)
            .finish_non_exhaustive()
    }
}

impl SimEngine {
    /// An engine with an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    // namespace

    /// Add any item.
    pub fn add_item(&self, item: SimItem) -> &Self {
        self.inner.entries.borrow_mut().push(item);
        self
    }

    /// Add a directory.
    pub fn add_folder(&self, path: impl Into<PathBuf>) -> &Self {
        self.add_item(SimItem::directory(path))
    }

    /// Add a file.
    pub fn add_file(&self, path: impl Into<PathBuf>) -> &Self {
        self.add_item(SimItem::file(path))
    }

    /// Add an archive.
    pub fn add_archive(&self, path: impl Into<PathBuf>) -> &Self {
        self.add_item(SimItem::archive(path))
    }

    /// Add an item outside the file system below `parent`.
    pub fn add_virtual(
        &self,
        parent: impl Into<PathBuf>,
        name: &str,
        attributes: ShellAttributes,
    ) -> &Self {
        self.add_item(SimItem::virtual_item(parent, name, attributes))
    }

    /// Add an item whose attributes cannot be read.
    pub fn add_broken(&self, parent: impl Into<PathBuf>, name: &str) -> &Self {
        self.add_item(SimItem::broken(parent, name))
    }

    // fault injection and call log

    /// Make every call of `operation` (e.g. `"refresh"`) fail with `E_FAIL`.
    pub fn fail_on(&self, operation: &str) -> &Self {
        self.inner.failures.borrow_mut().push(operation.to_owned());
        self
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        self.inner.failures.borrow_mut().clear();
    }

    /// Operations called so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.borrow().clone()
    }

    /// Forget the call log.
    pub fn clear_calls(&self) {
        self.inner.calls.borrow_mut().clear();
    }

    fn check(&self, label: &str) -> NativeResult<()> {
        self.inner.calls.borrow_mut().push(label.to_owned());
        let base = label.split('(').next().unwrap_or(label);
        if self.inner.failures.borrow().iter().any(|f| f == base) {
            return Err(NativeError::fail());
        }
        Ok(())
    }

    // user actions

    /// Show `path` without any navigation callbacks.
    pub fn open(&self, path: impl Into<PathBuf>) -> &Self {
        let path = path.into();
        {
            let mut state = self.inner.state.borrow_mut();
            state.history.push(path.clone());
            state.position = state.history.len() - 1;
            state.current = Some(path);
            state.selection.clear();
        }
        self.enumerate();
        self
    }

    /// Select the visible item called `name` without notifying anyone.
    pub fn select_quietly(&self, name: &str) -> &Self {
        let mut state = self.inner.state.borrow_mut();
        let key = state
            .view_items
            .iter()
            .find(|i| i.display_name == name)
            .map(|i| i.key.clone());
        state.selection = key.into_iter().collect();
        self
    }

    /// The user clicks the item called `name`.
    pub fn user_select(&self, name: &str) -> NativeResult<()> {
        let view = self.current_view()?;
        let child = view.parse_child(name)?;
        view.select_item(Some(&child), SelectFlags::SELECT | SelectFlags::DESELECT_OTHERS)
    }

    /// The user double-clicks the selection. Returns whether the default
    /// action (opening a folder) ran.
    pub fn user_activate(&self) -> bool {
        if let Some(interceptor) = self.interceptor() {
            let status = native_status(Callback::DefaultCommand, Ok(interceptor.on_default_command()));
            if status == HResult::S_OK {
                return false;
            }
        }
        let target = {
            let state = self.inner.state.borrow();
            state
                .selection
                .first()
                .and_then(|key| state.view_items.iter().find(|i| &i.key == key))
                .filter(|i| i.is_container())
                .map(|i| i.key.clone())
        };
        if let Some(target) = target {
            // a refused navigation still counts as the default action
            let _ = self.navigate(target, BrowseFlags::empty(), None);
        }
        true
    }

    /// The user right-clicks the selection. Returns whether the context menu
    /// was shown.
    pub fn user_context_menu(&self) -> bool {
        let Some(interceptor) = self.interceptor() else {
            return true;
        };
        let status = native_status(
            Callback::Notify,
            Ok(interceptor.notify(NotifyKind::ContextMenuStart)),
        );
        if status == HResult::S_OK {
            return false;
        }
        interceptor.notify(NotifyKind::ContextMenuDone);
        true
    }

    /// Give or take the input focus.
    pub fn set_focus(&self, focused: bool) {
        self.inner.state.borrow_mut().focused = focused;
    }

    /// Report each selection change once instead of twice.
    pub fn set_single_selection_notifications(&self, single: bool) {
        self.inner.state.borrow_mut().single_selection_notifications = single;
    }

    // inspection

    /// Folder currently shown.
    pub fn current_folder(&self) -> Option<PathBuf> {
        self.inner.state.borrow().current.clone()
    }

    /// Display names of the items in the view.
    pub fn visible_names(&self) -> Vec<String> {
        self.inner
            .state
            .borrow()
            .view_items
            .iter()
            .map(|i| i.display_name.clone())
            .collect()
    }

    /// Display names of the selected items.
    pub fn selected_names(&self) -> Vec<String> {
        let state = self.inner.state.borrow();
        state
            .selection
            .iter()
            .filter_map(|key| state.view_items.iter().find(|i| &i.key == key))
            .map(|i| i.display_name.clone())
            .collect()
    }

    /// Pane state negotiated when the current view was created.
    pub fn applied_pane_state(&self, pane: PaneId) -> Option<PaneState> {
        self.inner
            .state
            .borrow()
            .panes
            .iter()
            .find(|(p, _)| *p == pane)
            .map(|&(_, s)| s)
    }

    /// Current search text.
    pub fn search_text(&self) -> String {
        self.inner.state.borrow().search.clone()
    }

    /// Text shown for an empty view.
    pub fn empty_text(&self) -> String {
        self.inner.state.borrow().empty_text.clone()
    }

    /// Name under which view state is persisted.
    pub fn property_bag(&self) -> String {
        self.inner.state.borrow().property_bag.clone()
    }

    /// Current folder settings.
    pub fn folder_settings(&self) -> FolderSettings {
        self.inner.state.borrow().folder_settings
    }

    /// Window the engine was initialized in.
    pub fn host(&self) -> Option<HostWindow> {
        self.inner.state.borrow().host
    }

    /// Position of the engine's window.
    pub fn bounds(&self) -> Rect {
        self.inner.state.borrow().bounds
    }

    /// Whether an adapter is attached as site.
    pub fn has_site(&self) -> bool {
        self.inner.site.borrow().is_some()
    }

    /// Whether a folder filter is registered.
    pub fn has_filter(&self) -> bool {
        self.inner.filter.borrow().is_some()
    }

    /// Number of advised sinks.
    pub fn sink_count(&self) -> usize {
        self.inner.sinks.borrow().len()
    }

    /// Whether [`destroy`](ExplorerEngine::destroy) ran.
    pub fn is_destroyed(&self) -> bool {
        self.inner.state.borrow().destroyed
    }

    // engine internals

    fn set_site(&self, site: Option<Rc<Adapter>>) -> NativeResult<()> {
        self.check(if site.is_some() { "set_site" } else { "set_site(none)" })?;
        let previous = self.inner.site.replace(site);
        drop(previous);
        Ok(())
    }

    fn interceptor(&self) -> Option<Rc<Adapter>> {
        let site = self.inner.site.borrow().clone()?;
        let role = site.query_service(&sid::EXPLORER_BROWSER_FRAME, &iid::COMMDLG_BROWSER3);
        (role == Ok(Role::CommandInterceptor)).then_some(site)
    }

    fn pane_provider(&self) -> Option<Rc<Adapter>> {
        let site = self.inner.site.borrow().clone()?;
        let role = site.query_service(&sid::EXPLORER_PANE_VISIBILITY, &iid::EXPLORER_PANE_VISIBILITY);
        (role == Ok(Role::PaneVisibility)).then_some(site)
    }

    fn folder_filter(&self) -> Option<Rc<Adapter>> {
        let filter = self.inner.filter.borrow().clone()?;
        (filter.query_interface(&iid::FOLDER_FILTER) == Ok(Role::ItemFilter)).then_some(filter)
    }

    fn sinks(&self) -> Vec<Rc<Adapter>> {
        self.inner
            .sinks
            .borrow()
            .iter()
            .map(|(_, sink)| Rc::clone(sink))
            .collect()
    }

    fn folder_item(&self, key: &Path) -> Option<SimItem> {
        self.inner
            .entries
            .borrow()
            .iter()
            .find(|i| i.key == key && i.is_container())
            .cloned()
    }

    fn children(&self, key: &Path) -> Vec<SimItem> {
        self.inner
            .entries
            .borrow()
            .iter()
            .filter(|i| i.parent == key)
            .cloned()
            .collect()
    }

    /// Re-populate the view from the current folder, consulting the filter.
    fn enumerate(&self) {
        let (current, search) = {
            let state = self.inner.state.borrow();
            (state.current.clone(), state.search.to_uppercase())
        };
        let Some(current) = current else {
            self.inner.state.borrow_mut().view_items.clear();
            return;
        };
        let interceptor = self.interceptor();
        let flags = interceptor
            .as_ref()
            .map(|i| i.view_flags())
            .unwrap_or_default();
        let consult = !flags.contains(ViewFlags::NO_INCLUDE_ITEM);
        let filter = if consult { self.folder_filter() } else { None };

        let visible: Vec<SimItem> = self
            .children(&current)
            .into_iter()
            .filter(|item| {
                if consult {
                    if let Some(i) = &interceptor {
                        let status = native_status(Callback::IncludeObject, Ok(i.include_object(item)));
                        if status != HResult::S_OK {
                            return false;
                        }
                    }
                }
                if let Some(f) = &filter {
                    if native_status(Callback::ShouldShow, f.should_show(item)) != HResult::S_OK {
                        return false;
                    }
                }
                search.is_empty() || item.display_name.to_uppercase().contains(&search)
            })
            .collect();

        let mut state = self.inner.state.borrow_mut();
        state
            .selection
            .retain(|key| visible.iter().any(|i| &i.key == key));
        state.view_items = visible;
    }

    fn notify_selection_changed(&self) {
        let Some(interceptor) = self.interceptor() else {
            return;
        };
        let repeats = if self.inner.state.borrow().single_selection_notifications {
            1
        } else {
            2
        };
        for _ in 0..repeats {
            interceptor.on_state_change(StateChange::SelectionChange);
        }
    }

    fn navigate(
        &self,
        target: PathBuf,
        flags: BrowseFlags,
        history_position: Option<usize>,
    ) -> NativeResult<()> {
        let folder = self
            .folder_item(&target)
            .ok_or(NativeError::new(HResult::E_FILE_NOT_FOUND))?;

        for sink in self.sinks() {
            let status = native_status(Callback::NavigationPending, sink.on_navigation_pending(&folder));
            if status.is_failure() {
                for sink in self.sinks() {
                    sink.on_navigation_failed(&folder);
                }
                return Ok(());
            }
        }
        if let Some(interceptor) = self.interceptor() {
            interceptor.on_pre_view_created();
        }

        {
            let mut state = self.inner.state.borrow_mut();
            match history_position {
                Some(position) => state.position = position,
                None if !state.options.contains(Options::NO_TRAVEL_LOG) => {
                    let keep = (state.position + 1).min(state.history.len());
                    state.history.truncate(keep);
                    state.history.push(target.clone());
                    state.position = state.history.len() - 1;
                }
                None => {}
            }
            state.current = Some(target);
            state.selection.clear();
            if !flags.contains(BrowseFlags::KEEP_WORD_WHEEL_TEXT) {
                state.search.clear();
            }
        }

        if let Some(provider) = self.pane_provider() {
            let panes = PaneId::ALL
                .into_iter()
                .filter_map(|pane| provider.pane_state(&pane.guid()).ok().map(|s| (pane, s)))
                .collect();
            self.inner.state.borrow_mut().panes = panes;
        }

        self.enumerate();

        let view = SimView {
            engine: self.clone(),
        };
        for sink in self.sinks() {
            let _ = native_status(Callback::ViewCreated, sink.on_view_created(&view));
        }
        for sink in self.sinks() {
            sink.on_navigation_complete(&folder);
        }
        Ok(())
    }

    fn resolve_relative(&self, flags: BrowseFlags) -> NativeResult<(PathBuf, Option<usize>)> {
        let state = self.inner.state.borrow();
        let current = state.current.clone().ok_or(NativeError::fail())?;
        if flags.contains(BrowseFlags::PARENT) {
            let parent = current.parent().ok_or(NativeError::fail())?;
            return Ok((parent.to_path_buf(), None));
        }
        let position = if flags.contains(BrowseFlags::NAVIGATE_BACK) {
            state.position.checked_sub(1)
        } else {
            Some(state.position + 1)
        };
        position
            .and_then(|p| state.history.get(p).map(|target| (target.clone(), Some(p))))
            .ok_or(NativeError::fail())
    }
}

impl ExplorerEngine for SimEngine {
    type Item = SimItem;
    type View = SimView;
    type Location = SimLocation;

    fn parse_location(&self, name: &str) -> NativeResult<SimLocation> {
        self.check("parse_location")?;
        let key = PathBuf::from(name);
        self.folder_item(&key)
            .map(|_| SimLocation(key))
            .ok_or(NativeError::new(HResult::E_FILE_NOT_FOUND))
    }

    fn options(&self) -> NativeResult<Options> {
        self.check("options")?;
        Ok(self.inner.state.borrow().options)
    }

    fn set_options(&self, options: Options) -> NativeResult<()> {
        self.check("set_options")?;
        self.inner.state.borrow_mut().options = options;
        Ok(())
    }

    fn set_folder_settings(&self, settings: FolderSettings) -> NativeResult<()> {
        self.check("set_folder_settings")?;
        self.inner.state.borrow_mut().folder_settings = settings;
        Ok(())
    }

    fn set_empty_text(&self, text: &str) -> NativeResult<()> {
        self.check("set_empty_text")?;
        self.inner.state.borrow_mut().empty_text = text.to_owned();
        Ok(())
    }

    fn set_property_bag(&self, name: &str) -> NativeResult<()> {
        self.check("set_property_bag")?;
        self.inner.state.borrow_mut().property_bag = name.to_owned();
        Ok(())
    }

    fn set_filter(&self, filter: Option<Rc<Adapter>>) -> NativeResult<()> {
        self.check(if filter.is_some() { "set_filter" } else { "set_filter(none)" })?;
        let previous = self.inner.filter.replace(filter);
        drop(previous);
        Ok(())
    }

    fn initialize(
        &self,
        host: HostWindow,
        bounds: Rect,
        settings: FolderSettings,
    ) -> NativeResult<()> {
        self.check("initialize")?;
        let mut state = self.inner.state.borrow_mut();
        if state.host.is_some() {
            return Err(NativeError::fail());
        }
        state.host = Some(host);
        state.bounds = bounds;
        state.folder_settings = settings;
        Ok(())
    }

    fn advise(&self, sink: Rc<Adapter>) -> NativeResult<AdviseCookie> {
        self.check("advise")?;
        let cookie = AdviseCookie(self.inner.next_cookie.get() + 1);
        self.inner.next_cookie.set(cookie.0);
        self.inner.sinks.borrow_mut().push((cookie, sink));
        Ok(cookie)
    }

    fn unadvise(&self, cookie: AdviseCookie) -> NativeResult<()> {
        self.check("unadvise")?;
        let removed = {
            let mut sinks = self.inner.sinks.borrow_mut();
            let position = sinks
                .iter()
                .position(|(c, _)| *c == cookie)
                .ok_or(NativeError::new(HResult::E_INVALIDARG))?;
            sinks.remove(position)
        };
        drop(removed);
        Ok(())
    }

    fn browse_to(&self, location: Option<&SimLocation>, flags: BrowseFlags) -> NativeResult<()> {
        self.check("browse_to")?;
        let (once, navigated, ready) = {
            let state = self.inner.state.borrow();
            (
                state.options.contains(Options::NAVIGATE_ONCE),
                state.current.is_some(),
                state.host.is_some() && !state.destroyed,
            )
        };
        if !ready {
            return Err(NativeError::fail());
        }
        if once && navigated {
            return Ok(());
        }
        let (target, position) = if flags.intersects(BrowseFlags::RELATIVE) {
            self.resolve_relative(flags)?
        } else {
            let location = location.ok_or(NativeError::new(HResult::E_INVALIDARG))?;
            (location.0.clone(), None)
        };
        self.navigate(target, flags, position)
    }

    fn current_view(&self) -> NativeResult<SimView> {
        self.check("current_view")?;
        let state = self.inner.state.borrow();
        if state.destroyed || state.current.is_none() {
            return Err(NativeError::fail());
        }
        Ok(SimView {
            engine: self.clone(),
        })
    }

    fn remove_all(&self) -> NativeResult<()> {
        self.check("remove_all")?;
        let mut state = self.inner.state.borrow_mut();
        state.view_items.clear();
        state.selection.clear();
        Ok(())
    }

    fn set_rect(&self, bounds: Rect) -> NativeResult<()> {
        self.check("set_rect")?;
        self.inner.state.borrow_mut().bounds = bounds;
        Ok(())
    }

    fn input_object(&self) -> Option<&dyn InputObject> {
        if self.is_destroyed() {
            return None;
        }
        Some(self)
    }

    fn destroy(&self) -> NativeResult<()> {
        self.check("destroy")?;
        {
            let mut state = self.inner.state.borrow_mut();
            state.destroyed = true;
            state.current = None;
            state.view_items.clear();
            state.selection.clear();
        }
        let site = self.inner.site.take();
        let filter = self.inner.filter.take();
        let sinks = self.inner.sinks.take();
        drop((site, filter, sinks));
        Ok(())
    }
}

impl InputObject for SimEngine {
    fn has_focus(&self) -> bool {
        self.inner.state.borrow().focused
    }

    fn translate_accelerator(&self, message: &RawMessage) -> bool {
        self.inner
            .calls
            .borrow_mut()
            .push("translate_accelerator".to_owned());
        if message.message == RawMessage::KEY_DOWN && message.wparam == VK_F5 {
            self.enumerate();
            return true;
        }
        false
    }
}

/// View of a [`SimEngine`]'s current folder.
#[derive(Clone, Debug)]
pub struct SimView {
    engine: SimEngine,
}

impl FolderView for SimView {
    type Item = SimItem;
    type Child = SimChild;

    fn folder(&self) -> NativeResult<SimItem> {
        self.engine.check("folder")?;
        self.engine
            .current_folder()
            .and_then(|key| self.engine.folder_item(&key))
            .ok_or(NativeError::fail())
    }

    fn selected_item(&self) -> NativeResult<Option<SimItem>> {
        self.engine.check("selected_item")?;
        let state = self.engine.inner.state.borrow();
        Ok(state
            .selection
            .first()
            .and_then(|key| state.view_items.iter().find(|i| &i.key == key))
            .cloned())
    }

    fn selection(&self) -> NativeResult<Vec<SimItem>> {
        self.engine.check("selection")?;
        let state = self.engine.inner.state.borrow();
        if state.selection.is_empty() {
            // the native view fails instead of returning an empty array
            return Err(NativeError::fail());
        }
        Ok(state
            .selection
            .iter()
            .filter_map(|key| state.view_items.iter().find(|i| &i.key == key))
            .cloned()
            .collect())
    }

    fn items(&self) -> NativeResult<Vec<SimItem>> {
        self.engine.check("items")?;
        Ok(self.engine.inner.state.borrow().view_items.clone())
    }

    fn parse_child(&self, name: &str) -> NativeResult<SimChild> {
        self.engine.check("parse_child")?;
        let current = self.engine.current_folder().ok_or(NativeError::fail())?;
        let by_path = PathBuf::from(name);
        self.engine
            .children(&current)
            .into_iter()
            .find(|i| i.key == by_path || i.display_name.eq_ignore_ascii_case(name))
            .map(|i| SimChild(i.key))
            .ok_or(NativeError::new(HResult::E_FILE_NOT_FOUND))
    }

    fn select_item(&self, child: Option<&SimChild>, flags: SelectFlags) -> NativeResult<()> {
        self.engine.check("select_item")?;
        let changed = {
            let mut state = self.engine.inner.state.borrow_mut();
            if let Some(child) = child {
                if !state.view_items.iter().any(|i| i.key == child.0) {
                    return Err(NativeError::new(HResult::E_INVALIDARG));
                }
            }
            let before = state.selection.clone();
            if flags.contains(SelectFlags::DESELECT_OTHERS) {
                state
                    .selection
                    .retain(|key| child.is_some_and(|c| &c.0 == key));
            }
            if let Some(child) = child {
                if flags.contains(SelectFlags::SELECT) && !state.selection.contains(&child.0) {
                    state.selection.push(child.0.clone());
                }
            }
            if !flags.contains(SelectFlags::NO_TAKE_FOCUS) {
                state.focused = true;
            }
            state.selection != before
        };
        if changed {
            self.engine.notify_selection_changed();
        }
        Ok(())
    }

    fn refresh(&self) -> NativeResult<()> {
        self.engine.check("refresh")?;
        self.engine.enumerate();
        Ok(())
    }

    fn filter_view(&self, text: &str) -> NativeResult<()> {
        self.engine.check("filter_view")?;
        self.engine.inner.state.borrow_mut().search = text.to_owned();
        self.engine.enumerate();
        Ok(())
    }
}

fn sim_set_site(engine: &SimEngine, site: Option<Rc<Adapter>>) -> NativeResult<()> {
    engine.set_site(site)
}

/// Hands out one shared [`SimEngine`].
#[derive(Clone, Debug)]
pub struct SimPlatform {
    engine: SimEngine,
    site_setter: bool,
    instantiate_fails: bool,
}

impl SimPlatform {
    /// A platform whose engines are `engine`.
    pub fn new(engine: SimEngine) -> Self {
        Self {
            engine,
            site_setter: true,
            instantiate_fails: false,
        }
    }

    /// A platform lacking the site-setting entry point.
    pub fn without_site_setter(mut self) -> Self {
        self.site_setter = false;
        self
    }

    /// A platform on which the engine is not registered.
    pub fn unregistered(mut self) -> Self {
        self.instantiate_fails = true;
        self
    }
}

impl EnginePlatform for SimPlatform {
    type Engine = SimEngine;

    fn instantiate(&self) -> NativeResult<SimEngine> {
        if self.instantiate_fails {
            return Err(NativeError::new(CLASS_NOT_REGISTERED));
        }
        Ok(self.engine.clone())
    }

    fn resolve_site_setter(&self) -> Option<SiteSetter<SimEngine>> {
        self.site_setter
            .then_some(sim_set_site as SiteSetter<SimEngine>)
    }
}

/// A [`Clock`] that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// A clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SimEngine {
        let engine = SimEngine::new();
        engine
            .add_folder("/root")
            .add_folder("/root/sub")
            .add_file("/root/one.txt")
            .add_archive("/root/pack.zip")
            .add_virtual("/root/pack.zip", "inner.txt", ShellAttributes::STREAM);
        engine
            .initialize(HostWindow(1), Rect::default(), FolderSettings::default())
            .unwrap();
        engine
    }

    #[test]
    fn browsing_keeps_history() {
        let engine = engine();
        let root = engine.parse_location("/root").unwrap();
        engine.browse_to(Some(&root), BrowseFlags::empty()).unwrap();
        assert_eq!(engine.visible_names(), ["sub", "one.txt", "pack.zip"]);

        let zip = engine.parse_location("/root/pack.zip").unwrap();
        engine.browse_to(Some(&zip), BrowseFlags::empty()).unwrap();
        assert_eq!(engine.visible_names(), ["inner.txt"]);

        engine.browse_to(None, BrowseFlags::NAVIGATE_BACK).unwrap();
        assert_eq!(engine.current_folder(), Some(PathBuf::from("/root")));
        engine.browse_to(None, BrowseFlags::NAVIGATE_FORWARD).unwrap();
        assert_eq!(engine.current_folder(), Some(PathBuf::from("/root/pack.zip")));
        assert!(engine.browse_to(None, BrowseFlags::NAVIGATE_FORWARD).is_err());
        engine.browse_to(None, BrowseFlags::PARENT).unwrap();
        assert_eq!(engine.current_folder(), Some(PathBuf::from("/root")));
    }

    #[test]
    fn unknown_locations_do_not_parse() {
        let engine = engine();
        assert_eq!(
            engine.parse_location("/missing").unwrap_err().code(),
            HResult::E_FILE_NOT_FOUND
        );
        assert!(engine.parse_location("/root/one.txt").is_err());
    }

    #[test]
    fn selection_without_notifications() {
        let engine = engine();
        engine.open("/root").select_quietly("one.txt");
        let view = engine.current_view().unwrap();
        assert_eq!(view.selected_item().unwrap().map(|i| i.display_name), Some("one.txt".into()));
        view.select_item(None, SelectFlags::DESELECT_OTHERS).unwrap();
        assert!(view.selection().is_err());
    }

    #[test]
    fn injected_failures_are_reported_and_logged() {
        let engine = engine();
        engine.open("/root").fail_on("refresh");
        let view = engine.current_view().unwrap();
        assert_eq!(view.refresh().unwrap_err().code(), HResult::E_FAIL);
        assert!(engine.calls().contains(&"refresh".to_owned()));
        engine.clear_failures();
        assert!(view.refresh().is_ok());
    }

    #[test]
    fn search_text_narrows_the_view() {
        let engine = engine();
        engine.open("/root");
        let view = engine.current_view().unwrap();
        view.filter_view("ONE").unwrap();
        assert_eq!(engine.visible_names(), ["one.txt"]);
        view.filter_view("").unwrap();
        assert_eq!(engine.visible_names().len(), 3);
    }

    #[test]
    fn f5_refreshes_when_focused() {
        let engine = engine();
        engine.open("/root");
        let input = engine.input_object().unwrap();
        assert!(input.translate_accelerator(&RawMessage::new(RawMessage::KEY_DOWN, VK_F5, 0)));
        assert!(!input.translate_accelerator(&RawMessage::new(RawMessage::KEY_DOWN, 0x41, 0)));
    }

    #[test]
    fn platform_variants() {
        let platform = SimPlatform::new(SimEngine::new());
        assert!(platform.resolve_site_setter().is_some());
        assert!(platform.clone().without_site_setter().resolve_site_setter().is_none());
        assert_eq!(
            platform.unregistered().instantiate().unwrap_err().code(),
            CLASS_NOT_REGISTERED
        );
    }
}
