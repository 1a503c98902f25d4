//! The consumed side of the contract: what the browser needs from the
//! embedded browsing engine.
//!
//! A platform backend implements [`EnginePlatform`], [`ExplorerEngine`],
//! [`FolderView`] and [`ShellItem`] on top of the native engine. Calls go
//! through `&self`: the engine is re-entrant and may call back into the
//! [`BrowserEventAdapter`] before a call returns.

use std::path::PathBuf;
use std::rc::Rc;

use bitflags::bitflags;

use crate::adapter::BrowserEventAdapter;
use crate::error::NativeResult;
use crate::item::ShellAttributes;
use crate::settings::{FolderSettings, Options};

/// A native shell item.
pub trait ShellItem {
    /// Attributes of the item restricted to `mask`.
    fn attributes(&self, mask: ShellAttributes) -> NativeResult<ShellAttributes>;
    /// Absolute file system path. Fails for items that are not part of the
    /// file system.
    fn file_system_path(&self) -> NativeResult<PathBuf>;
    /// Parent-relative display name.
    fn display_name(&self) -> NativeResult<String>;
}

/// The folder view currently shown by the engine.
pub trait FolderView {
    /// Native item type.
    type Item: ShellItem;
    /// Native identifier of an item relative to the view's folder.
    type Child;

    /// The folder whose contents are displayed.
    fn folder(&self) -> NativeResult<Self::Item>;
    /// First selected item, `None` when nothing is selected.
    fn selected_item(&self) -> NativeResult<Option<Self::Item>>;
    /// All selected items.
    fn selection(&self) -> NativeResult<Vec<Self::Item>>;
    /// All items of the view, in view order.
    fn items(&self) -> NativeResult<Vec<Self::Item>>;
    /// Resolve a path or a display name relative to the view's folder.
    fn parse_child(&self, name: &str) -> NativeResult<Self::Child>;
    /// Change the selection state of `child`, or of every item when `None`.
    fn select_item(&self, child: Option<&Self::Child>, flags: SelectFlags) -> NativeResult<()>;
    /// Re-enumerate the folder.
    fn refresh(&self) -> NativeResult<()>;
    /// Show only items matching the search `text`; empty text cancels.
    fn filter_view(&self, text: &str) -> NativeResult<()>;
}

/// Keyboard focus and accelerator handling of the engine.
pub trait InputObject {
    /// Whether the engine holds the input focus.
    fn has_focus(&self) -> bool;
    /// Offer `message` to the engine; returns whether it was consumed.
    fn translate_accelerator(&self, message: &RawMessage) -> bool;
}

/// The embedded browsing engine.
pub trait ExplorerEngine: Sized + 'static {
    /// Native item type.
    type Item: ShellItem;
    /// Folder view type.
    type View: FolderView<Item = Self::Item>;
    /// Native absolute location.
    type Location;

    /// Resolve a path or parsing name to an absolute location.
    fn parse_location(&self, name: &str) -> NativeResult<Self::Location>;
    /// Current options.
    fn options(&self) -> NativeResult<Options>;
    /// Replace the options.
    fn set_options(&self, options: Options) -> NativeResult<()>;
    /// Replace the folder settings of the view.
    fn set_folder_settings(&self, settings: FolderSettings) -> NativeResult<()>;
    /// Text shown when the view has no items.
    fn set_empty_text(&self, text: &str) -> NativeResult<()>;
    /// Name under which view state is persisted.
    fn set_property_bag(&self, name: &str) -> NativeResult<()>;
    /// Register the per-item filter; `None` removes it.
    fn set_filter(&self, filter: Option<Rc<BrowserEventAdapter<Self>>>) -> NativeResult<()>;
    /// Create the engine's window inside `host`.
    fn initialize(&self, host: HostWindow, bounds: Rect, settings: FolderSettings)
    -> NativeResult<()>;
    /// Subscribe `sink` to navigation/view notifications.
    fn advise(&self, sink: Rc<BrowserEventAdapter<Self>>) -> NativeResult<AdviseCookie>;
    /// Drop the subscription made by [`advise`](Self::advise).
    fn unadvise(&self, cookie: AdviseCookie) -> NativeResult<()>;
    /// Navigate to `location`, or relative to the current folder when
    /// `location` is `None` and `flags` name a relative target.
    fn browse_to(&self, location: Option<&Self::Location>, flags: BrowseFlags)
    -> NativeResult<()>;
    /// The current folder view.
    fn current_view(&self) -> NativeResult<Self::View>;
    /// Remove all items from a results folder.
    fn remove_all(&self) -> NativeResult<()>;
    /// Position the engine's window inside the host.
    fn set_rect(&self, bounds: Rect) -> NativeResult<()>;
    /// Keyboard handling, when the engine supports it.
    fn input_object(&self) -> Option<&dyn InputObject>;
    /// Tear the engine down.
    fn destroy(&self) -> NativeResult<()>;
}

/// Attaches (or detaches, with `None`) the adapter as the engine's site.
///
/// This is an optional OS entry point; platforms that lack it return `None`
/// from [`EnginePlatform::resolve_site_setter`].
pub type SiteSetter<E> = fn(&E, Option<Rc<BrowserEventAdapter<E>>>) -> NativeResult<()>;

/// Factory for engines and resolver of optional platform entry points.
pub trait EnginePlatform {
    /// Engine type produced by this platform.
    type Engine: ExplorerEngine;

    /// Instantiate a fresh engine.
    fn instantiate(&self) -> NativeResult<Self::Engine>;
    /// Look up the site-setting entry point. Called once per browser.
    fn resolve_site_setter(&self) -> Option<SiteSetter<Self::Engine>>;
}

/// Opaque native handle of the host window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HostWindow(pub isize);

/// Rectangle in host client coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl Rect {
    /// A rectangle at the origin covering `extent`.
    pub fn from_extent(extent: Extent) -> Self {
        Self {
            left: 0,
            top: 0,
            right: extent.width,
            bottom: extent.height,
        }
    }
}

/// Size of the host's client area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Extent {
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Extent {
    /// `width` x `height`.
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A raw window message as received by the host's message loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RawMessage {
    /// Message identifier.
    pub message: u32,
    /// First parameter.
    pub wparam: usize,
    /// Second parameter.
    pub lparam: isize,
}

impl RawMessage {
    /// First keyboard message identifier.
    pub const KEY_FIRST: u32 = 0x0100;
    /// Key pressed.
    pub const KEY_DOWN: u32 = 0x0100;
    /// Last keyboard message identifier.
    pub const KEY_LAST: u32 = 0x0109;

    /// A message without parameters.
    pub fn new(message: u32, wparam: usize, lparam: isize) -> Self {
        Self {
            message,
            wparam,
            lparam,
        }
    }

    /// Whether this is keyboard input.
    pub fn is_keyboard(&self) -> bool {
        (Self::KEY_FIRST..=Self::KEY_LAST).contains(&self.message)
    }
}

/// Relative navigation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BrowseTarget {
    /// The parent of the current folder.
    Parent,
    /// Back in the browsing history.
    HistoryBack,
    /// Forward in the browsing history.
    HistoryForward,
}

impl BrowseTarget {
    /// Navigation flag naming this target.
    pub fn flags(self) -> BrowseFlags {
        match self {
            BrowseTarget::Parent => BrowseFlags::PARENT,
            BrowseTarget::HistoryBack => BrowseFlags::NAVIGATE_BACK,
            BrowseTarget::HistoryForward => BrowseFlags::NAVIGATE_FORWARD,
        }
    }
}

bitflags! {
    /// Navigation request flags.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BrowseFlags: u32 {
        /// Go to the parent folder
        const PARENT = 0x0000_2000;
        /// Go back in history
        const NAVIGATE_BACK = 0x0000_4000;
        /// Go forward in history
        const NAVIGATE_FORWARD = 0x0000_8000;
        /// Keep the search text of the current view
        const KEEP_WORD_WHEEL_TEXT = 0x0004_0000;
    }
}

impl BrowseFlags {
    /// Flags naming a relative target.
    pub const RELATIVE: BrowseFlags = BrowseFlags::PARENT
        .union(BrowseFlags::NAVIGATE_BACK)
        .union(BrowseFlags::NAVIGATE_FORWARD);
}

bitflags! {
    /// Selection change flags.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SelectFlags: u32 {
        /// Select the item
        const SELECT = 0x0000_0001;
        /// Deselect every other item
        const DESELECT_OTHERS = 0x0000_0004;
        /// Do not move the input focus to the view
        const NO_TAKE_FOCUS = 0x8000_0000;
    }
}

/// Token identifying a notification subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AdviseCookie(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_range() {
        assert!(RawMessage::new(RawMessage::KEY_DOWN, 0x41, 0).is_keyboard());
        assert!(RawMessage::new(RawMessage::KEY_LAST, 0, 0).is_keyboard());
        assert!(!RawMessage::new(0x0200, 0, 0).is_keyboard());
    }

    #[test]
    fn rect_from_extent() {
        let r = Rect::from_extent(Extent::new(640, 480));
        assert_eq!(
            r,
            Rect {
                left: 0,
                top: 0,
                right: 640,
                bottom: 480
            }
        );
    }

    #[test]
    fn relative_targets() {
        for target in [
            BrowseTarget::Parent,
            BrowseTarget::HistoryBack,
            BrowseTarget::HistoryForward,
        ] {
            assert!(BrowseFlags::RELATIVE.contains(target.flags()));
        }
    }
}
