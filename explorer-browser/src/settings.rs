use bitflags::bitflags;

use crate::pane::PaneVisibilitySettings;

bitflags! {
    /// Engine behavior toggles.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Options: u32 {
        /// Navigate only once; further navigation requests are ignored
        const NAVIGATE_ONCE = 0x0000_0001;
        /// Show the frames (navigation pane, command bar, ...)
        const SHOW_FRAMES = 0x0000_0002;
        /// Navigate even when the target is the current folder
        const ALWAYS_NAVIGATE = 0x0000_0004;
        /// Do not keep a navigation history
        const NO_TRAVEL_LOG = 0x0000_0008;
        /// Do not create a wrapper window around the view
        const NO_WRAPPER_WINDOW = 0x0000_0010;
        /// Show SharePoint sites in the web view
        const HTML_SHAREPOINT_VIEW = 0x0000_0020;
        /// Do not draw a border around the browser
        const NO_BORDER = 0x0000_0040;
        /// Do not persist view state
        const NO_PERSIST_VIEW_STATE = 0x0000_0080;
    }
}

/// Folder view mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum ViewMode {
    /// Chosen by the engine per folder
    #[default]
    Auto = -1,
    /// Large icons
    Icon = 1,
    /// Small icons
    SmallIcon = 2,
    /// List
    List = 3,
    /// Details (columns)
    Details = 4,
    /// Thumbnails
    Thumbnail = 5,
    /// Tiles
    Tile = 6,
    /// Filmstrip
    ThumbStrip = 7,
    /// Content
    Content = 8,
}

bitflags! {
    /// Display flags of the folder view.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct FolderFlags: u32 {
        /// Arrange items automatically
        const AUTO_ARRANGE = 0x0000_0001;
        /// Abbreviate names
        const ABBREVIATED_NAMES = 0x0000_0002;
        /// Snap items to the grid
        const SNAP_TO_GRID = 0x0000_0004;
        /// The view is owner-data
        const OWNER_DATA = 0x0000_0008;
        /// Size the window to fit its contents
        const BEST_FIT_WINDOW = 0x0000_0010;
        /// Desktop view
        const DESKTOP = 0x0000_0020;
        /// Single selection only
        const SINGLE_SEL = 0x0000_0040;
        /// Do not show subfolders
        const NO_SUBFOLDERS = 0x0000_0080;
        /// Transparent background
        const TRANSPARENT = 0x0000_0100;
        /// No client edge
        const NO_CLIENT_EDGE = 0x0000_0200;
        /// No scrolling
        const NO_SCROLL = 0x0000_0400;
        /// Align items to the left
        const ALIGN_LEFT = 0x0000_0800;
        /// No icons
        const NO_ICONS = 0x0000_1000;
        /// Always show the selection
        const SHOW_SEL_ALWAYS = 0x0000_2000;
        /// Not visible
        const NO_VISIBLE = 0x0000_4000;
        /// Single-click activation
        const SINGLE_CLICK_ACTIVATE = 0x0000_8000;
        /// No web view
        const NO_WEB_VIEW = 0x0001_0000;
        /// Hide file names
        const HIDE_FILE_NAMES = 0x0002_0000;
        /// Check boxes for selection
        const CHECK_SELECT = 0x0004_0000;
        /// No refresh on enumeration
        const NO_ENUM_REFRESH = 0x0008_0000;
        /// No grouping
        const NO_GROUPING = 0x0010_0000;
        /// Full-row selection
        const FULL_ROW_SELECT = 0x0020_0000;
        /// No column filters
        const NO_FILTERS = 0x0040_0000;
        /// No column header
        const NO_COLUMN_HEADER = 0x0080_0000;
        /// No header in any view
        const NO_HEADER_IN_ALL_VIEWS = 0x0100_0000;
        /// Extended tiles
        const EXTENDED_TILES = 0x0200_0000;
        /// Tri-state check boxes
        const TRI_CHECK_SELECT = 0x0400_0000;
        /// Check box follows selection
        const AUTO_CHECK_SELECT = 0x0800_0000;
        /// Do not use browser view state
        const NO_BROWSER_VIEW_STATE = 0x1000_0000;
        /// Show only a subset of groups
        const SUBSET_GROUPS = 0x2000_0000;
        /// Use the search folder
        const USE_SEARCH_FOLDER = 0x4000_0000;
        /// Right-to-left reading order
        const ALLOW_RTL_READING = 0x8000_0000;
    }
}

/// View mode and display flags of the folder view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FolderSettings {
    /// View mode.
    pub view_mode: ViewMode,
    /// Display flags.
    pub flags: FolderFlags,
}

impl FolderSettings {
    /// Settings with the given mode and flags.
    pub fn new(view_mode: ViewMode, flags: FolderFlags) -> Self {
        Self { view_mode, flags }
    }
}

/// Parameters of a newly created browser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateOptions {
    pub(crate) options: Options,
    pub(crate) folder_settings: FolderSettings,
    pub(crate) pane_settings: PaneVisibilitySettings,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            options: Options::NO_BORDER | Options::SHOW_FRAMES,
            folder_settings: FolderSettings::default(),
            pane_settings: PaneVisibilitySettings::default(),
        }
    }
}

impl CreateOptions {
    /// Defaults: no border, frames shown, automatic view mode, panes left to
    /// the engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine options
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Initial folder settings
    pub fn folder_settings(mut self, settings: FolderSettings) -> Self {
        self.folder_settings = settings;
        self
    }

    /// Initial pane visibility
    pub fn pane_settings(mut self, settings: PaneVisibilitySettings) -> Self {
        self.pane_settings = settings;
        self
    }

    /// Configured engine options.
    pub fn engine_options(&self) -> Options {
        self.options
    }

    /// Configured folder settings.
    pub fn initial_folder_settings(&self) -> FolderSettings {
        self.folder_settings
    }

    /// Configured pane settings.
    pub fn initial_pane_settings(&self) -> &PaneVisibilitySettings {
        &self.pane_settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::{PaneId, PaneState, PaneVisibility};

    #[test]
    fn create_options_defaults() {
        let opts = CreateOptions::new();
        assert_eq!(opts.engine_options(), Options::NO_BORDER | Options::SHOW_FRAMES);
        assert_eq!(opts.initial_folder_settings().view_mode, ViewMode::Auto);
        assert!(opts.initial_folder_settings().flags.is_empty());
    }

    #[test]
    fn create_options_builder() {
        let panes = PaneVisibilitySettings::new()
            .with(PaneId::PreviewPane, PaneState::new(PaneVisibility::DefaultOn));
        let opts = CreateOptions::new()
            .options(Options::NO_TRAVEL_LOG)
            .folder_settings(FolderSettings::new(ViewMode::Details, FolderFlags::NO_WEB_VIEW))
            .pane_settings(panes);
        assert_eq!(opts.engine_options(), Options::NO_TRAVEL_LOG);
        assert_eq!(opts.initial_folder_settings().view_mode, ViewMode::Details);
        assert_eq!(opts.initial_pane_settings(), &panes);
    }

    #[test]
    fn native_values() {
        assert_eq!(ViewMode::Auto as i32, -1);
        assert_eq!(ViewMode::Content as i32, 8);
        assert_eq!(FolderFlags::ALLOW_RTL_READING.bits(), 0x8000_0000);
        assert_eq!(Options::NO_PERSIST_VIEW_STATE.bits(), 0x80);
    }
}
