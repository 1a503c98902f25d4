use std::path::{Path, PathBuf};

use bitflags::bitflags;

use crate::engine::ShellItem;
use crate::logging::api_error;

bitflags! {
    /// Attribute bits of a shell item that the browser tracks.
    ///
    /// Values match the native attribute mask so engines can pass their raw
    /// bits straight through [`ShellAttributes::from_bits_truncate`].
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ShellAttributes: u32 {
        /// The item is a shortcut
        const LINK = 0x0001_0000;
        /// The item has a content stream (files, archives)
        const STREAM = 0x0040_0000;
        /// The item can be browsed as a folder
        const FOLDER = 0x2000_0000;
        /// The item is part of the file system
        const FILESYSTEM = 0x4000_0000;
    }
}

impl ShellAttributes {
    /// The attributes requested from the engine for every item.
    pub const QUERY_MASK: ShellAttributes = ShellAttributes::FILESYSTEM
        .union(ShellAttributes::FOLDER)
        .union(ShellAttributes::STREAM)
        .union(ShellAttributes::LINK);

    /// The attributes that decide an item's [`ItemKind`].
    pub const KIND_MASK: ShellAttributes = ShellAttributes::FILESYSTEM
        .union(ShellAttributes::FOLDER)
        .union(ShellAttributes::STREAM);
}

/// Simplified classification of a shell item.
///
/// Archives that can also be browsed as folders are reported as `File`;
/// everything inside such virtual folders is `Other`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum ItemKind {
    /// Unknown, unimportant or invalid item
    #[default]
    Unknown = 0,
    /// File system file
    File = 0x01,
    /// File system directory
    Directory = 0x02,
    /// Neither a file nor a directory
    Other = 0x08,
}

impl ItemKind {
    /// Classify an attribute mask; bits outside [`ShellAttributes::KIND_MASK`]
    /// are ignored.
    pub fn from_attributes(attributes: ShellAttributes) -> Self {
        const FS_FILE: ShellAttributes = ShellAttributes::FILESYSTEM.union(ShellAttributes::STREAM);
        const FS_DIRECTORY: ShellAttributes =
            ShellAttributes::FILESYSTEM.union(ShellAttributes::FOLDER);
        const VIRTUAL_ZIP_DIRECTORY: ShellAttributes = ShellAttributes::KIND_MASK;

        let tracked = attributes & ShellAttributes::KIND_MASK;
        if tracked.is_empty() {
            ItemKind::Unknown
        } else if tracked == FS_FILE || tracked == VIRTUAL_ZIP_DIRECTORY {
            ItemKind::File
        } else if tracked == FS_DIRECTORY {
            ItemKind::Directory
        } else {
            ItemKind::Other
        }
    }

    /// The kind as a one-element [`ItemKinds`] set (empty for `Unknown`).
    pub fn as_kinds(self) -> ItemKinds {
        ItemKinds::from_bits_truncate(self as u32)
    }
}

bitflags! {
    /// A set of [`ItemKind`]s, used by filters and item queries.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ItemKinds: u32 {
        /// File system files
        const FILE = ItemKind::File as u32;
        /// File system directories
        const DIRECTORY = ItemKind::Directory as u32;
        /// Everything else
        const OTHER = ItemKind::Other as u32;
    }
}

impl ItemKinds {
    /// Whether `kind` belongs to the set. `Unknown` never does.
    pub fn contains_kind(self, kind: ItemKind) -> bool {
        self.intersects(kind.as_kinds())
    }
}

/// A very simplified shell item surfaced to the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrowserItem {
    kind: ItemKind,
    path: PathBuf,
    display_name: String,
    attributes: ShellAttributes,
}

impl BrowserItem {
    /// Build an item; the kind is derived from `attributes`.
    pub fn new(
        attributes: ShellAttributes,
        path: impl Into<PathBuf>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            kind: ItemKind::from_attributes(attributes),
            path: path.into(),
            display_name: display_name.into(),
            attributes,
        }
    }

    /// An item identified only by its path, e.g. for
    /// [`ExplorerBrowser::select_items`](crate::ExplorerBrowser::select_items).
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(ShellAttributes::empty(), path, String::new())
    }

    /// An item identified only by its parent-relative display name.
    pub fn from_display_name(name: impl Into<String>) -> Self {
        Self::new(ShellAttributes::empty(), PathBuf::new(), name)
    }

    /// Item classification.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Full file system path for file system items, empty otherwise.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parent-relative display name as shown in the view.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Raw attributes (a combination of the tracked [`ShellAttributes`]).
    pub fn attributes(&self) -> ShellAttributes {
        self.attributes
    }

    /// File system file.
    pub fn is_file(&self) -> bool {
        self.kind == ItemKind::File
    }

    /// File system directory.
    pub fn is_directory(&self) -> bool {
        self.kind == ItemKind::Directory
    }

    /// File system file or directory.
    pub fn is_file_system(&self) -> bool {
        self.is_file() || self.is_directory()
    }

    /// Directory or any other browsable (virtual) folder.
    pub fn is_folder(&self) -> bool {
        self.attributes.contains(ShellAttributes::FOLDER)
    }

    /// A file system file that can also be browsed as a virtual folder.
    pub fn is_virtual_zip_directory(&self) -> bool {
        self.is_file() && self.is_folder()
    }

    /// Shortcut.
    pub fn is_shortcut(&self) -> bool {
        self.attributes.contains(ShellAttributes::LINK)
    }

    /// The name filters match against: the leaf of the path for file system
    /// items, the display name for everything else.
    pub fn match_name(&self) -> &str {
        if self.kind == ItemKind::Other || self.path.as_os_str().is_empty() {
            return &self.display_name;
        }
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.display_name)
    }

    /// The string used to locate this item inside the current folder: the
    /// path when known, the display name otherwise.
    pub fn parse_name(&self) -> String {
        if self.path.as_os_str().is_empty() {
            self.display_name.clone()
        } else {
            self.path.to_string_lossy().into_owned()
        }
    }
}

/// Convert a native item, logging the first failing query.
///
/// A missing file system path is expected for virtual items and is not an
/// error; failing to read attributes or the display name is.
pub(crate) fn convert_shell_item<I: ShellItem + ?Sized>(item: &I) -> Option<BrowserItem> {
    let attributes = match item.attributes(ShellAttributes::QUERY_MASK) {
        Ok(a) => a & ShellAttributes::QUERY_MASK,
        Err(e) => {
            api_error("ShellItem::attributes", &e);
            return None;
        }
    };
    let path = item.file_system_path().unwrap_or_default();
    let display_name = match item.display_name() {
        Ok(n) => n,
        Err(e) => {
            api_error("ShellItem::display_name", &e);
            return None;
        }
    };
    Some(BrowserItem::new(attributes, path, display_name))
}
