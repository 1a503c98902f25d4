//! # explorer-browser
//!
//! Host an OS-provided folder browsing engine inside an application window
//! and drive it through a small, toolkit-neutral API.
//!
//! ## Features
//!
//! - Navigation by path, to the parent folder and through the history
//! - Name/type filtering of the folder view with wildcard masks
//! - Selection queries and changes
//! - Vetoable default-command, context-menu and navigation events
//! - Per-pane visibility policy
//!
//! The engine itself is supplied by a platform backend implementing
//! [`EnginePlatform`] and [`ExplorerEngine`]. The `sim` feature adds the
//! `sim` module, an in-memory engine that follows the same callback contract.
//!
//! ## Quick Start
//!
//! ```
//! use explorer_browser::sim::{SimEngine, SimPlatform};
//! use explorer_browser::{CreateOptions, EventKind, ExplorerBrowser, HostWindow, ItemKinds};
//!
//! let engine = SimEngine::new();
//! engine
//!     .add_folder("/docs")
//!     .add_file("/docs/a.doc")
//!     .add_file("/docs/b.txt");
//!
//! let browser = ExplorerBrowser::new(SimPlatform::new(engine));
//! browser.events().subscribe(EventKind::DefaultCommand, |event| {
//!     if event.item().is_file() {
//!         event.veto();
//!     }
//! });
//! browser
//!     .create(HostWindow(0), CreateOptions::new(), "/docs")
//!     .unwrap();
//! browser.set_filter(["*.doc"], ItemKinds::FILE).unwrap();
//!
//! let names: Vec<_> = browser
//!     .all_items(ItemKinds::all())
//!     .unwrap()
//!     .into_iter()
//!     .map(|item| item.display_name().to_owned())
//!     .collect();
//! assert_eq!(names, ["a.doc"]);
//! ```

#![deny(rust_2018_idioms)]
#![warn(missing_docs)]

pub use self::adapter::BrowserEventAdapter;
pub use self::browser::ExplorerBrowser;
pub use self::engine::*;
pub use self::error::{BrowserError, NativeError, NativeResult};
pub use self::events::{BrowserEvent, EventDispatcher, EventKind, SubscriptionId};
pub use self::filter::FilterSpec;
pub use self::guid::{Guid, iid, sid};
pub use self::item::{BrowserItem, ItemKind, ItemKinds, ShellAttributes};
pub use self::pane::{
    PANE_COUNT, PaneId, PaneState, PaneStateFlags, PaneVisibility, PaneVisibilitySettings,
};
pub use self::roles::*;
pub use self::selection_guard::{Clock, DEDUP_WINDOW, SelectionChangeGuard, SystemClock};
pub use self::settings::{CreateOptions, FolderFlags, FolderSettings, Options, ViewMode};
pub use self::status::{Callback, CallbackError, HResult, Verdict, native_status};

mod adapter;
mod browser;
mod engine;
mod error;
mod events;
mod filter;
mod guid;
mod item;
pub mod logging;
mod pane;
mod roles;
mod selection_guard;
mod settings;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
mod status;
