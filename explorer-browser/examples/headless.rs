//! Drive a browser without a window, on the in-memory engine.
//!
//! Run with `RUST_LOG=explorer_browser=debug` to see the adapter at work.

use explorer_browser::sim::{SimEngine, SimPlatform};
use explorer_browser::{
    BrowseTarget, BrowserError, CreateOptions, EventKind, ExplorerBrowser, HostWindow, ItemKinds,
    PaneId, PaneState, PaneVisibility, PaneVisibilitySettings,
};

fn main() -> Result<(), BrowserError> {
    explorer_browser::logging::init_tracing_with_filter("explorer_browser=debug,headless=info");

    let engine = SimEngine::new();
    engine
        .add_folder("/")
        .add_folder("/projects")
        .add_folder("/projects/reports")
        .add_file("/projects/reports/q1.doc")
        .add_file("/projects/reports/q2.docx")
        .add_file("/projects/reports/summary.rtf")
        .add_file("/projects/reports/notes.txt")
        .add_archive("/projects/reports/old.zip");

    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));

    browser.events().subscribe_all(|event| {
        tracing::info!(kind = ?event.kind(), item = event.item().display_name(), "event");
    });
    // keep users inside /projects
    browser.events().subscribe(EventKind::Navigating, |event| {
        if !event.item().path().starts_with("/projects") {
            event.veto();
        }
    });

    let panes = PaneVisibilitySettings::new()
        .with(PaneId::NavPane, PaneState::new(PaneVisibility::DefaultOff))
        .with(PaneId::PreviewPane, PaneState::new(PaneVisibility::DefaultOn));
    browser.create(
        HostWindow(0),
        CreateOptions::new().pane_settings(panes),
        "/projects",
    )?;

    browser.browse_to("/projects/reports", false)?;
    browser.set_filter(["*.doc*", "*.rtf"], ItemKinds::FILE)?;
    for item in browser.all_items(ItemKinds::all())? {
        tracing::info!(name = item.display_name(), kind = ?item.kind(), "visible");
    }

    engine.user_select("summary.rtf").ok();
    for item in browser.selected_items(ItemKinds::FILE)? {
        tracing::info!(path = %item.path().display(), "selected");
    }

    browser.browse_to_target(BrowseTarget::Parent, false)?;
    // refused by the handler above
    browser.browse_to_target(BrowseTarget::Parent, false).ok();
    tracing::info!(folder = %browser.folder()?.path().display(), "done");

    browser.destroy();
    Ok(())
}
