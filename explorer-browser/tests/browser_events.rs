use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use explorer_browser::sim::{ManualClock, SimEngine, SimPlatform};
use explorer_browser::{
    BrowserError, CreateOptions, EventKind, ExplorerBrowser, HResult, HostWindow, ItemKinds,
};
use pretty_assertions::assert_eq;

type Log = Rc<RefCell<Vec<(EventKind, String)>>>;

fn docs() -> SimEngine {
    let engine = SimEngine::new();
    engine
        .add_folder("/docs")
        .add_file("/docs/a.doc")
        .add_file("/docs/b.txt")
        .add_file("/docs/c.rtf")
        .add_folder("/docs/d");
    engine
}

fn record_all(browser: &ExplorerBrowser<SimPlatform>) -> Log {
    let log: Log = Rc::default();
    let sink = Rc::clone(&log);
    browser.events().subscribe_all(move |event| {
        sink.borrow_mut()
            .push((event.kind(), event.item().display_name().to_owned()));
    });
    log
}

fn entry(kind: EventKind, name: &str) -> (EventKind, String) {
    (kind, name.to_owned())
}

fn create(browser: &ExplorerBrowser<SimPlatform>) {
    browser
        .create(HostWindow(1), CreateOptions::new(), "/docs")
        .expect("create");
}

#[test]
fn navigation_is_reported_in_order() {
    let engine = docs();
    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));
    let log = record_all(&browser);
    create(&browser);
    browser.browse_to("/docs/d", false).unwrap();

    assert_eq!(
        *log.borrow(),
        [
            entry(EventKind::Navigating, "docs"),
            entry(EventKind::ViewCreated, "docs"),
            entry(EventKind::NavigationComplete, "docs"),
            entry(EventKind::Navigating, "d"),
            entry(EventKind::ViewCreated, "d"),
            entry(EventKind::NavigationComplete, "d"),
        ]
    );
}

#[test]
fn doubled_selection_notifications_become_one_event() {
    let engine = docs();
    let clock = Rc::new(ManualClock::new());
    let browser = ExplorerBrowser::with_clock(SimPlatform::new(engine.clone()), clock.clone());
    create(&browser);
    let log = record_all(&browser);

    engine.user_select("a.doc").unwrap();
    assert_eq!(*log.borrow(), [entry(EventKind::SelectionChanged, "a.doc")]);

    clock.advance(Duration::from_millis(1000));
    browser.deselect_all_items(false).unwrap();
    clock.advance(Duration::from_millis(1000));
    engine.user_select("a.doc").unwrap();
    assert_eq!(
        *log.borrow(),
        [
            entry(EventKind::SelectionChanged, "a.doc"),
            entry(EventKind::SelectionChanged, ""),
            entry(EventKind::SelectionChanged, "a.doc"),
        ]
    );
}

#[test]
fn single_notifications_are_all_reported() {
    let engine = docs();
    let clock = Rc::new(ManualClock::new());
    let browser = ExplorerBrowser::with_clock(SimPlatform::new(engine.clone()), clock.clone());
    create(&browser);
    engine.set_single_selection_notifications(true);
    let log = record_all(&browser);

    engine.user_select("a.doc").unwrap();
    engine.user_select("c.rtf").unwrap();
    clock.advance(Duration::from_millis(10));
    engine.user_select("a.doc").unwrap();
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn default_command_can_be_vetoed() {
    let engine = docs();
    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));
    browser
        .events()
        .subscribe(EventKind::DefaultCommand, |event| {
            if event.item().is_file() {
                event.veto();
            }
        });
    create(&browser);

    engine.user_select("a.doc").unwrap();
    assert!(!engine.user_activate());

    engine.user_select("d").unwrap();
    assert!(engine.user_activate());
    assert_eq!(engine.current_folder(), Some(PathBuf::from("/docs/d")));
}

#[test]
fn default_command_without_selection_is_not_reported() {
    let engine = docs();
    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));
    create(&browser);
    let log = record_all(&browser);
    assert!(engine.user_activate());
    assert!(log.borrow().is_empty());
}

#[test]
fn unobserved_commands_do_not_query_the_selection() {
    let engine = docs();
    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));
    create(&browser);
    engine.user_select("a.doc").unwrap();
    engine.clear_calls();

    assert!(engine.user_activate());
    assert!(engine.user_context_menu());
    assert!(!engine.calls().iter().any(|call| call == "selected_item"));
}

#[test]
fn context_menu_can_be_vetoed() {
    let engine = docs();
    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));
    let id = browser
        .events()
        .subscribe(EventKind::ContextMenuStart, |event| event.veto());
    create(&browser);

    engine.user_select("b.txt").unwrap();
    assert!(!engine.user_context_menu());

    assert!(browser.events().unsubscribe(id));
    assert!(engine.user_context_menu());
}

#[test]
fn vetoed_navigation_reports_failure_and_stays() {
    let engine = docs();
    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));
    browser.events().subscribe(EventKind::Navigating, |event| {
        if event.item().display_name() == "d" {
            event.veto();
        }
    });
    create(&browser);
    let log = record_all(&browser);

    browser.browse_to("/docs/d", false).unwrap();
    assert_eq!(engine.current_folder(), Some(PathBuf::from("/docs")));
    assert_eq!(
        *log.borrow(),
        [
            entry(EventKind::Navigating, "d"),
            entry(EventKind::NavigationFailed, "d"),
        ]
    );
}

#[test]
fn vetoing_a_notification_has_no_effect() {
    let engine = docs();
    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));
    browser
        .events()
        .subscribe(EventKind::NavigationComplete, |event| event.veto());
    browser
        .events()
        .subscribe(EventKind::ViewCreated, |event| event.veto());
    create(&browser);
    browser.browse_to("/docs/d", false).unwrap();
    assert_eq!(engine.current_folder(), Some(PathBuf::from("/docs/d")));
}

#[test]
fn handlers_may_call_back_into_the_browser() {
    let engine = docs();
    let browser = Rc::new(ExplorerBrowser::new(SimPlatform::new(engine.clone())));
    let counts = Rc::new(RefCell::new(Vec::new()));

    let weak = Rc::downgrade(&browser);
    let seen = Rc::clone(&counts);
    browser
        .events()
        .subscribe(EventKind::NavigationComplete, move |_| {
            if let Some(browser) = weak.upgrade() {
                let items = browser.all_items(ItemKinds::all()).unwrap();
                seen.borrow_mut().push(items.len());
            }
        });

    let weak = Rc::downgrade(&browser);
    browser
        .events()
        .subscribe(EventKind::SelectionChanged, move |event| {
            if event.item().display_name() != "c.rtf" {
                return;
            }
            if let Some(browser) = weak.upgrade() {
                browser.set_filter(["*.rtf"], ItemKinds::FILE).unwrap();
            }
        });

    browser
        .create(HostWindow(1), CreateOptions::new(), "/docs")
        .unwrap();
    browser.browse_to("/docs/d", false).unwrap();
    assert_eq!(*counts.borrow(), [4, 0]);

    browser.browse_to("/docs", false).unwrap();
    engine.user_select("c.rtf").unwrap();
    assert_eq!(engine.visible_names(), ["c.rtf", "d"]);
}

#[test]
fn a_handler_may_destroy_the_browser() {
    let engine = docs();
    let browser = Rc::new(ExplorerBrowser::new(SimPlatform::new(engine.clone())));
    create(&browser);

    let weak = Rc::downgrade(&browser);
    browser.events().subscribe(EventKind::ViewCreated, move |_| {
        if let Some(browser) = weak.upgrade() {
            browser.destroy();
        }
    });

    browser.browse_to("/docs/d", false).unwrap();
    assert!(!browser.is_created());
    assert!(engine.is_destroyed());
    assert_eq!(engine.sink_count(), 0);
    assert_eq!(browser.refresh(), Err(BrowserError::Destroyed));
}

#[test]
fn dropping_the_browser_releases_the_engine() {
    let engine = docs();
    {
        let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));
        create(&browser);
        assert!(engine.has_site());
        assert!(engine.has_filter());
        assert_eq!(engine.sink_count(), 1);
    }
    assert!(engine.is_destroyed());
    assert!(!engine.has_site());
    assert!(!engine.has_filter());
    assert_eq!(engine.sink_count(), 0);
}

#[test]
fn teardown_continues_past_failures() {
    let engine = docs();
    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));
    create(&browser);
    engine.fail_on("set_site").fail_on("unadvise");
    engine.clear_calls();

    browser.destroy();
    assert_eq!(
        engine.calls(),
        ["set_site(none)", "unadvise", "set_filter(none)", "destroy"]
    );
    assert!(engine.is_destroyed());
}

#[test]
fn unregistered_engines_cannot_be_created() {
    let engine = docs();
    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()).unregistered());
    let err = browser
        .create(HostWindow(1), CreateOptions::new(), "/docs")
        .unwrap_err();
    assert!(matches!(
        err,
        BrowserError::Native {
            operation: "EnginePlatform::instantiate",
            ..
        }
    ));
    assert!(!browser.is_created());
    assert!(engine.calls().is_empty());
}

#[test]
fn missing_site_setter_fails_creation() {
    let engine = docs();
    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()).without_site_setter());
    assert_eq!(
        browser.create(HostWindow(1), CreateOptions::new(), "/docs"),
        Err(BrowserError::Unsupported("setting the engine site"))
    );
    assert_eq!(engine.calls(), ["set_options", "destroy"]);
    assert!(!browser.is_created());
    assert_eq!(browser.refresh(), Err(BrowserError::NotCreated));
}

#[test]
fn failed_setup_is_rolled_back() {
    let engine = docs();
    engine.fail_on("advise");
    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));
    let err = browser
        .create(HostWindow(1), CreateOptions::new(), "/docs")
        .unwrap_err();
    assert_eq!(err.native_code(), Some(HResult::E_FAIL));
    assert_eq!(
        engine.calls(),
        [
            "set_options",
            "set_site",
            "set_filter",
            "initialize",
            "advise",
            "set_site(none)",
            "set_filter(none)",
            "destroy",
        ]
    );
    assert!(!engine.has_site());
    assert!(!browser.is_created());
}

#[test]
fn failed_initial_navigation_is_rolled_back() {
    let engine = docs();
    let browser = ExplorerBrowser::new(SimPlatform::new(engine.clone()));
    let log = record_all(&browser);
    let err = browser
        .create(HostWindow(1), CreateOptions::new(), "/missing")
        .unwrap_err();

    assert_eq!(err.native_code(), Some(HResult::E_FILE_NOT_FOUND));
    assert!(!browser.is_created());
    assert!(engine.is_destroyed());
    assert_eq!(engine.sink_count(), 0);
    assert!(log.borrow().is_empty());
    let calls = engine.calls();
    assert_eq!(
        calls[calls.len() - 4..],
        ["set_site(none)", "unadvise", "set_filter(none)", "destroy"]
    );
}
