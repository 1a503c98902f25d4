use std::time::{Duration, Instant};

use crate::item::BrowserItem;

/// Two selection notifications for the same item closer together than this
/// are one user action.
pub const DEDUP_WINDOW: Duration = Duration::from_millis(50);

/// Source of the current instant.
pub trait Clock {
    /// Now.
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Collapses the doubled "selection changed" notifications the engine sends
/// for a single user action.
///
/// A notification repeats the previous one when it arrives within
/// [`DEDUP_WINDOW`] and carries the same attributes, path and display name.
#[derive(Clone, Debug, Default)]
pub struct SelectionChangeGuard {
    last: Option<(BrowserItem, Instant)>,
}

impl SelectionChangeGuard {
    /// A guard that has seen nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `item` observed at `at` repeats the last reported
    /// notification.
    pub fn is_duplicate(&self, item: &BrowserItem, at: Instant) -> bool {
        let Some((last, last_at)) = &self.last else {
            return false;
        };
        at.saturating_duration_since(*last_at) <= DEDUP_WINDOW
            && last.attributes() == item.attributes()
            && last.path() == item.path()
            && last.display_name() == item.display_name()
    }

    /// Remember `item` as the last reported notification.
    pub fn record(&mut self, item: BrowserItem, at: Instant) {
        self.last = Some((item, at));
    }

    /// Check and record in one step. Returns `true` when the notification
    /// should be reported.
    pub fn observe(&mut self, item: &BrowserItem, at: Instant) -> bool {
        if self.is_duplicate(item, at) {
            return false;
        }
        self.record(item.clone(), at);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ShellAttributes;

    fn doc() -> BrowserItem {
        BrowserItem::new(
            ShellAttributes::FILESYSTEM | ShellAttributes::STREAM,
            "/docs/a.doc",
            "a.doc",
        )
    }

    #[test]
    fn suppresses_repeat_within_window() {
        let t0 = Instant::now();
        let mut guard = SelectionChangeGuard::new();
        assert!(guard.observe(&doc(), t0));
        assert!(!guard.observe(&doc(), t0 + Duration::from_millis(10)));
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let t0 = Instant::now();
        let mut guard = SelectionChangeGuard::new();
        assert!(guard.observe(&doc(), t0));
        assert!(!guard.observe(&doc(), t0 + DEDUP_WINDOW));
    }

    #[test]
    fn reports_repeat_after_window() {
        let t0 = Instant::now();
        let mut guard = SelectionChangeGuard::new();
        assert!(guard.observe(&doc(), t0));
        assert!(guard.observe(&doc(), t0 + Duration::from_millis(1000)));
    }

    #[test]
    fn different_item_is_reported() {
        let t0 = Instant::now();
        let mut guard = SelectionChangeGuard::new();
        assert!(guard.observe(&doc(), t0));
        let other = BrowserItem::new(ShellAttributes::FILESYSTEM | ShellAttributes::STREAM, "/docs/b.doc", "b.doc");
        assert!(guard.observe(&other, t0 + Duration::from_millis(5)));
        // the newer item is now the reference
        assert!(!guard.observe(&other, t0 + Duration::from_millis(6)));
    }

    #[test]
    fn empty_selection_dedups_too() {
        let t0 = Instant::now();
        let mut guard = SelectionChangeGuard::new();
        assert!(guard.observe(&BrowserItem::default(), t0));
        assert!(!guard.observe(&BrowserItem::default(), t0 + Duration::from_millis(1)));
        assert!(guard.observe(&BrowserItem::default(), t0 + Duration::from_millis(600)));
    }
}
