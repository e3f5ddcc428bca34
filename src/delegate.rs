//! Lifecycle notifications sent to the owning navigation collaborator
//!
//! Notifications are one-directional and carry only a borrowed view of the
//! attempt's data. The attempt holds its delegate behind an `Rc` so the
//! owning collaborator and tests can observe the same instance.

use crate::attempt::NavigationData;
use std::cell::RefCell;

/// Observer for navigation lifecycle events
///
/// Each notification fires exactly once per occurrence: `did_start` at
/// attempt creation, `did_redirect` per approved redirect, `ready_to_commit`
/// after an approved response (unless the loader flagged a legacy transfer),
/// and `did_finish` unconditionally at attempt destruction.
pub trait NavigationDelegate {
    /// The attempt was created; no stage has run yet
    fn did_start_navigation(&self, _nav: &NavigationData) {}

    /// A redirect passed the throttle checks and will be followed
    fn did_redirect_navigation(&self, _nav: &NavigationData) {}

    /// The response passed the throttle checks; the attempt is about to
    /// deliver `Proceed` to the loader
    fn ready_to_commit_navigation(&self, _nav: &NavigationData) {}

    /// The attempt is being destroyed
    fn did_finish_navigation(&self, _nav: &NavigationData) {}
}

/// Delegate that ignores all notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDelegate;

impl NavigationDelegate for NoopDelegate {}

/// Counters for each delegate notification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegateEvents {
    /// `did_start_navigation` count
    pub started: usize,
    /// `did_redirect_navigation` count
    pub redirected: usize,
    /// `ready_to_commit_navigation` count
    pub ready_to_commit: usize,
    /// `did_finish_navigation` count
    pub finished: usize,
    /// URL observed at the most recent notification
    pub last_url: String,
}

/// Recording delegate for tests
///
/// Counts notifications and remembers the last observed URL.
#[derive(Debug, Default)]
pub struct RecordingDelegate {
    events: RefCell<DelegateEvents>,
}

impl RecordingDelegate {
    /// Create a recording delegate
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> DelegateEvents {
        self.events.borrow().clone()
    }
}

impl NavigationDelegate for RecordingDelegate {
    fn did_start_navigation(&self, nav: &NavigationData) {
        let mut events = self.events.borrow_mut();
        events.started += 1;
        events.last_url = nav.url.clone();
    }

    fn did_redirect_navigation(&self, nav: &NavigationData) {
        let mut events = self.events.borrow_mut();
        events.redirected += 1;
        events.last_url = nav.url.clone();
    }

    fn ready_to_commit_navigation(&self, nav: &NavigationData) {
        let mut events = self.events.borrow_mut();
        events.ready_to_commit += 1;
        events.last_url = nav.url.clone();
    }

    fn did_finish_navigation(&self, nav: &NavigationData) {
        let mut events = self.events.borrow_mut();
        events.finished += 1;
        events.last_url = nav.url.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_delegate_counts() {
        let delegate = RecordingDelegate::new();
        let nav = NavigationData::new("https://example.com/");

        delegate.did_start_navigation(&nav);
        delegate.did_redirect_navigation(&nav);
        delegate.did_redirect_navigation(&nav);
        delegate.ready_to_commit_navigation(&nav);
        delegate.did_finish_navigation(&nav);

        let events = delegate.events();
        assert_eq!(events.started, 1);
        assert_eq!(events.redirected, 2);
        assert_eq!(events.ready_to_commit, 1);
        assert_eq!(events.finished, 1);
        assert_eq!(events.last_url, "https://example.com/");
    }

    #[test]
    fn test_noop_delegate_ignores() {
        let delegate = NoopDelegate;
        let nav = NavigationData::new("https://example.com/");
        // Must not panic or observe anything.
        delegate.did_start_navigation(&nav);
        delegate.did_finish_navigation(&nav);
    }
}
