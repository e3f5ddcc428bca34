//! Scripted throttle for tests and embedder development
//!
//! Returns pre-configured decisions per stage and records how often each
//! stage was consulted. The call log is shared via `Rc` so tests keep a
//! handle after the throttle is boxed into an attempt.

use crate::attempt::NavigationData;
use crate::throttle::NavigationThrottle;
use crate::types::Decision;
use std::cell::RefCell;
use std::rc::Rc;

/// Per-stage invocation counters for a [`ScriptedThrottle`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallLog {
    /// Times the start stage was consulted
    pub start_calls: usize,
    /// Times the redirect stage was consulted
    pub redirect_calls: usize,
    /// Times the response stage was consulted
    pub response_calls: usize,
}

impl CallLog {
    /// Total consultations across all stages
    pub fn total(&self) -> usize {
        self.start_calls + self.redirect_calls + self.response_calls
    }
}

/// Throttle returning canned decisions
///
/// Defaults to `Proceed` at every stage.
pub struct ScriptedThrottle {
    name: &'static str,
    on_start: Decision,
    on_redirect: Decision,
    on_response: Decision,
    log: Rc<RefCell<CallLog>>,
}

impl ScriptedThrottle {
    /// Create a scripted throttle that proceeds at every stage
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            on_start: Decision::Proceed,
            on_redirect: Decision::Proceed,
            on_response: Decision::Proceed,
            log: Rc::new(RefCell::new(CallLog::default())),
        }
    }

    /// Set the decision for all three stages
    pub fn returning(mut self, decision: Decision) -> Self {
        self.on_start = decision;
        self.on_redirect = decision;
        self.on_response = decision;
        self
    }

    /// Set the start-stage decision
    pub fn on_start(mut self, decision: Decision) -> Self {
        self.on_start = decision;
        self
    }

    /// Set the redirect-stage decision
    pub fn on_redirect(mut self, decision: Decision) -> Self {
        self.on_redirect = decision;
        self
    }

    /// Set the response-stage decision
    pub fn on_response(mut self, decision: Decision) -> Self {
        self.on_response = decision;
        self
    }

    /// Shared handle to the invocation counters
    pub fn call_log(&self) -> Rc<RefCell<CallLog>> {
        Rc::clone(&self.log)
    }

    /// Box this throttle for registration
    pub fn boxed(self) -> Box<dyn NavigationThrottle> {
        Box::new(self)
    }
}

impl NavigationThrottle for ScriptedThrottle {
    fn will_start_request(&mut self, _nav: &NavigationData) -> Decision {
        self.log.borrow_mut().start_calls += 1;
        self.on_start
    }

    fn will_redirect_request(&mut self, _nav: &NavigationData) -> Decision {
        self.log.borrow_mut().redirect_calls += 1;
        self.on_redirect
    }

    fn will_process_response(&mut self, _nav: &NavigationData) -> Decision {
        self.log.borrow_mut().response_calls += 1;
        self.on_response
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_proceed() {
        let mut throttle = ScriptedThrottle::new("t");
        let nav = NavigationData::new("https://example.com/");
        assert_eq!(throttle.will_start_request(&nav), Decision::Proceed);
        assert_eq!(throttle.will_redirect_request(&nav), Decision::Proceed);
        assert_eq!(throttle.will_process_response(&nav), Decision::Proceed);
    }

    #[test]
    fn test_per_stage_decisions() {
        let mut throttle = ScriptedThrottle::new("t")
            .on_start(Decision::Defer)
            .on_response(Decision::BlockResponse);
        let nav = NavigationData::new("https://example.com/");
        assert_eq!(throttle.will_start_request(&nav), Decision::Defer);
        assert_eq!(throttle.will_redirect_request(&nav), Decision::Proceed);
        assert_eq!(throttle.will_process_response(&nav), Decision::BlockResponse);
    }

    #[test]
    fn test_call_log_counts() {
        let throttle = ScriptedThrottle::new("t");
        let log = throttle.call_log();
        let mut throttle = throttle;
        let nav = NavigationData::new("https://example.com/");

        throttle.will_start_request(&nav);
        throttle.will_redirect_request(&nav);
        throttle.will_redirect_request(&nav);
        throttle.will_process_response(&nav);

        let log = log.borrow();
        assert_eq!(log.start_calls, 1);
        assert_eq!(log.redirect_calls, 2);
        assert_eq!(log.response_calls, 1);
        assert_eq!(log.total(), 4);
    }
}
