//! Navigation throttle trait — the capability interface for policy handlers
//!
//! A throttle is consulted at up to three lifecycle stages of a navigation
//! attempt and answers each consultation with a [`Decision`]. Throttles see
//! the attempt only through a borrowed [`NavigationData`] view; they never
//! own or mutate the attempt directly.

use crate::attempt::NavigationData;
use crate::types::Decision;

pub mod ancestor;
pub mod scripted;

/// Core trait for navigation policy/observer handlers
///
/// Every stage operation defaults to [`Decision::Proceed`]; implementations
/// override only the stages they care about. Stage operations are invoked in
/// registration order on a single sequence, never concurrently.
///
/// Reentrancy contract: a throttle must not tear down the navigation's
/// owning context synchronously from inside a stage call. To do so, return
/// `Defer`, `Cancel`, or `CancelAndIgnore` and perform the teardown from a
/// later task.
pub trait NavigationThrottle {
    /// Consulted once when the request is about to start
    ///
    /// Must not return [`Decision::BlockResponse`].
    fn will_start_request(&mut self, _nav: &NavigationData) -> Decision {
        Decision::Proceed
    }

    /// Consulted once per server redirect
    ///
    /// Must not return [`Decision::BlockResponse`].
    fn will_redirect_request(&mut self, _nav: &NavigationData) -> Decision {
        Decision::Proceed
    }

    /// Consulted once when the final response is about to be processed
    ///
    /// The only stage where [`Decision::BlockResponse`] is valid.
    fn will_process_response(&mut self, _nav: &NavigationData) -> Decision {
        Decision::Proceed
    }

    /// Diagnostics label for this throttle
    fn name(&self) -> &'static str;
}

/// Registration collaborator supplying embedder throttles for an attempt
///
/// Invoked exactly once, at first stage entry. The reference
/// [`AncestorPolicyThrottle`](ancestor::AncestorPolicyThrottle) is always
/// registered ahead of the returned list.
pub trait ThrottleFactory {
    /// Create the embedder throttles for this specific attempt, in the
    /// order they should be consulted
    fn create_throttles(&self, nav: &NavigationData) -> Vec<Box<dyn NavigationThrottle>>;
}

/// Factory that registers no embedder throttles
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEmbedderThrottles;

impl ThrottleFactory for NoEmbedderThrottles {
    fn create_throttles(&self, _nav: &NavigationData) -> Vec<Box<dyn NavigationThrottle>> {
        Vec::new()
    }
}
