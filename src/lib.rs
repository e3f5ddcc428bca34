//! # navgate
//!
//! Ordered, deferrable navigation throttle gating for browser-style
//! navigation lifecycles.
//!
//! ## Overview
//!
//! `navgate` models the gating pipeline a browser's navigation subsystem
//! runs for a single navigation attempt: an ordered list of policy/observer
//! throttles is consulted at three lifecycle stages (request start, each
//! server redirect, response processing) and each throttle answers with a
//! [`Decision`]. A throttle may suspend the pipeline (`Defer`) and resolve
//! it later from the same sequence; a pending continuation is never dropped
//! silently — destroying a suspended attempt fires it with
//! `CancelAndIgnore`.
//!
//! ## Quick Start
//!
//! ```rust
//! use navgate::{
//!     AttemptParams, NavigationAttempt, NoEmbedderThrottles, NoopDelegate, PageTransition,
//!     Referrer,
//! };
//! use std::rc::Rc;
//!
//! let mut attempt = NavigationAttempt::new(
//!     AttemptParams::new("https://example.com/"),
//!     Rc::new(NoopDelegate),
//!     Box::new(NoEmbedderThrottles),
//! );
//!
//! attempt.will_start_request(
//!     "GET",
//!     Referrer::default(),
//!     true,
//!     PageTransition::Typed,
//!     false,
//!     Box::new(|decision| println!("start stage finished: {:?}", decision)),
//! );
//! ```
//!
//! ## Architecture
//!
//! - **NavigationThrottle** trait — capability interface policy handlers
//!   implement; each stage operation defaults to `Proceed`
//! - **NavigationAttempt** — single-use state machine owning the throttle
//!   list, cursor, and the single-slot pending continuation
//! - **AncestorPolicyThrottle** — reference handler enforcing
//!   frame-embedding restrictions from response headers
//! - **NavigationDelegate** — one-way lifecycle notifications (start,
//!   redirect, ready-to-commit, finish)
//!
//! Everything runs on one designated sequence; suspension returns control
//! to the event loop without blocking a thread.

pub mod attempt;
pub mod delegate;
pub mod error;
pub mod headers;
pub mod throttle;
pub mod types;

// Re-export core types
pub use attempt::{AttemptParams, NavigationAttempt, NavigationData, ThrottleChecksFinished};
pub use delegate::{DelegateEvents, NavigationDelegate, NoopDelegate, RecordingDelegate};
pub use error::{NavigationError, Result};
pub use headers::ResponseHeaders;
pub use throttle::{NavigationThrottle, NoEmbedderThrottles, ThrottleFactory};
pub use types::{
    Decision, NavigationState, NetError, Origin, PageTransition, Referrer, ReferrerPolicy,
    RenderContextId,
};

// Re-export the bundled throttles for convenience
pub use throttle::ancestor::{AncestorPolicyThrottle, HeaderDisposition};
pub use throttle::scripted::{CallLog, ScriptedThrottle};
