//! Navigation attempt state machine — the core of the gating pipeline
//!
//! A `NavigationAttempt` models one in-flight request to load a URL, from
//! request start through redirects and response processing to commit or
//! cancellation. At each stage it consults its throttles strictly in
//! registration order and halts at the first non-`Proceed` decision. A
//! `Defer` suspends the stage; a later `resume()` or `cancel_deferred()`
//! on the same sequence picks it back up.
//!
//! Everything here runs on one sequence. There is no internal locking and
//! throttles are never invoked concurrently.

use crate::delegate::NavigationDelegate;
use crate::headers::ResponseHeaders;
use crate::throttle::ancestor::AncestorPolicyThrottle;
use crate::throttle::{NavigationThrottle, ThrottleFactory};
use crate::types::{
    Decision, NavigationState, NetError, Origin, PageTransition, Referrer, RenderContextId,
};
use std::rc::Rc;
use std::time::Instant;

/// Single-use continuation delivering a stage's final decision to the loader
///
/// Invoked exactly once per stage entry call, either synchronously (the
/// stage ran to a decision) or later (the stage deferred). If the attempt is
/// destroyed while a continuation is still pending, the continuation fires
/// with [`Decision::CancelAndIgnore`] before teardown completes.
pub type ThrottleChecksFinished = Box<dyn FnOnce(Decision)>;

/// Snapshot of a navigation attempt's parameters, shared with throttles
///
/// Throttles receive this as a borrowed, lookup-only view. The owning
/// [`NavigationAttempt`] is the only writer.
#[derive(Debug, Clone)]
pub struct NavigationData {
    /// Generated attempt identifier (`nav-<uuid>`)
    pub id: String,

    /// Current target URL (updated on each redirect)
    pub url: String,

    /// HTTP method
    pub method: String,

    /// Sanitized referrer
    pub referrer: Referrer,

    /// Whether the navigation was initiated by a user gesture
    pub has_user_gesture: bool,

    /// Transition metadata
    pub transition: PageTransition,

    /// Whether the current URL uses an external (non-web) protocol
    pub is_external_protocol: bool,

    /// Whether the committed navigation stayed in the same document
    pub is_same_document: bool,

    /// Whether this is a synchronous renderer-initiated navigation
    pub is_synchronous: bool,

    /// Whether this navigation loads `about:srcdoc`
    pub is_srcdoc: bool,

    /// Whether at least one server redirect occurred
    pub was_redirected: bool,

    /// Whether the navigation targets the main frame
    pub is_main_frame: bool,

    /// Origins of the ancestor frames, outermost last
    ///
    /// Supplied by the frame-tree collaborator at creation; consumed by the
    /// frame-ancestor policy throttle.
    pub ancestor_origins: Vec<Origin>,

    /// Latest response headers (redirect or final response)
    pub response_headers: Option<ResponseHeaders>,

    /// Render context the response was assigned to
    pub render_context: Option<RenderContextId>,

    /// Terminal network error
    pub net_error: NetError,

    /// Externally supplied pending entry identifier
    pub pending_entry_id: u64,

    /// When the navigation started
    pub navigation_start: Instant,
}

impl NavigationData {
    /// Create a data snapshot with defaults for a main-frame GET navigation
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: format!("nav-{}", uuid::Uuid::new_v4()),
            url: url.into(),
            method: "GET".to_string(),
            referrer: Referrer::default(),
            has_user_gesture: false,
            transition: PageTransition::default(),
            is_external_protocol: false,
            is_same_document: false,
            is_synchronous: false,
            is_srcdoc: false,
            was_redirected: false,
            is_main_frame: true,
            ancestor_origins: Vec::new(),
            response_headers: None,
            render_context: None,
            net_error: NetError::Ok,
            pending_entry_id: 0,
            navigation_start: Instant::now(),
        }
    }
}

/// Creation parameters for a [`NavigationAttempt`]
#[derive(Debug, Clone)]
pub struct AttemptParams {
    /// Initial target URL
    pub url: String,
    /// Whether the navigation targets the main frame
    pub is_main_frame: bool,
    /// Ancestor frame origins (subframe navigations)
    pub ancestor_origins: Vec<Origin>,
    /// Synchronous renderer-initiated navigation
    pub is_synchronous: bool,
    /// `about:srcdoc` navigation
    pub is_srcdoc: bool,
    /// Externally supplied pending entry identifier
    pub pending_entry_id: u64,
    /// Server-side navigation mode; suppresses the destruction-time
    /// synthesized cancellation
    pub server_side_navigation: bool,
}

impl AttemptParams {
    /// Parameters for a main-frame navigation to `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_main_frame: true,
            ancestor_origins: Vec::new(),
            is_synchronous: false,
            is_srcdoc: false,
            pending_entry_id: 0,
            server_side_navigation: false,
        }
    }

    /// Mark the navigation as targeting a subframe with the given ancestors
    pub fn subframe(mut self, ancestor_origins: Vec<Origin>) -> Self {
        self.is_main_frame = false;
        self.ancestor_origins = ancestor_origins;
        self
    }
}

/// One lifecycle stage at which throttles are consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    Redirect,
    Response,
}

impl Stage {
    fn running_state(self) -> NavigationState {
        match self {
            Stage::Start => NavigationState::WillSendRequest,
            Stage::Redirect => NavigationState::WillRedirectRequest,
            Stage::Response => NavigationState::WillProcessResponse,
        }
    }

    fn deferring_state(self) -> NavigationState {
        match self {
            Stage::Start => NavigationState::DeferringStart,
            Stage::Redirect => NavigationState::DeferringRedirect,
            Stage::Response => NavigationState::DeferringResponse,
        }
    }
}

/// State machine gating one navigation attempt through its lifecycle
///
/// Owns the throttle list exclusively. The list is append-only before the
/// first stage runs and immutable thereafter; the cursor resets to zero at
/// each new stage and only moves forward within one.
pub struct NavigationAttempt {
    data: NavigationData,
    state: NavigationState,
    throttles: Vec<Box<dyn NavigationThrottle>>,
    next_index: usize,
    pending: Option<ThrottleChecksFinished>,
    delegate: Rc<dyn NavigationDelegate>,
    factory: Box<dyn ThrottleFactory>,
    is_transferring: bool,
    server_side_navigation: bool,
}

impl NavigationAttempt {
    /// Create an attempt and notify the delegate's start event
    pub fn new(
        params: AttemptParams,
        delegate: Rc<dyn NavigationDelegate>,
        factory: Box<dyn ThrottleFactory>,
    ) -> Self {
        let mut data = NavigationData::new(params.url);
        data.is_main_frame = params.is_main_frame;
        data.ancestor_origins = params.ancestor_origins;
        data.is_synchronous = params.is_synchronous;
        data.is_srcdoc = params.is_srcdoc;
        data.pending_entry_id = params.pending_entry_id;

        tracing::debug!(
            navigation = %data.id,
            url = %data.url,
            main_frame = data.is_main_frame,
            "Navigation attempt created"
        );

        let attempt = Self {
            data,
            state: NavigationState::Initial,
            throttles: Vec::new(),
            next_index: 0,
            pending: None,
            delegate,
            factory,
            is_transferring: false,
            server_side_navigation: params.server_side_navigation,
        };
        attempt.delegate.did_start_navigation(&attempt.data);
        attempt
    }

    /// Append a throttle ahead of the built-in registration
    ///
    /// Only valid before the first stage runs; the list is immutable once
    /// the start stage has begun.
    pub fn register_throttle(&mut self, throttle: Box<dyn NavigationThrottle>) {
        debug_assert_eq!(
            self.state,
            NavigationState::Initial,
            "throttle list is append-only before the first stage"
        );
        if self.state != NavigationState::Initial {
            tracing::warn!(navigation = %self.data.id, "register_throttle ignored after first stage");
            return;
        }
        self.throttles.push(throttle);
    }

    /// Run the start stage; called exactly once by the loader
    ///
    /// Records the request parameters, builds the throttle list (reference
    /// frame-ancestor handler first, then embedder throttles in factory
    /// order) and runs the stage loop. Fires `on_checks_finished`
    /// synchronously unless a throttle deferred.
    pub fn will_start_request(
        &mut self,
        method: impl Into<String>,
        referrer: Referrer,
        has_user_gesture: bool,
        transition: PageTransition,
        is_external_protocol: bool,
        on_checks_finished: ThrottleChecksFinished,
    ) {
        debug_assert_eq!(
            self.state,
            NavigationState::Initial,
            "will_start_request may only run once, before any other stage"
        );
        if self.state != NavigationState::Initial {
            tracing::warn!(navigation = %self.data.id, state = ?self.state, "will_start_request ignored");
            return;
        }

        self.data.method = method.into();
        self.data.referrer = Referrer::sanitize_for_request(&self.data.url, referrer);
        self.data.has_user_gesture = has_user_gesture;
        self.data.transition = transition;
        self.data.is_external_protocol = is_external_protocol;

        self.state = NavigationState::WillSendRequest;
        self.pending = Some(on_checks_finished);

        // Platform handler first, then the embedder's throttles in the
        // order the factory supplied them.
        self.throttles.push(AncestorPolicyThrottle::boxed());
        let embedder = self.factory.create_throttles(&self.data);
        self.throttles.extend(embedder);

        let result = self.check_throttles(Stage::Start);
        self.deliver(Stage::Start, result);
    }

    /// Run the redirect stage; called once per server redirect
    ///
    /// Updates the URL, method, referrer, external-protocol flag and
    /// response headers, then runs the stage loop. On a run-to-completion
    /// `Proceed` the delegate's redirect event fires before the
    /// continuation.
    pub fn will_redirect_request(
        &mut self,
        new_url: impl Into<String>,
        new_method: impl Into<String>,
        new_referrer_url: impl Into<String>,
        new_is_external_protocol: bool,
        response_headers: Option<ResponseHeaders>,
        on_checks_finished: ThrottleChecksFinished,
    ) {
        let stage_open = self.pending.is_none()
            && matches!(
                self.state,
                NavigationState::WillSendRequest | NavigationState::WillRedirectRequest
            );
        debug_assert!(stage_open, "will_redirect_request while another stage is in flight");
        if !stage_open {
            tracing::warn!(navigation = %self.data.id, state = ?self.state, "will_redirect_request ignored");
            return;
        }

        self.data.url = new_url.into();
        self.data.method = new_method.into();
        let referrer = Referrer::new(new_referrer_url, self.data.referrer.policy);
        self.data.referrer = Referrer::sanitize_for_request(&self.data.url, referrer);
        self.data.is_external_protocol = new_is_external_protocol;
        self.data.response_headers = response_headers;
        self.data.was_redirected = true;

        self.state = NavigationState::WillRedirectRequest;
        self.pending = Some(on_checks_finished);

        let result = self.check_throttles(Stage::Redirect);
        self.deliver(Stage::Redirect, result);
    }

    /// Run the response stage; called exactly once, after all redirects
    ///
    /// Records the assigned render context and final headers, then runs the
    /// stage loop. A final `Proceed` transitions the attempt to
    /// `ReadyToCommit` and fires the delegate's ready-to-commit event before
    /// the continuation.
    pub fn will_process_response(
        &mut self,
        render_context: RenderContextId,
        response_headers: Option<ResponseHeaders>,
        on_checks_finished: ThrottleChecksFinished,
    ) {
        let stage_open = self.pending.is_none()
            && matches!(
                self.state,
                NavigationState::WillSendRequest | NavigationState::WillRedirectRequest
            );
        debug_assert!(stage_open, "will_process_response while another stage is in flight");
        if !stage_open {
            tracing::warn!(navigation = %self.data.id, state = ?self.state, "will_process_response ignored");
            return;
        }
        debug_assert!(
            self.data.render_context.is_none()
                || self.data.render_context == Some(render_context),
            "render context must not change once assigned"
        );

        self.data.render_context = Some(render_context);
        self.data.response_headers = response_headers;
        self.state = NavigationState::WillProcessResponse;
        self.pending = Some(on_checks_finished);

        let result = self.check_throttles(Stage::Response);
        self.deliver(Stage::Response, result);
    }

    /// Resume a deferred stage from the stored cursor
    ///
    /// No-op unless the attempt is currently deferring. Throttles at
    /// indices before the cursor are not consulted again. A further `Defer`
    /// leaves the attempt deferred; any other result gets the same
    /// post-result handling as the originating stage entry point.
    pub fn resume(&mut self) {
        let stage = match self.state {
            NavigationState::DeferringStart => Stage::Start,
            NavigationState::DeferringRedirect => Stage::Redirect,
            NavigationState::DeferringResponse => Stage::Response,
            _ => return,
        };
        let result = self.check_throttles(stage);
        self.deliver(stage, result);
    }

    /// Cancel a navigation deferred at the start or redirect stage
    ///
    /// `decision` must be `Cancel` or `CancelAndIgnore`. Ignored when the
    /// attempt is not deferring (so a duplicate call is harmless).
    pub fn cancel_deferred(&mut self, decision: Decision) {
        debug_assert!(
            matches!(decision, Decision::Cancel | Decision::CancelAndIgnore),
            "cancel_deferred requires Cancel or CancelAndIgnore"
        );
        if !matches!(decision, Decision::Cancel | Decision::CancelAndIgnore) {
            return;
        }
        if !matches!(
            self.state,
            NavigationState::DeferringStart | NavigationState::DeferringRedirect
        ) {
            tracing::warn!(navigation = %self.data.id, state = ?self.state, "cancel_deferred ignored");
            return;
        }

        self.state = NavigationState::Canceling;
        self.run_complete_callback(decision);
    }

    /// Record the commit signalled by the loader
    ///
    /// Transitions to `DidCommit`, or `DidCommitErrorPage` when a net error
    /// was recorded.
    pub fn did_commit_navigation(&mut self, is_same_document: bool) {
        debug_assert!(!self.state.has_committed(), "navigation committed twice");
        self.data.is_same_document = is_same_document;
        self.state = if self.data.net_error == NetError::Ok {
            NavigationState::DidCommit
        } else {
            NavigationState::DidCommitErrorPage
        };
        tracing::debug!(
            navigation = %self.data.id,
            url = %self.data.url,
            state = ?self.state,
            "Navigation committed"
        );
    }

    /// Record a terminal network error
    pub fn set_net_error(&mut self, net_error: NetError) {
        self.data.net_error = net_error;
    }

    /// Flag this attempt as a legacy cross-context transfer
    ///
    /// While set, the ready-to-commit delegate event is suppressed.
    pub fn set_is_transferring(&mut self, is_transferring: bool) {
        self.is_transferring = is_transferring;
    }

    /// Whether this attempt is flagged as a legacy transfer
    pub fn is_transferring(&self) -> bool {
        self.is_transferring
    }

    // ─── Accessors ───────────────────────────────────────────────

    /// Generated attempt identifier
    pub fn id(&self) -> &str {
        &self.data.id
    }

    /// Current target URL
    pub fn url(&self) -> &str {
        &self.data.url
    }

    /// Current lifecycle state
    pub fn state(&self) -> NavigationState {
        self.state
    }

    /// Whether the attempt is suspended waiting for `resume()`
    pub fn is_deferred(&self) -> bool {
        self.state.is_deferring()
    }

    /// Borrowed view of the attempt's data
    pub fn data(&self) -> &NavigationData {
        &self.data
    }

    /// Whether the request method is POST
    ///
    /// Not available before the request has started.
    pub fn is_post(&self) -> bool {
        debug_assert_ne!(self.state, NavigationState::Initial);
        self.data.method == "POST"
    }

    /// Sanitized referrer; not available before the request has started
    pub fn referrer(&self) -> &Referrer {
        debug_assert_ne!(self.state, NavigationState::Initial);
        &self.data.referrer
    }

    /// User-gesture flag; not available before the request has started
    pub fn has_user_gesture(&self) -> bool {
        debug_assert_ne!(self.state, NavigationState::Initial);
        self.data.has_user_gesture
    }

    /// Transition metadata; not available before the request has started
    pub fn page_transition(&self) -> PageTransition {
        debug_assert_ne!(self.state, NavigationState::Initial);
        self.data.transition
    }

    /// External-protocol flag; not available before the request has started
    pub fn is_external_protocol(&self) -> bool {
        debug_assert_ne!(self.state, NavigationState::Initial);
        self.data.is_external_protocol
    }

    /// Render context; only available once a response has been received
    pub fn render_context(&self) -> Option<RenderContextId> {
        debug_assert!(
            matches!(
                self.state,
                NavigationState::WillProcessResponse
                    | NavigationState::DeferringResponse
                    | NavigationState::ReadyToCommit
                    | NavigationState::DidCommit
                    | NavigationState::DidCommitErrorPage
            ),
            "render context is only assigned once a response has been received"
        );
        self.data.render_context
    }

    /// Same-document flag; only available after commit
    pub fn is_same_document(&self) -> bool {
        debug_assert!(self.state.has_committed());
        self.data.is_same_document
    }

    /// Whether at least one server redirect occurred
    pub fn was_redirected(&self) -> bool {
        self.data.was_redirected
    }

    /// Whether the attempt reached a commit
    pub fn has_committed(&self) -> bool {
        self.state.has_committed()
    }

    /// Whether the attempt committed an error page
    pub fn is_error_page(&self) -> bool {
        self.state == NavigationState::DidCommitErrorPage
    }

    /// Terminal network error
    pub fn net_error(&self) -> NetError {
        self.data.net_error
    }

    /// Latest response headers, if any
    pub fn response_headers(&self) -> Option<&ResponseHeaders> {
        self.data.response_headers.as_ref()
    }

    /// When the navigation started
    pub fn navigation_start(&self) -> Instant {
        self.data.navigation_start
    }

    /// Externally supplied pending entry identifier
    pub fn pending_entry_id(&self) -> u64 {
        self.data.pending_entry_id
    }

    /// Number of registered throttles
    pub fn throttle_count(&self) -> usize {
        self.throttles.len()
    }

    // ─── Stage loop ──────────────────────────────────────────────

    /// Consult throttles for `stage`, starting at the stored cursor
    ///
    /// Halts at the first non-`Proceed` decision. Runs to completion only
    /// when every remaining throttle proceeds, in which case the cursor
    /// resets for the next stage.
    fn check_throttles(&mut self, stage: Stage) -> Decision {
        debug_assert!(
            self.state == stage.running_state() || self.state == stage.deferring_state()
        );
        debug_assert!(self.state != stage.running_state() || self.next_index == 0);
        debug_assert!(self.state != stage.deferring_state() || self.next_index != 0);

        for i in self.next_index..self.throttles.len() {
            let result = match stage {
                Stage::Start => self.throttles[i].will_start_request(&self.data),
                Stage::Redirect => self.throttles[i].will_redirect_request(&self.data),
                Stage::Response => self.throttles[i].will_process_response(&self.data),
            };
            tracing::trace!(
                navigation = %self.data.id,
                throttle = self.throttles[i].name(),
                stage = ?stage,
                decision = ?result,
                "Throttle consulted"
            );
            match result {
                Decision::Proceed => continue,

                Decision::Cancel | Decision::CancelAndIgnore => {
                    self.state = NavigationState::Canceling;
                    return result;
                }

                Decision::Defer => {
                    self.state = stage.deferring_state();
                    self.next_index = i + 1;
                    return Decision::Defer;
                }

                Decision::BlockResponse => {
                    if stage == Stage::Response {
                        self.state = NavigationState::Canceling;
                        return result;
                    }
                    debug_assert!(false, "BlockResponse is only valid at the response stage");
                    // Ignored in release builds.
                }
            }
        }
        self.next_index = 0;
        self.state = stage.running_state();

        // Notify the delegate that a redirect passed the checks and will
        // be followed. Lives here so resume() gets it too.
        if stage == Stage::Redirect {
            self.delegate.did_redirect_navigation(&self.data);
        }

        Decision::Proceed
    }

    /// Post-stage handling shared by entry points and `resume()`
    fn deliver(&mut self, stage: Stage, result: Decision) {
        if result == Decision::Defer {
            return;
        }
        if stage == Stage::Response && result == Decision::Proceed {
            self.ready_to_commit();
        }
        self.run_complete_callback(result);
    }

    fn ready_to_commit(&mut self) {
        self.state = NavigationState::ReadyToCommit;
        tracing::debug!(navigation = %self.data.id, url = %self.data.url, "Ready to commit");
        // A legacy transfer re-targets the render context; the event would
        // name the wrong one.
        if !self.is_transferring {
            self.delegate.ready_to_commit_navigation(&self.data);
        }
    }

    /// Consume and fire the pending continuation
    fn run_complete_callback(&mut self, result: Decision) {
        debug_assert_ne!(result, Decision::Defer);
        if let Some(callback) = self.pending.take() {
            tracing::debug!(navigation = %self.data.id, result = ?result, "Throttle checks finished");
            callback(result);
        }
    }
}

impl Drop for NavigationAttempt {
    fn drop(&mut self) {
        self.delegate.did_finish_navigation(&self.data);

        // A pending continuation must never be dropped silently: the loader
        // needs a decision to stop in-flight work. Server-side navigation
        // mode hands that responsibility to the server-side collaborator.
        if !self.server_side_navigation {
            if let Some(callback) = self.pending.take() {
                tracing::debug!(
                    navigation = %self.data.id,
                    "Destroyed while deferred; synthesizing CancelAndIgnore"
                );
                callback(Decision::CancelAndIgnore);
            }
        }
    }
}
