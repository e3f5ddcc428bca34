//! Core types for the navigation gating pipeline
//!
//! All plain types use camelCase JSON serialization for wire compatibility
//! with embedder tooling.

use crate::error::{NavigationError, Result};
use serde::{Deserialize, Serialize};

/// The outcome a throttle returns for a lifecycle stage
///
/// `BlockResponse` is only valid as the result of the response-stage
/// operation; returning it from the start or redirect stage is a programming
/// error (asserted in debug builds, ignored in release builds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Decision {
    /// Allow the navigation to continue to the next throttle
    Proceed,
    /// Suspend the stage loop; the throttle will call `resume()` or
    /// `cancel_deferred()` later on the same sequence
    Defer,
    /// Cancel the navigation; the caller typically shows an error page
    Cancel,
    /// Cancel the navigation with no visible effect
    CancelAndIgnore,
    /// Block the response from being displayed (response stage only)
    BlockResponse,
}

impl Decision {
    /// Whether this decision terminates the navigation
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Decision::Cancel | Decision::CancelAndIgnore | Decision::BlockResponse
        )
    }
}

/// Lifecycle state of a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationState {
    /// Created, no stage has run yet
    Initial,
    /// Start stage running or complete
    WillSendRequest,
    /// Suspended mid start stage
    DeferringStart,
    /// Redirect stage running or complete
    WillRedirectRequest,
    /// Suspended mid redirect stage
    DeferringRedirect,
    /// Response stage running or complete
    WillProcessResponse,
    /// Suspended mid response stage
    DeferringResponse,
    /// Response stage approved; waiting for the commit signal
    ReadyToCommit,
    /// Navigation committed successfully
    DidCommit,
    /// Navigation committed an error page
    DidCommitErrorPage,
    /// A throttle cancelled the navigation; terminal for this core
    Canceling,
}

impl NavigationState {
    /// Whether the attempt is suspended waiting for `resume()`
    pub fn is_deferring(&self) -> bool {
        matches!(
            self,
            NavigationState::DeferringStart
                | NavigationState::DeferringRedirect
                | NavigationState::DeferringResponse
        )
    }

    /// Whether the attempt reached a commit (success or error page)
    pub fn has_committed(&self) -> bool {
        matches!(
            self,
            NavigationState::DidCommit | NavigationState::DidCommitErrorPage
        )
    }
}

/// Page transition metadata carried by a navigation attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageTransition {
    /// User followed a link
    #[default]
    Link,
    /// User typed the URL
    Typed,
    /// Page reload
    Reload,
    /// Form submission
    FormSubmit,
    /// Subframe navigation triggered automatically
    AutoSubframe,
    /// Subframe navigation triggered by the user
    ManualSubframe,
}

/// Terminal network error recorded on an attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NetError {
    /// No error
    #[default]
    Ok,
    /// Request was aborted
    Aborted,
    /// Response was blocked by a policy decision
    BlockedByResponse,
    /// Generic failure
    Failed,
}

/// Opaque handle to the render context a response was assigned to
///
/// This core never inspects the handle; it only records and returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContextId(pub u64);

/// Referrer policy applied when sanitizing a referrer for a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferrerPolicy {
    /// Clear the referrer on HTTPS → HTTP downgrades
    #[default]
    Default,
    /// Always send the full referrer
    Always,
    /// Never send a referrer
    Never,
    /// Send only the referrer's origin
    Origin,
}

/// A sanitized referrer (URL + policy)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referrer {
    /// Referrer URL; empty when cleared
    pub url: String,

    /// Policy that governed (and keeps governing) sanitization
    pub policy: ReferrerPolicy,
}

impl Referrer {
    /// Create a referrer with the given URL and policy
    pub fn new(url: impl Into<String>, policy: ReferrerPolicy) -> Self {
        Self {
            url: url.into(),
            policy,
        }
    }

    /// Sanitize a referrer for a request to `destination`
    ///
    /// Applies the referrer's own policy. Malformed referrer URLs are
    /// cleared rather than propagated.
    pub fn sanitize_for_request(destination: &str, referrer: Referrer) -> Referrer {
        if referrer.url.is_empty() {
            return referrer;
        }

        match referrer.policy {
            ReferrerPolicy::Never => Referrer::new("", referrer.policy),
            ReferrerPolicy::Always => referrer,
            ReferrerPolicy::Origin => match Origin::parse(&referrer.url) {
                Ok(origin) => Referrer::new(origin.to_url(), referrer.policy),
                Err(_) => Referrer::new("", referrer.policy),
            },
            ReferrerPolicy::Default => {
                // No-referrer-when-downgrade: drop HTTPS referrers on
                // non-HTTPS destinations.
                let referrer_is_https = referrer.url.starts_with("https://");
                let destination_is_https = destination.starts_with("https://");
                if referrer_is_https && !destination_is_https {
                    Referrer::new("", referrer.policy)
                } else {
                    referrer
                }
            }
        }
    }
}

/// A scheme/host/port triple used for same-origin checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    /// Lowercased scheme (e.g. "https")
    pub scheme: String,
    /// Lowercased host
    pub host: String,
    /// Port, with scheme defaults applied (http → 80, https → 443)
    pub port: u16,
}

impl Origin {
    /// Parse the origin out of a URL string
    pub fn parse(url: &str) -> Result<Origin> {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| NavigationError::MalformedUrl(url.to_string()))?;

        if scheme.is_empty() {
            return Err(NavigationError::MalformedUrl(url.to_string()));
        }

        let authority = rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or(rest);

        if authority.is_empty() {
            return Err(NavigationError::MalformedUrl(url.to_string()));
        }

        let scheme = scheme.to_ascii_lowercase();
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port_str)) if !port_str.is_empty() => {
                let port = port_str
                    .parse::<u16>()
                    .map_err(|_| NavigationError::MalformedUrl(url.to_string()))?;
                (host, port)
            }
            _ => (authority, default_port(&scheme)),
        };

        if host.is_empty() {
            return Err(NavigationError::MalformedUrl(url.to_string()));
        }

        Ok(Origin {
            scheme,
            host: host.to_ascii_lowercase(),
            port,
        })
    }

    /// Render the origin back into URL form (`scheme://host:port`)
    pub fn to_url(&self) -> String {
        format!("{}://{}:{}/", self.scheme, self.host, self.port)
    }
}

fn default_port(scheme: &str) -> u16 {
    match scheme {
        "http" | "ws" => 80,
        "https" | "wss" => 443,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_serialization() {
        let json = serde_json::to_string(&Decision::CancelAndIgnore).unwrap();
        assert_eq!(json, "\"cancelAndIgnore\"");

        let parsed: Decision = serde_json::from_str("\"blockResponse\"").unwrap();
        assert_eq!(parsed, Decision::BlockResponse);
    }

    #[test]
    fn test_decision_is_cancellation() {
        assert!(!Decision::Proceed.is_cancellation());
        assert!(!Decision::Defer.is_cancellation());
        assert!(Decision::Cancel.is_cancellation());
        assert!(Decision::CancelAndIgnore.is_cancellation());
        assert!(Decision::BlockResponse.is_cancellation());
    }

    #[test]
    fn test_state_predicates() {
        assert!(NavigationState::DeferringStart.is_deferring());
        assert!(NavigationState::DeferringRedirect.is_deferring());
        assert!(NavigationState::DeferringResponse.is_deferring());
        assert!(!NavigationState::WillSendRequest.is_deferring());

        assert!(NavigationState::DidCommit.has_committed());
        assert!(NavigationState::DidCommitErrorPage.has_committed());
        assert!(!NavigationState::ReadyToCommit.has_committed());
        assert!(!NavigationState::Canceling.has_committed());
    }

    #[test]
    fn test_origin_parse_basic() {
        let origin = Origin::parse("https://example.com/path?q=1#frag").unwrap();
        assert_eq!(origin.scheme, "https");
        assert_eq!(origin.host, "example.com");
        assert_eq!(origin.port, 443);
    }

    #[test]
    fn test_origin_parse_explicit_port() {
        let origin = Origin::parse("http://example.com:8080/").unwrap();
        assert_eq!(origin.port, 8080);
    }

    #[test]
    fn test_origin_default_ports() {
        assert_eq!(Origin::parse("http://a.com").unwrap().port, 80);
        assert_eq!(Origin::parse("https://a.com").unwrap().port, 443);
        assert_eq!(Origin::parse("custom://a.com").unwrap().port, 0);
    }

    #[test]
    fn test_origin_case_normalization() {
        let origin = Origin::parse("HTTPS://Example.COM/Path").unwrap();
        assert_eq!(origin.scheme, "https");
        assert_eq!(origin.host, "example.com");
    }

    #[test]
    fn test_origin_equality_ignores_default_port_spelling() {
        let implicit = Origin::parse("https://example.com/").unwrap();
        let explicit = Origin::parse("https://example.com:443/a").unwrap();
        assert_eq!(implicit, explicit);
    }

    #[test]
    fn test_origin_parse_malformed() {
        assert!(Origin::parse("not-a-url").is_err());
        assert!(Origin::parse("://missing-scheme.com").is_err());
        assert!(Origin::parse("https://").is_err());
        assert!(Origin::parse("https://host:notaport/").is_err());
    }

    #[test]
    fn test_referrer_sanitize_downgrade_cleared() {
        let referrer = Referrer::new("https://secure.example.com/page", ReferrerPolicy::Default);
        let sanitized = Referrer::sanitize_for_request("http://plain.example.com/", referrer);
        assert!(sanitized.url.is_empty());
    }

    #[test]
    fn test_referrer_sanitize_same_scheme_kept() {
        let referrer = Referrer::new("https://secure.example.com/page", ReferrerPolicy::Default);
        let sanitized =
            Referrer::sanitize_for_request("https://other.example.com/", referrer.clone());
        assert_eq!(sanitized, referrer);
    }

    #[test]
    fn test_referrer_sanitize_never() {
        let referrer = Referrer::new("https://a.com/x", ReferrerPolicy::Never);
        let sanitized = Referrer::sanitize_for_request("https://b.com/", referrer);
        assert!(sanitized.url.is_empty());
    }

    #[test]
    fn test_referrer_sanitize_origin_only() {
        let referrer = Referrer::new("https://a.com/secret/path", ReferrerPolicy::Origin);
        let sanitized = Referrer::sanitize_for_request("https://b.com/", referrer);
        assert_eq!(sanitized.url, "https://a.com:443/");
    }

    #[test]
    fn test_referrer_sanitize_malformed_cleared() {
        let referrer = Referrer::new("garbage", ReferrerPolicy::Origin);
        let sanitized = Referrer::sanitize_for_request("https://b.com/", referrer);
        assert!(sanitized.url.is_empty());
    }

    #[test]
    fn test_referrer_serialization() {
        let referrer = Referrer::new("https://a.com/", ReferrerPolicy::Origin);
        let json = serde_json::to_string(&referrer).unwrap();
        assert!(json.contains("\"url\":\"https://a.com/\""));
        assert!(json.contains("\"policy\":\"origin\""));
    }

    #[test]
    fn test_page_transition_default() {
        assert_eq!(PageTransition::default(), PageTransition::Link);
    }

    #[test]
    fn test_net_error_serialization() {
        let json = serde_json::to_string(&NetError::BlockedByResponse).unwrap();
        assert_eq!(json, "\"blockedByResponse\"");
    }
}
