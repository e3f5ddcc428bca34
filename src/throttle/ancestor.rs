//! Reference throttle enforcing frame-embedding restrictions
//!
//! `AncestorPolicyThrottle` inspects the response headers of a subframe
//! navigation and blocks the response when the declared embedding policy
//! forbids display inside the current ancestor chain. It acts at the
//! response stage only; the start and redirect stages always proceed.
//!
//! Two headers are consulted: the legacy single-value `Frame-Options` and
//! the modern multi-value `X-Frame-Options`. A `Content-Security-Policy`
//! header carrying a `frame-ancestors` directive bypasses both — the CSP
//! machinery outside this core governs in that case.

use crate::attempt::NavigationData;
use crate::error::{NavigationError, Result};
use crate::throttle::NavigationThrottle;
use crate::types::{Decision, Origin};
use serde::{Deserialize, Serialize};

/// Legacy single-value embedding policy header
pub const LEGACY_HEADER: &str = "Frame-Options";

/// Modern multi-value embedding policy header
pub const MODERN_HEADER: &str = "X-Frame-Options";

const CSP_HEADER: &str = "Content-Security-Policy";
const FRAME_ANCESTORS_DIRECTIVE: &str = "frame-ancestors";

/// Parsed embedding policy disposition for a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderDisposition {
    /// No embedding policy header present
    None,
    /// `DENY` — never display in a frame
    Deny,
    /// `SAMEORIGIN` — display only under same-origin ancestors
    SameOrigin,
    /// `ALLOWALL` — display anywhere
    AllowAll,
    /// Header present but unparseable
    Invalid,
    /// Multiple occurrences disagree
    Conflict,
    /// A CSP `frame-ancestors` directive supersedes the header
    Bypass,
}

impl HeaderDisposition {
    /// Parse a single embedding policy token
    ///
    /// Tokens are matched ASCII case-insensitively after trimming.
    pub fn parse_token(value: &str) -> Result<HeaderDisposition> {
        let token = value.trim();
        if token.eq_ignore_ascii_case("deny") {
            Ok(HeaderDisposition::Deny)
        } else if token.eq_ignore_ascii_case("sameorigin") {
            Ok(HeaderDisposition::SameOrigin)
        } else if token.eq_ignore_ascii_case("allowall") {
            Ok(HeaderDisposition::AllowAll)
        } else {
            Err(NavigationError::HeaderParse {
                header: MODERN_HEADER.to_string(),
                reason: format!("unrecognized token '{}'", token),
            })
        }
    }
}

/// Reference frame-ancestor policy throttle
///
/// Always registered first, ahead of any embedder throttles.
#[derive(Debug, Default)]
pub struct AncestorPolicyThrottle;

impl AncestorPolicyThrottle {
    /// Create the reference throttle
    pub fn new() -> Self {
        Self
    }

    /// Boxed constructor for registration into a throttle list
    pub fn boxed() -> Box<dyn NavigationThrottle> {
        Box::new(Self)
    }

    /// Evaluate the embedding policy headers of a response
    ///
    /// Returns the combined disposition and the offending raw header value
    /// (empty when no header was present).
    pub fn evaluate(nav: &NavigationData) -> (HeaderDisposition, String) {
        let headers = match &nav.response_headers {
            Some(headers) => headers,
            None => return (HeaderDisposition::None, String::new()),
        };

        // CSP frame-ancestors supersedes both header families.
        let has_frame_ancestors = headers.get_all(CSP_HEADER).any(|value| {
            value
                .split(';')
                .any(|directive| directive.trim_start().starts_with(FRAME_ANCESTORS_DIRECTIVE))
        });
        if has_frame_ancestors {
            let raw = headers.get(CSP_HEADER).unwrap_or_default().to_string();
            return (HeaderDisposition::Bypass, raw);
        }

        let legacy = headers.get(LEGACY_HEADER).map(|value| {
            let disposition =
                HeaderDisposition::parse_token(value).unwrap_or(HeaderDisposition::Invalid);
            (disposition, value.to_string())
        });

        let mut modern = HeaderDisposition::None;
        let mut modern_raw = String::new();
        for value in headers.get_all(MODERN_HEADER).flat_map(|v| v.split(',')) {
            let token = value.trim();
            if token.is_empty() {
                continue;
            }
            if !modern_raw.is_empty() {
                modern_raw.push_str(", ");
            }
            modern_raw.push_str(token);

            let parsed =
                HeaderDisposition::parse_token(token).unwrap_or(HeaderDisposition::Invalid);
            modern = match modern {
                HeaderDisposition::None => parsed,
                current if current == parsed => current,
                _ => HeaderDisposition::Conflict,
            };
        }

        match (legacy, modern) {
            (None, m) => (m, modern_raw),
            (Some((l, raw)), HeaderDisposition::None) => (l, raw),
            (Some((l, raw)), m) if l == m => (l, raw),
            (Some((_, legacy_raw)), _) => (
                HeaderDisposition::Conflict,
                format!("{}; {}", legacy_raw, modern_raw),
            ),
        }
    }

    fn ancestors_are_same_origin(nav: &NavigationData) -> bool {
        let target = match Origin::parse(&nav.url) {
            Ok(origin) => origin,
            // Unparseable target cannot be proven same-origin.
            Err(_) => return false,
        };
        nav.ancestor_origins
            .iter()
            .all(|ancestor| *ancestor == target)
    }
}

impl NavigationThrottle for AncestorPolicyThrottle {
    fn will_process_response(&mut self, nav: &NavigationData) -> Decision {
        // Embedding policy only restricts subframe display.
        if nav.is_main_frame {
            return Decision::Proceed;
        }

        let (disposition, raw_value) = Self::evaluate(nav);

        let decision = match disposition {
            HeaderDisposition::None | HeaderDisposition::AllowAll => Decision::Proceed,
            HeaderDisposition::Bypass => Decision::Proceed,
            HeaderDisposition::SameOrigin => {
                if Self::ancestors_are_same_origin(nav) {
                    Decision::Proceed
                } else {
                    Decision::BlockResponse
                }
            }
            HeaderDisposition::Deny
            | HeaderDisposition::Invalid
            | HeaderDisposition::Conflict => Decision::BlockResponse,
        };

        if !matches!(
            disposition,
            HeaderDisposition::None | HeaderDisposition::AllowAll
        ) {
            tracing::warn!(
                navigation = %nav.id,
                url = %nav.url,
                disposition = ?disposition,
                header_value = %raw_value,
                blocked = decision == Decision::BlockResponse,
                "Embedding policy disposition"
            );
        }

        decision
    }

    fn name(&self) -> &'static str {
        "AncestorPolicyThrottle"
    }
}
