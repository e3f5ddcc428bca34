//! Error types for navgate

use thiserror::Error;

/// Errors that can occur in the navigation gating pipeline
///
/// Throttle-internal failures (e.g. a malformed policy header) never surface
/// as errors: they are absorbed at the throttle boundary and converted into a
/// [`Decision`](crate::types::Decision). These variants exist for the parsing
/// helpers that callers and throttles use directly.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// URL could not be parsed into an origin
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    /// Policy header value could not be parsed
    #[error("Failed to parse header '{header}': {reason}")]
    HeaderParse {
        header: String,
        reason: String,
    },
}

/// Result type alias for navigation operations
pub type Result<T> = std::result::Result<T, NavigationError>;
