//! Response header access for policy throttles
//!
//! `ResponseHeaders` is an ordered multimap over header occurrences with
//! case-insensitive name lookup. Throttles only read headers; the loader
//! collaborator supplies them at the redirect and response stages.

use serde::{Deserialize, Serialize};

/// Ordered collection of response header occurrences
///
/// Preserves insertion order and duplicate occurrences, both of which matter
/// for policy headers (e.g. repeated `X-Frame-Options` lines).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeaders {
    entries: Vec<(String, String)>,
}

impl ResponseHeaders {
    /// Create an empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header occurrence (builder style)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    /// Append a header occurrence
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value for a header name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values for a header name, in insertion order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether any occurrence of the header exists
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of header occurrences
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no headers
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_case_insensitive() {
        let headers = ResponseHeaders::new().with("X-Frame-Options", "DENY");
        assert_eq!(headers.get("x-frame-options"), Some("DENY"));
        assert_eq!(headers.get("X-FRAME-OPTIONS"), Some("DENY"));
        assert_eq!(headers.get("content-type"), None);
    }

    #[test]
    fn test_get_all_preserves_order_and_duplicates() {
        let headers = ResponseHeaders::new()
            .with("X-Frame-Options", "DENY")
            .with("Content-Type", "text/html")
            .with("x-frame-options", "SAMEORIGIN");

        let values: Vec<&str> = headers.get_all("X-Frame-Options").collect();
        assert_eq!(values, vec!["DENY", "SAMEORIGIN"]);
    }

    #[test]
    fn test_get_returns_first_occurrence() {
        let mut headers = ResponseHeaders::new();
        headers.append("Frame-Options", "DENY");
        headers.append("Frame-Options", "SAMEORIGIN");
        assert_eq!(headers.get("frame-options"), Some("DENY"));
    }

    #[test]
    fn test_empty() {
        let headers = ResponseHeaders::new();
        assert!(headers.is_empty());
        assert_eq!(headers.len(), 0);
        assert!(!headers.has("anything"));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let headers = ResponseHeaders::new()
            .with("X-Frame-Options", "DENY")
            .with("Content-Type", "text/html");

        let json = serde_json::to_string(&headers).unwrap();
        let parsed: ResponseHeaders = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, headers);
    }
}
