//! Page outcome definitions for tracking crawl progress
//!
//! Every URL accepted off the frontier ends in exactly one of these states.
use std::fmt;

/// Final state of a visited page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Success =====
    /// Page was fetched and its links were extracted
    Fetched,

    // ===== Skip =====
    /// Fetched, but not served as HTML; no links were extracted
    NotHtml,

    /// robots.txt disallows the page; it was never fetched
    RobotsDisallowed,

    // ===== Errors =====
    /// Server answered HTTP 403
    Denied,

    /// Any other HTTP status, or a network/timeout failure
    Failed,
}

impl PageState {
    /// Returns true if links were extracted from this page
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Fetched)
    }

    /// Returns true if the fetch was attempted and did not yield content
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Denied | Self::Failed)
    }

    /// Returns true if a page request was sent for this state
    pub fn was_fetched(&self) -> bool {
        !matches!(self, Self::RobotsDisallowed)
    }

    /// Short label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::NotHtml => "not_html",
            Self::RobotsDisallowed => "robots_disallowed",
            Self::Denied => "denied",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> [Self; 5] {
        [
            Self::Fetched,
            Self::NotHtml,
            Self::RobotsDisallowed,
            Self::Denied,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
