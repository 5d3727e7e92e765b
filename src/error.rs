//! Error types for the lookout-search crate.
//!
//! Only conditions the pipeline cannot absorb surface here: malformed
//! input and failures that occur before any network activity. Everything
//! that happens after a request is sent is recovered inside the
//! orchestrator and reported through [`crate::types::SearchStatus`].

/// Errors that can occur before the search pipeline starts.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query was empty or whitespace-only. Rejected before any
    /// network activity.
    #[error("search query is empty")]
    EmptyQuery,

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP error: {0}")]
    Http(String),
}

/// Convenience type alias for lookout-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
