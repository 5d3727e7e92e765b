//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls result-set bounds, pagination depth, and
//! request behaviour. The defaults are tuned for polite scraping of a
//! single engine.

use crate::error::SearchError;

/// Configuration for a search invocation.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of records to return after deduplication and ranking.
    pub max_results: usize,
    /// Minimum number of records; the fallback generator tops up to
    /// this, so it is capped at the generator's five templates.
    pub min_results: usize,
    /// Number of result pages to fetch per query (10 results per page).
    pub pages: usize,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in
    /// list of realistic browser User-Agents on every request.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            min_results: 3,
            pages: 1,
            timeout_seconds: 15,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results` must be greater than 0
    /// - `min_results` must not exceed `max_results`
    /// - `min_results` must not exceed the fallback generator's
    ///   capacity, which is what guarantees the minimum is reachable
    ///   when every fetch fails
    /// - `pages` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.min_results > self.max_results {
            return Err(SearchError::Config(
                "min_results must not exceed max_results".into(),
            ));
        }
        if self.min_results > crate::fallback::TEMPLATE_COUNT {
            return Err(SearchError::Config(format!(
                "min_results must not exceed {} (the fallback generator cannot top up further)",
                crate::fallback::TEMPLATE_COUNT
            )));
        }
        if self.pages == 0 {
            return Err(SearchError::Config("pages must be greater than 0".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
