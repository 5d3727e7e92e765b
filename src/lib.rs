//! # lookout-search
//!
//! Search-result extraction and ranking pipeline for the Lookout data
//! collection system.
//!
//! Given a free-text query, this crate fetches a Baidu results page,
//! pulls structured records out of the loosely-structured markup with
//! ordered raw-text patterns (no DOM parser), filters navigation and
//! tracking noise, scores candidates against the query, removes
//! near-duplicates, and, when extraction fails or an anti-automation
//! challenge is detected, substitutes clearly-labelled synthetic
//! records. Callers always receive a usable, bounded [`ResultSet`].
//!
//! ## Example
//!
//! ```no_run
//! use lookout_search::{search, SearchConfig};
//!
//! # async fn example() -> Result<(), lookout_search::SearchError> {
//! let config = SearchConfig::default();
//! let results = search("四川农业大学", &config).await?;
//! for record in &results.records {
//!     println!("[{}] {} — {}", record.score, record.title, record.url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Session reuse
//!
//! Each call to [`search`] builds a fresh [`SearchSession`]. To run
//! several searches with one identity (cookies, escalating pacing),
//! build a session once and use [`search_with_session`] or
//! [`batch_search`]. Sessions are sequential, single-writer values; do
//! not share one across concurrent searches.

pub mod config;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod fetch;
pub mod orchestrator;
pub mod session;
pub mod types;
pub mod urls;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use session::SearchSession;
pub use types::{
    FetchFailure, RawResponse, RecordSource, ResponseKind, ResultSet, SearchRecord, SearchStatus,
};

/// Search for a single query with a fresh session.
///
/// # Errors
///
/// [`SearchError::EmptyQuery`] for whitespace-only input and
/// [`SearchError::Config`]/[`SearchError::Http`] for setup problems —
/// all reported before any network activity. Network failures after
/// that are absorbed into the returned set's status.
pub async fn search(query: &str, config: &SearchConfig) -> Result<ResultSet> {
    let mut session = SearchSession::new(config)?;
    orchestrator::run_search(&mut session, query, config).await
}

/// Search through a caller-owned session.
///
/// Reusing a session carries cookies and pacing counters across calls,
/// which is the polite way to run several related searches.
pub async fn search_with_session(
    session: &mut SearchSession,
    query: &str,
    config: &SearchConfig,
) -> Result<ResultSet> {
    orchestrator::run_search(session, query, config).await
}

/// Search a list of keywords sequentially, one result set per keyword.
///
/// All keywords share one session so pacing escalates across the batch.
pub async fn batch_search(queries: &[String], config: &SearchConfig) -> Result<Vec<ResultSet>> {
    let mut session = SearchSession::new(config)?;
    orchestrator::run_batch(&mut session, queries, config).await
}

/// Search a list of keywords and merge everything into one
/// deduplicated, re-ranked result set.
pub async fn search_merged(queries: &[String], config: &SearchConfig) -> Result<ResultSet> {
    let mut session = SearchSession::new(config)?;
    orchestrator::run_merged(&mut session, queries, config).await
}
