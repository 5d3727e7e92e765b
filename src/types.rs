//! Core types for search records, fetch outcomes, and result sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a search record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordSource {
    /// Extracted from a live Baidu results page.
    Baidu,
    /// Locally generated placeholder — never retrieved from the network.
    Fallback,
}

impl RecordSource {
    /// Returns the stable tag used when handing records to the persistence layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Baidu => "baidu",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single extracted (or synthesised) search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Result title, markup-stripped and whitespace-collapsed.
    pub title: String,
    /// Absolute `http`/`https` URL.
    pub url: String,
    /// Abstract/snippet text near the title, empty when none was found.
    pub summary: String,
    /// Which source produced this record.
    pub source: RecordSource,
    /// Relevance against the query, in `[0, 100]`. Zero until validated.
    pub score: u8,
    /// True for locally generated placeholder records.
    pub synthetic: bool,
}

impl SearchRecord {
    /// Build an unscored organic record as produced by the extractor.
    pub fn organic(title: impl Into<String>, url: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            summary: summary.into(),
            source: RecordSource::Baidu,
            score: 0,
            synthetic: false,
        }
    }
}

/// Why a fetch attempt produced no usable markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Connection-level failure (refused, reset, DNS).
    Network(String),
    /// The request exceeded the configured timeout.
    Timeout,
    /// The engine answered with a non-success HTTP status.
    Status(u16),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Timeout => f.write_str("request timed out"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
        }
    }
}

/// Classification of a fetched results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    /// Decoded markup that can be handed to the extractor.
    Ok,
    /// An anti-automation challenge was detected in the body.
    Blocked,
    /// The request never produced usable markup.
    Failed(FetchFailure),
}

/// Raw fetch outcome: decoded body text plus its classification.
///
/// Produced by the fetcher, consumed by the extractor, then discarded.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code, or 0 when the request never completed.
    pub status: u16,
    /// Decoded body text (empty on transport failure).
    pub body: String,
    /// Controlling classification for the orchestrator's fallback decision.
    pub kind: ResponseKind,
}

impl RawResponse {
    /// A response for a request that failed before any body arrived.
    pub fn failed(failure: FetchFailure) -> Self {
        Self {
            status: 0,
            body: String::new(),
            kind: ResponseKind::Failed(failure),
        }
    }
}

/// Overall outcome of one search invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    /// The pipeline produced enough organic results.
    Ok,
    /// Fallback records were needed (fetch failure or thin extraction).
    Degraded,
    /// An anti-automation challenge was detected; all records are synthetic.
    Blocked,
}

/// Ordered, bounded set of records returned to the caller.
///
/// Records are sorted by descending score and contain no two entries
/// sharing a normalised URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSet {
    /// The query this set answers.
    pub query: String,
    /// Ranked records, capped at the configured maximum.
    pub records: Vec<SearchRecord>,
    /// How the pipeline terminated.
    pub status: SearchStatus,
    /// Human-readable cause when `status` is not `Ok`.
    pub cause: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_source_names() {
        assert_eq!(RecordSource::Baidu.name(), "baidu");
        assert_eq!(RecordSource::Fallback.name(), "fallback");
        assert_eq!(RecordSource::Baidu.to_string(), "baidu");
    }

    #[test]
    fn organic_record_defaults() {
        let record = SearchRecord::organic("Title", "https://example.com", "summary");
        assert_eq!(record.source, RecordSource::Baidu);
        assert_eq!(record.score, 0);
        assert!(!record.synthetic);
    }

    #[test]
    fn search_record_serde_round_trip() {
        let record = SearchRecord {
            title: "四川农业大学".into(),
            url: "https://www.sicau.edu.cn/".into(),
            summary: "官网".into(),
            source: RecordSource::Baidu,
            score: 80,
            synthetic: false,
        };
        let json = serde_json::to_string(&record).expect("serialize");
        let decoded: SearchRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded.title, "四川农业大学");
        assert_eq!(decoded.score, 80);
    }

    #[test]
    fn fetch_failure_display() {
        assert_eq!(FetchFailure::Timeout.to_string(), "request timed out");
        assert_eq!(FetchFailure::Status(403).to_string(), "HTTP status 403");
        assert!(FetchFailure::Network("refused".into())
            .to_string()
            .contains("refused"));
    }

    #[test]
    fn failed_response_has_empty_body() {
        let response = RawResponse::failed(FetchFailure::Timeout);
        assert_eq!(response.status, 0);
        assert!(response.body.is_empty());
        assert_eq!(response.kind, ResponseKind::Failed(FetchFailure::Timeout));
    }
}
