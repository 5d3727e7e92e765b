//! The search pipeline as an explicit state machine.
//!
//! Every failure class maps to a named transition rather than a caught
//! error: a blocked or failed fetch branches straight to the fallback
//! generator, a thin post-dedupe result tops itself up, and the caller
//! always receives a bounded, ranked [`ResultSet`]. The only error the
//! public entry points surface is malformed input, reported before any
//! network activity.

use std::collections::HashSet;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::extract;
use crate::fallback;
use crate::fetch;
use crate::session::SearchSession;
use crate::types::{RawResponse, ResponseKind, ResultSet, SearchRecord, SearchStatus};
use crate::urls::{clean_url, dedupe_key, is_host_internal};

use super::{dedup, scoring};

/// Cap on the merged multi-keyword result set.
const MERGED_MAX: usize = 20;

/// Pipeline stages. Transitions are logged; no stage is ever skipped on
/// the organic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Fetching,
    Blocked,
    FetchFailed,
    Fetched,
    Extracting,
    Validating,
    Deduping,
    Sufficient,
    Insufficient,
    Done,
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!(from = ?state, to = ?next, "pipeline transition");
    *state = next;
}

/// Run the post-fetch pipeline over one classified response.
///
/// This is the branch point between the organic path and the fallback
/// paths; it is pure apart from logging, which makes every downstream
/// stage testable without a network.
pub fn process_response(query: &str, response: RawResponse, config: &SearchConfig) -> ResultSet {
    let mut state = PipelineState::Fetching;

    match response.kind {
        ResponseKind::Blocked => {
            advance(&mut state, PipelineState::Blocked);
            let records = fallback::generate(query, config.max_results);
            advance(&mut state, PipelineState::Done);
            ResultSet {
                query: query.to_string(),
                records,
                status: SearchStatus::Blocked,
                cause: Some("anti-automation challenge detected".to_string()),
            }
        }
        ResponseKind::Failed(failure) => {
            advance(&mut state, PipelineState::FetchFailed);
            let records = fallback::generate(query, config.max_results);
            advance(&mut state, PipelineState::Done);
            ResultSet {
                query: query.to_string(),
                records,
                status: SearchStatus::Degraded,
                cause: Some(failure.to_string()),
            }
        }
        ResponseKind::Ok => {
            advance(&mut state, PipelineState::Fetched);
            advance(&mut state, PipelineState::Extracting);
            let candidates = extract::extract(&response.body);
            finish_pipeline(state, query, candidates, config)
        }
    }
}

/// Validate, score, dedupe, and top up extracted candidates.
fn finish_pipeline(
    mut state: PipelineState,
    query: &str,
    candidates: Vec<SearchRecord>,
    config: &SearchConfig,
) -> ResultSet {
    advance(&mut state, PipelineState::Validating);
    let usable: Vec<SearchRecord> = candidates
        .into_iter()
        .filter_map(|mut record| {
            let cleaned = clean_url(&record.url)?;
            if is_host_internal(&cleaned) {
                tracing::trace!(url = %cleaned, "dropping host-internal link");
                return None;
            }
            record.url = cleaned;
            Some(record)
        })
        .collect();
    let scored = scoring::validate(usable, query);

    advance(&mut state, PipelineState::Deduping);
    let mut records = dedup::dedupe(&scored, config.max_results);

    if records.len() >= config.min_results {
        advance(&mut state, PipelineState::Sufficient);
        advance(&mut state, PipelineState::Done);
        return ResultSet {
            query: query.to_string(),
            records,
            status: SearchStatus::Ok,
            cause: None,
        };
    }

    advance(&mut state, PipelineState::Insufficient);
    let organic = records.len();
    let present: HashSet<String> = records.iter().map(|r| dedupe_key(&r.url)).collect();
    for synthetic in fallback::generate(query, config.max_results) {
        if records.len() >= config.min_results {
            break;
        }
        if present.contains(&dedupe_key(&synthetic.url)) {
            continue;
        }
        records.push(synthetic);
    }
    // Re-rank so the score ordering holds across the mixed set.
    records.sort_by(|a, b| b.score.cmp(&a.score));

    tracing::debug!(organic, total = records.len(), "topped up thin result set");
    advance(&mut state, PipelineState::Done);
    ResultSet {
        query: query.to_string(),
        records,
        status: SearchStatus::Degraded,
        cause: Some("too few organic results".to_string()),
    }
}

/// Run one full search through an existing session.
///
/// Fetches up to `config.pages` result pages, pacing before each
/// request, and stops early when a page yields nothing. A blocked or
/// failed first page takes the fallback path; a later bad page keeps
/// whatever earlier pages produced.
///
/// # Errors
///
/// [`SearchError::EmptyQuery`] for whitespace-only input,
/// [`SearchError::Config`] for an invalid configuration. Never fails on
/// network trouble.
pub async fn run_search(
    session: &mut SearchSession,
    query: &str,
    config: &SearchConfig,
) -> Result<ResultSet> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    config.validate()?;

    let mut state = PipelineState::Fetching;
    let mut candidates: Vec<SearchRecord> = Vec::new();

    for page in 0..config.pages {
        session.pace().await;
        let response = fetch::fetch_page(session, query, page).await;

        match response.kind {
            ResponseKind::Ok => {
                let extracted = extract::extract(&response.body);
                if extracted.is_empty() {
                    tracing::debug!(page, "page yielded nothing, stopping pagination");
                    break;
                }
                candidates.extend(extracted);
            }
            _ if page == 0 => return Ok(process_response(query, response, config)),
            _ => {
                tracing::warn!(page, "later page unusable, keeping earlier results");
                break;
            }
        }
    }

    advance(&mut state, PipelineState::Fetched);
    advance(&mut state, PipelineState::Extracting);
    Ok(finish_pipeline(state, query, candidates, config))
}

/// Search several keywords sequentially through one session.
///
/// Deliberately not parallelised: pacing is the primary anti-block
/// mechanism, and it escalates across the whole batch. Whitespace-only
/// keywords are skipped.
pub async fn run_batch(
    session: &mut SearchSession,
    queries: &[String],
    config: &SearchConfig,
) -> Result<Vec<ResultSet>> {
    config.validate()?;

    let mut sets = Vec::with_capacity(queries.len());
    for query in queries {
        if query.trim().is_empty() {
            tracing::warn!("skipping empty keyword in batch");
            continue;
        }
        let set = run_search(session, query, config).await?;
        tracing::debug!(query = %set.query, records = set.records.len(), status = ?set.status, "batch keyword done");
        sets.push(set);
    }
    Ok(sets)
}

/// Search several keywords and merge into one deduplicated, re-ranked
/// set, capped at [`MERGED_MAX`].
///
/// Status is the worst observed: all keywords blocked reports
/// `Blocked`, any degradation reports `Degraded`.
pub async fn run_merged(
    session: &mut SearchSession,
    queries: &[String],
    config: &SearchConfig,
) -> Result<ResultSet> {
    let sets = run_batch(session, queries, config).await?;
    if sets.is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    Ok(merge_sets(sets))
}

/// Merge per-keyword sets into one set, running the full deduplicator
/// over the pooled records so near-duplicate titles from different
/// keywords also collapse.
fn merge_sets(sets: Vec<ResultSet>) -> ResultSet {
    let all_blocked = sets.iter().all(|s| s.status == SearchStatus::Blocked);
    let any_degraded = sets.iter().any(|s| s.status != SearchStatus::Ok);
    let cause = sets.iter().find_map(|s| s.cause.clone());

    let query = sets
        .iter()
        .map(|s| s.query.as_str())
        .collect::<Vec<_>>()
        .join(" | ");

    let mut pooled: Vec<SearchRecord> = sets.into_iter().flat_map(|s| s.records).collect();
    pooled.sort_by(|a, b| b.score.cmp(&a.score));
    let merged = dedup::dedupe(&pooled, MERGED_MAX);

    let status = if all_blocked {
        SearchStatus::Blocked
    } else if any_degraded {
        SearchStatus::Degraded
    } else {
        SearchStatus::Ok
    };

    ResultSet {
        query,
        records: merged,
        status,
        cause: if status == SearchStatus::Ok { None } else { cause },
    }
}
