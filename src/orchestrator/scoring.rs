//! Relevance scoring and validation of candidate records.
//!
//! A candidate's score against the query is built from three signals,
//! strongest first: the full query appearing in the record's text, the
//! record's text starting with the query, and individual query tokens
//! occurring anywhere. Exact match always outweighs prefix match, which
//! outweighs token frequency; the exact constants are tunable.

use crate::types::SearchRecord;

/// Bonus for the full query appearing anywhere in title+summary.
const FULL_MATCH_BONUS: u32 = 30;

/// Additional bonus when title+summary starts with the query.
const PREFIX_BONUS: u32 = 20;

/// Bonus per token occurrence.
const TOKEN_BONUS: u32 = 5;

/// Floor score for synthetic records so they outrank zero-relevance noise.
const SYNTHETIC_FLOOR: u8 = 50;

/// Institution-name suffix tolerated as missing on partial-name pages.
const INSTITUTION_SUFFIX: &str = "大学";

/// Score one record against the query, clamped to `[0, 100]`.
pub fn score(record: &SearchRecord, query: &str) -> u8 {
    let haystack = fold(&format!("{} {}", record.title, record.summary));
    let needle = fold(query);
    if needle.is_empty() {
        return 0;
    }

    let mut total: u32 = 0;

    // Institution names are often written without their suffix; accept
    // the stripped variant for the whole-query bonuses.
    let variant = needle
        .contains(INSTITUTION_SUFFIX)
        .then(|| needle.replace(INSTITUTION_SUFFIX, ""))
        .filter(|v| !v.is_empty());
    let needles: Vec<&str> = std::iter::once(needle.as_str())
        .chain(variant.as_deref())
        .collect();

    if needles.iter().any(|n| haystack.contains(n)) {
        total += FULL_MATCH_BONUS;
    }
    if needles.iter().any(|n| haystack.starts_with(n)) {
        total += PREFIX_BONUS;
    }

    for token in tokenize(&needle) {
        total += TOKEN_BONUS * haystack.matches(&token).count() as u32;
    }

    total.min(100) as u8
}

/// Filter, score, and rank candidates.
///
/// Zero-scoring records are dropped unless synthetic; synthetic records
/// never score below [`SYNTHETIC_FLOOR`]. The sort is stable, so ties
/// preserve extraction order.
pub fn validate(records: Vec<SearchRecord>, query: &str) -> Vec<SearchRecord> {
    let mut scored: Vec<SearchRecord> = records
        .into_iter()
        .filter_map(|mut record| {
            let mut value = score(&record, query);
            if record.synthetic {
                value = value.max(SYNTHETIC_FLOOR);
            } else if value == 0 {
                tracing::trace!(title = %record.title, "dropping zero-relevance candidate");
                return None;
            }
            record.score = value;
            Some(record)
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Query tokens: alphanumeric/CJK runs of at least two characters.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|run| run.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

fn fold(text: &str) -> String {
    text.to_lowercase()
}
