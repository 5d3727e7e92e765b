//! Pattern-based extraction of candidate records from raw markup.
//!
//! The results page is adversarial and unstable, so there is no DOM
//! here: an ordered list of raw-text patterns runs in priority order and
//! the first pattern that yields at least one record wins the page.
//! Lower-priority patterns never run after a higher-priority hit, which
//! keeps one real result from being extracted twice under two shapes.
//!
//! Summaries are looked up by proximity, inside a bounded window after
//! the matched title, never re-scanned across the whole page — that is
//! what keeps one record's abstract from bleeding into the next.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::types::SearchRecord;

/// Per-pattern cap on extracted candidates; bounds worst-case work on
/// adversarial or enormous pages.
pub const PATTERN_CANDIDATE_CAP: usize = 50;

/// How far past a matched title the summary lookup may reach, in bytes.
const SUMMARY_WINDOW: usize = 1500;

/// Summary length cap, in characters.
const SUMMARY_MAX_CHARS: usize = 300;

/// One structural shape a result can take on the page, most specific
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractPattern {
    /// `<h3 class="t"><a href>…</a></h3>` result headers with a nearby
    /// abstract block.
    TitleBlock,
    /// `result` / `c-container` divs wrapping an anchor.
    ResultContainer,
    /// Any absolute-URL anchor with a plain-text label. Last resort.
    AnyAnchor,
}

impl ExtractPattern {
    /// All patterns in priority order.
    pub fn all() -> &'static [ExtractPattern] {
        &[Self::TitleBlock, Self::ResultContainer, Self::AnyAnchor]
    }

    /// Stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TitleBlock => "title-block",
            Self::ResultContainer => "result-container",
            Self::AnyAnchor => "any-anchor",
        }
    }

    fn apply(&self, markup: &str) -> Vec<SearchRecord> {
        match self {
            Self::TitleBlock => extract_with(title_block_re(), markup, true),
            Self::ResultContainer => extract_with(result_container_re(), markup, true),
            Self::AnyAnchor => extract_with(any_anchor_re(), markup, false),
        }
    }
}

/// Extract candidate records from a results page.
///
/// Pure and deterministic given `markup`. Returns an empty vector when
/// nothing matches; never fails.
pub fn extract(markup: &str) -> Vec<SearchRecord> {
    for pattern in ExtractPattern::all() {
        let records = pattern.apply(markup);
        if !records.is_empty() {
            tracing::debug!(pattern = pattern.name(), count = records.len(), "pattern matched");
            return records;
        }
        tracing::trace!(pattern = pattern.name(), "pattern yielded nothing");
    }
    tracing::debug!("no extraction pattern matched");
    Vec::new()
}

fn title_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?is)<h3[^>]*class=["'][^"']*\bt\b[^"']*["'][^>]*>.*?<a[^>]*?href=["']([^"']+)["'][^>]*>(.*?)</a>"#,
        )
        .expect("title block regex")
    })
}

fn result_container_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?is)<div[^>]*class=["'][^"']*(?:result|c-container)[^"']*["'][^>]*>.*?<a[^>]*?href=["']([^"']+)["'][^>]*>(.*?)</a>"#,
        )
        .expect("result container regex")
    })
}

fn any_anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a[^>]*?href=["'](https?://[^"']+)["'][^>]*>([^<]+)</a>"#)
            .expect("any anchor regex")
    })
}

fn abstract_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?is)<(?:div|span)[^>]*class=["'][^"']*(?:c-abstract|content-right)[^"']*["'][^>]*>(.*?)</(?:div|span)>"#,
        )
        .expect("abstract regex")
    })
}

fn next_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?is)<(?:h3[^>]*class=["'][^"']*\bt\b|div[^>]*class=["'][^"']*(?:result|c-container))"#,
        )
        .expect("block boundary regex")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

fn extract_with(re: &Regex, markup: &str, with_summary: bool) -> Vec<SearchRecord> {
    let mut records = Vec::new();
    let mut seen_hrefs: HashSet<String> = HashSet::new();

    for captures in re.captures_iter(markup) {
        let (Some(href_match), Some(title_match)) = (captures.get(1), captures.get(2)) else {
            continue;
        };

        let href = href_match.as_str().trim().to_string();
        let title = clean_text(title_match.as_str());
        if !plausible_candidate(&title, &href) {
            continue;
        }
        if !seen_hrefs.insert(href.clone()) {
            continue;
        }

        let summary = if with_summary {
            // Whole-match end, so the window starts after the title anchor.
            let start = captures.get(0).map_or(title_match.end(), |m| m.end());
            proximity_summary(markup, start)
        } else {
            String::new()
        };

        records.push(SearchRecord::organic(title, href, summary));
        if records.len() >= PATTERN_CANDIDATE_CAP {
            break;
        }
    }

    records
}

/// The first abstract block within a bounded window after `start`.
///
/// The window ends at the next result block, so a record missing its
/// abstract never borrows the following record's.
fn proximity_summary(markup: &str, start: usize) -> String {
    let end = floor_char_boundary(markup, start.saturating_add(SUMMARY_WINDOW));
    let mut window = &markup[start..end];
    if let Some(boundary) = next_block_re().find(window) {
        window = &window[..boundary.start()];
    }
    abstract_re()
        .captures(window)
        .and_then(|captures| captures.get(1))
        .map(|m| truncate_chars(&clean_text(m.as_str()), SUMMARY_MAX_CHARS))
        .unwrap_or_default()
}

fn plausible_candidate(title: &str, href: &str) -> bool {
    let title_len = title.chars().count();
    title_len >= 3 && title_len <= 150 && href.len() > 8
}

/// Strip embedded markup, decode common entities, collapse whitespace.
fn clean_text(html: &str) -> String {
    let stripped = tag_re().replace_all(html, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    whitespace_re().replace_all(&decoded, " ").trim().to_string()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
