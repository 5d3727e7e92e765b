//! Synthetic placeholder records for degraded and blocked searches.
//!
//! When the engine cannot be reached, or serves a challenge page, or a
//! page yields nothing extractable, the pipeline still returns a
//! non-empty result set. These records are generated from fixed
//! templates, clearly flagged as synthetic, and given descending scores
//! so they rank below nothing real but still carry an ordering.

use crate::types::{RecordSource, SearchRecord};

/// Number of distinct templates; the most records one generation can
/// produce.
pub const TEMPLATE_COUNT: usize = 5;

/// Descending scores assigned to the template records, in order.
const TEMPLATE_SCORES: [u8; TEMPLATE_COUNT] = [95, 90, 85, 80, 75];

/// Title suffix, summary template, and URL path segment per template.
const TEMPLATES: [(&str, &str, &str); TEMPLATE_COUNT] = [
    (
        "最新信息",
        "关于{}的最新动态与信息汇总，包含近期的新闻报道和官方公告。",
        "news",
    ),
    (
        "百科介绍",
        "{}的详细介绍，涵盖基本概况、历史沿革和相关背景资料。",
        "wiki",
    ),
    (
        "相关报道",
        "媒体对{}的相关报道与深度分析文章合集。",
        "reports",
    ),
    (
        "官方网站",
        "{}官方网站入口，提供权威的第一手信息与服务。",
        "portal",
    ),
    (
        "常见问题",
        "关于{}的常见问题解答与讨论。",
        "faq",
    ),
];

/// Generate up to `count` synthetic records for `query`.
///
/// At most five distinct templates exist, so the result is
/// `min(count, 5)` records. Deterministic for a given query.
pub fn generate(query: &str, count: usize) -> Vec<SearchRecord> {
    let encoded = urlencoding::encode(query);

    TEMPLATES
        .iter()
        .zip(TEMPLATE_SCORES)
        .take(count)
        .map(|((suffix, summary_tpl, path), score)| SearchRecord {
            title: format!("{query} - {suffix}"),
            url: format!("https://example.com/{path}/{encoded}"),
            summary: summary_tpl.replace("{}", query),
            source: RecordSource::Fallback,
            score,
            synthetic: true,
        })
        .collect()
}
