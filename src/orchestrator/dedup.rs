//! Near-duplicate removal over scored, ranked candidates.
//!
//! Two keys: the normalised URL (exact) and the normalised title
//! (fuzzy). Input arrives score-sorted, so collapsing to the first
//! occurrence always keeps the highest-ranked copy. When strict
//! deduplication starves the result below a minimum, a URL-only
//! relaxation pass is tried before giving up candidates to the fallback
//! generator.

use std::collections::HashSet;

use crate::types::SearchRecord;
use crate::urls::dedupe_key;

/// Character-bag Jaccard similarity above which two titles are the same
/// topic.
const TITLE_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Below this many strict survivors the URL-only relaxation pass runs.
const RELAXATION_THRESHOLD: usize = 5;

/// Deduplicate ranked candidates, keeping at most `max` records.
pub fn dedupe(records: &[SearchRecord], max: usize) -> Vec<SearchRecord> {
    let strict = dedupe_pass(records, max, true);
    if strict.len() >= RELAXATION_THRESHOLD.min(max) {
        return strict;
    }

    let relaxed = dedupe_pass(records, max, false);
    if relaxed.len() > strict.len() {
        tracing::debug!(
            strict = strict.len(),
            relaxed = relaxed.len(),
            "title dedup over-merged; relaxing to URL-only"
        );
        relaxed
    } else {
        strict
    }
}

fn dedupe_pass(records: &[SearchRecord], max: usize, fuzzy_titles: bool) -> Vec<SearchRecord> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_titles: Vec<String> = Vec::new();
    let mut kept = Vec::new();

    for record in records {
        if !seen_urls.insert(dedupe_key(&record.url)) {
            continue;
        }

        let title = normalize_title(&record.title);
        if fuzzy_titles && seen_titles.iter().any(|prior| same_topic(prior, &title)) {
            continue;
        }
        seen_titles.push(title);

        kept.push(record.clone());
        if kept.len() >= max {
            break;
        }
    }

    kept
}

/// Case-folded title with punctuation and whitespace stripped.
fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// True when one normalised title subsumes the other, or their
/// character bags overlap beyond the similarity threshold.
fn same_topic(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a.contains(b) || b.contains(a) {
        return true;
    }

    let chars_a: HashSet<char> = a.chars().collect();
    let chars_b: HashSet<char> = b.chars().collect();
    let intersection = chars_a.intersection(&chars_b).count();
    let union = chars_a.union(&chars_b).count();
    union > 0 && intersection as f64 / union as f64 >= TITLE_SIMILARITY_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, url: &str) -> SearchRecord {
        let mut r = SearchRecord::organic(title, url, "");
        r.score = 50;
        r
    }

    #[test]
    fn exact_url_duplicates_collapse() {
        let records = vec![
            record("第一条", "https://a.example/x"),
            record("另一条", "https://a.example/x?utm=1"),
        ];
        let deduped = dedupe(&records, 10);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].title, "第一条");
    }

    /// Five clearly distinct filler records, enough that the strict
    /// pass is never considered starved.
    fn fillers() -> Vec<SearchRecord> {
        vec![
            record("成都今日天气预报", "https://f1.example/1"),
            record("招聘信息汇总页面", "https://f2.example/2"),
            record("历史文化景点介绍", "https://f3.example/3"),
            record("开源软件下载站点", "https://f4.example/4"),
            record("财经新闻每日要闻", "https://f5.example/5"),
        ]
    }

    #[test]
    fn substring_titles_collapse() {
        let mut records = fillers();
        records.push(record("四川农业大学", "https://a.example/1"));
        records.push(record("四川农业大学 - 官网首页", "https://b.example/2"));
        assert_eq!(dedupe(&records, 10).len(), 6);
    }

    #[test]
    fn similar_character_bags_collapse() {
        let mut records = fillers();
        records.push(record("成都天气预报家查询", "https://a.example/1"));
        records.push(record("查询成都天气预报家", "https://b.example/2"));
        assert_eq!(dedupe(&records, 10).len(), 6);
    }

    #[test]
    fn distinct_topics_survive() {
        let records = vec![
            record("四川农业大学简介", "https://a.example/1"),
            record("成都今日天气预报", "https://b.example/2"),
            record("招聘信息汇总页面", "https://c.example/3"),
        ];
        assert_eq!(dedupe(&records, 10).len(), 3);
    }

    #[test]
    fn first_occurrence_is_kept() {
        let records = vec![
            record("高分标题结果", "https://a.example/1"),
            record("高分标题结果", "https://b.example/2"),
        ];
        let deduped = dedupe(&records, 10);
        assert_eq!(deduped[0].url, "https://a.example/1");
    }

    #[test]
    fn output_is_capped() {
        let records: Vec<SearchRecord> = (0..20)
            .map(|i| {
                record(
                    &format!("完全不同的独立主题编号甲乙丙{i}"),
                    &format!("https://site{i}.example/page"),
                )
            })
            .collect();
        assert!(dedupe(&records, 5).len() <= 5);
    }

    #[test]
    fn relaxation_recovers_over_merged_results() {
        // Six records on distinct URLs whose titles all fuzzily match;
        // strict dedup would leave one, the URL-only pass keeps all six.
        let records: Vec<SearchRecord> = (0..6)
            .map(|i| record("四川农业大学招生信息", &format!("https://site{i}.example/p")))
            .collect();
        let deduped = dedupe(&records, 10);
        assert_eq!(deduped.len(), 6);
    }

    #[test]
    fn strict_result_kept_when_already_sufficient() {
        let mut records: Vec<SearchRecord> = (0..5)
            .map(|i| {
                record(
                    &format!("互不相同主题页面编号{i}"),
                    &format!("https://site{i}.example/p"),
                )
            })
            .collect();
        records.push(record("互不相同主题页面编号0", "https://dup.example/p"));
        let deduped = dedupe(&records, 10);
        assert_eq!(deduped.len(), 5);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(dedupe(&[], 10).is_empty());
    }
}
