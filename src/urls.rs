//! URL cleaning, redirect recovery, and host classification.
//!
//! Extracted hrefs arrive mangled: control characters, trailing
//! punctuation, several URLs glued together, site-relative paths, and
//! the engine's own `/link?url=` redirect wrappers. [`clean_url`]
//! canonicalises all of that into a single absolute URL or rejects the
//! candidate. [`is_host_internal`] separates the engine's navigation and
//! asset links from its content verticals, which carry real results.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Origin used to resolve protocol-relative and site-relative hrefs.
pub const ENGINE_ORIGIN: &str = "https://www.baidu.com";

/// Anything longer than this is dropped as extraction garbage.
const MAX_URL_LEN: usize = 2048;

/// Engine-owned hosts that carry real content and must be retained.
const CONTENT_HOSTS: &[&str] = &[
    "baike.baidu.com",
    "zhidao.baidu.com",
    "tieba.baidu.com",
    "wenku.baidu.com",
    "map.baidu.com",
    "image.baidu.com",
    "video.baidu.com",
    "news.baidu.com",
    "music.baidu.com",
    "xueshu.baidu.com",
];

/// Static-asset hosts, always internal.
const ASSET_HOSTS: &[&str] = &["bdstatic.com", "baidustatic.com"];

fn embedded_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"https?://[^\s"'<>]+"#).expect("embedded URL regex"))
}

/// Normalise a raw extracted href into one absolute `http`/`https` URL.
///
/// Returns `None` on any unrecoverable case; the caller drops the
/// candidate. Idempotent: feeding the output back in returns it
/// unchanged.
pub fn clean_url(raw: &str) -> Option<String> {
    // Strip control/invisible characters and surrounding whitespace.
    let printable: String = raw.chars().filter(|c| !c.is_control()).collect();
    let mut url = printable.trim().to_string();

    // Trailing punctuation glued on by the markup.
    url = url
        .trim_end_matches([',', '.', '?', '!', ';', ':'])
        .to_string();

    if url.is_empty() {
        return None;
    }

    let lower = url.to_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("data:") {
        return None;
    }

    // Malformed extractions glue several absolute URLs together; keep
    // only the first complete one.
    let positions: Vec<usize> = ["http://", "https://"]
        .iter()
        .flat_map(|scheme| url.match_indices(scheme).map(|(i, _)| i))
        .collect();
    if positions.len() > 1 {
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        // A second scheme after a `?` is a URL carried in the first
        // URL's own query, not a glued artifact; leave it intact.
        if !url[sorted[0]..sorted[1]].contains('?') {
            url = url[sorted[0]..sorted[1]].to_string();
        }
    }

    // Embedded whitespace: keep the first URL-shaped run.
    if url.contains(' ') {
        url = match embedded_url_re().find(&url) {
            Some(m) => m.as_str().to_string(),
            None => url.split_whitespace().next()?.to_string(),
        };
    }

    let absolute = if url.starts_with("http://") || url.starts_with("https://") {
        url
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else if url.starts_with('/') {
        format!("{ENGINE_ORIGIN}{url}")
    } else if url.contains("baidu.com/link?") {
        format!("http://{url}")
    } else {
        // Last resort: an absolute URL buried mid-string.
        embedded_url_re().find(&url)?.as_str().to_string()
    };

    if absolute.len() > MAX_URL_LEN {
        return None;
    }

    let parsed = Url::parse(&absolute).ok()?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return None;
    }

    Some(recover_redirect(&parsed).unwrap_or(absolute))
}

/// Recover the wrapped destination from an engine redirect link.
///
/// `baidu.com/link?url=…` tracking links carry the real target in the
/// `url` query parameter. Returns `None` when this is not a redirect
/// link or the parameter is missing/unusable, in which case the wrapper
/// itself is kept.
fn recover_redirect(parsed: &Url) -> Option<String> {
    let host = parsed.host_str()?.to_lowercase();
    if !(host == "baidu.com" || host.ends_with(".baidu.com")) || parsed.path() != "/link" {
        return None;
    }

    let target = parsed
        .query_pairs()
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())?;

    let candidate = Url::parse(&target).ok()?;
    if (candidate.scheme() == "http" || candidate.scheme() == "https")
        && candidate.host_str().is_some_and(|h| !h.is_empty())
    {
        Some(target)
    } else {
        None
    }
}

/// Classify a URL as engine-internal noise (navigation, static assets,
/// the results page itself) versus a retainable result link.
///
/// Engine-owned content verticals (encyclopedia, Q&A, forums, document
/// library, maps, images, video, news, music, academic search) are not
/// internal. Unparseable URLs are treated as internal and dropped.
pub fn is_host_internal(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return true;
    };
    let Some(host) = parsed.host_str() else {
        return true;
    };
    let host = host.to_lowercase();

    if ASSET_HOSTS
        .iter()
        .any(|asset| host == *asset || host.ends_with(&format!(".{asset}")))
    {
        return true;
    }

    if host == "baidu.com" || host.ends_with(".baidu.com") {
        if CONTENT_HOSTS.contains(&host.as_str()) {
            return false;
        }
        // Redirect wrappers whose target could not be recovered still
        // point at real results.
        if parsed.path().starts_with("/link") {
            return false;
        }
        return true;
    }

    false
}

/// Deduplication key: scheme + host + path, query and fragment stripped.
pub fn dedupe_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default().to_lowercase();
            format!("{}://{}{}", parsed.scheme(), host, parsed.path())
        }
        Err(_) => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_plain_absolute_url() {
        assert_eq!(
            clean_url("https://www.sicau.edu.cn/page"),
            Some("https://www.sicau.edu.cn/page".to_string())
        );
    }

    #[test]
    fn strips_whitespace_and_trailing_punctuation() {
        assert_eq!(
            clean_url("  https://example.com/a, "),
            Some("https://example.com/a".to_string())
        );
        assert_eq!(
            clean_url("https://example.com/a?!"),
            Some("https://example.com/a".to_string())
        );
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(
            clean_url("https://exam\nple.com/a\t"),
            Some("https://example.com/a".to_string())
        );
    }

    #[test]
    fn keeps_first_of_glued_urls() {
        assert_eq!(
            clean_url("https://a.example/xhttps://b.example/y"),
            Some("https://a.example/x".to_string())
        );
    }

    #[test]
    fn keeps_url_embedded_in_query() {
        let url = "https://a.example/x?next=https://b.example/y";
        assert_eq!(clean_url(url), Some(url.to_string()));
    }

    #[test]
    fn recovered_target_with_embedded_url_is_stable() {
        let wrapped =
            "https://www.baidu.com/link?url=https%3A%2F%2Fa.example%2Fx%3Fnext%3Dhttps%3A%2F%2Fb.example%2Fy";
        let once = clean_url(wrapped).expect("first pass");
        assert_eq!(once, "https://a.example/x?next=https://b.example/y");
        assert_eq!(clean_url(&once), Some(once.clone()));
    }

    #[test]
    fn resolves_protocol_relative() {
        assert_eq!(
            clean_url("//example.com/page"),
            Some("https://example.com/page".to_string())
        );
    }

    #[test]
    fn resolves_site_relative() {
        assert_eq!(
            clean_url("/s?wd=test"),
            Some(format!("{ENGINE_ORIGIN}/s?wd=test"))
        );
    }

    #[test]
    fn rejects_pseudo_urls() {
        assert_eq!(clean_url("javascript:void(0)"), None);
        assert_eq!(clean_url("data:text/html,hi"), None);
    }

    #[test]
    fn rejects_oversized_urls() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LEN));
        assert_eq!(clean_url(&long), None);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(clean_url("not a url"), None);
        assert_eq!(clean_url(""), None);
    }

    #[test]
    fn recovers_redirect_target() {
        let wrapped = "https://www.baidu.com/link?url=https%3A%2F%2Fwww.sicau.edu.cn%2F&wd=x";
        assert_eq!(
            clean_url(wrapped),
            Some("https://www.sicau.edu.cn/".to_string())
        );
    }

    #[test]
    fn keeps_wrapper_when_target_missing() {
        let wrapped = "https://www.baidu.com/link?rsv=abc123";
        assert_eq!(clean_url(wrapped), Some(wrapped.to_string()));
    }

    #[test]
    fn schemeless_redirect_link_gains_scheme() {
        let cleaned = clean_url("www.baidu.com/link?rsv=1").expect("should clean");
        assert!(cleaned.starts_with("http://www.baidu.com/link?"));
    }

    #[test]
    fn clean_url_is_idempotent() {
        let inputs = [
            "  https://example.com/a, ",
            "https://a.example/xhttps://b.example/y",
            "//example.com/page",
            "/s?wd=test",
            "https://www.baidu.com/link?url=https%3A%2F%2Fexample.com%2Fz",
            "https://www.baidu.com/link?url=https%3A%2F%2Fa.example%2Fx%3Fnext%3Dhttps%3A%2F%2Fb.example%2Fy",
            "https://www.baidu.com/link?rsv=abc",
        ];
        for input in inputs {
            let once = clean_url(input).expect("first pass");
            let twice = clean_url(&once).expect("second pass");
            assert_eq!(once, twice, "not idempotent for {input}");
        }
    }

    #[test]
    fn search_page_is_internal() {
        assert!(is_host_internal("https://www.baidu.com/s?wd=test"));
        assert!(is_host_internal("https://passport.baidu.com/login"));
        assert!(is_host_internal("https://www.baidu.com/more/"));
    }

    #[test]
    fn asset_hosts_are_internal() {
        assert!(is_host_internal("https://www.bdstatic.com/logo.png"));
        assert!(is_host_internal("https://ss1.baidustatic.com/x.js"));
    }

    #[test]
    fn content_verticals_are_retained() {
        assert!(!is_host_internal("https://baike.baidu.com/item/xyz"));
        assert!(!is_host_internal("https://zhidao.baidu.com/question/1"));
        assert!(!is_host_internal("https://xueshu.baidu.com/paper/2"));
    }

    #[test]
    fn unrecovered_redirect_wrapper_is_retained() {
        assert!(!is_host_internal("https://www.baidu.com/link?rsv=abc"));
    }

    #[test]
    fn external_hosts_are_not_internal() {
        assert!(!is_host_internal("https://www.sicau.edu.cn/"));
        assert!(!is_host_internal("https://example.com/"));
    }

    #[test]
    fn unparseable_url_is_internal() {
        assert!(is_host_internal("::::"));
    }

    #[test]
    fn dedupe_key_strips_query_and_fragment() {
        assert_eq!(
            dedupe_key("https://a.example/x?utm=1#frag"),
            "https://a.example/x"
        );
        assert_eq!(dedupe_key("https://a.example/x"), "https://a.example/x");
    }

    #[test]
    fn dedupe_key_lowercases_host() {
        assert_eq!(
            dedupe_key("https://A.Example/Path"),
            dedupe_key("https://a.example/Path")
        );
    }
}
