//! Outbound HTTP identity: rotating headers, cookies, and request pacing.
//!
//! A [`SearchSession`] owns everything that makes consecutive requests
//! look like one browsing human: a cookie jar seeded with the engine's
//! baseline cookie, a User-Agent rotated per request, a randomly varied
//! set of optional headers, and an escalating inter-request delay.
//!
//! Sessions are single-writer. Sharing one across concurrent searches
//! corrupts the pacing accounting; give each parallel search its own.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::cookie::Jar;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::urls::ENGINE_ORIGIN;

/// Realistic browser User-Agent strings, rotated per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/120.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
];

/// Headers sent on every request.
const BASE_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "zh-CN,zh;q=0.9"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Cache-Control", "max-age=0"),
];

/// Optional headers; a random subset is added to vary the fingerprint.
const OPTIONAL_HEADERS: &[(&str, &str)] = &[
    ("Referer", "https://www.baidu.com/"),
    ("DNT", "1"),
    ("Pragma", "no-cache"),
];

/// Baseline cookie the engine expects returning visitors to carry.
const BASELINE_COOKIE: &str = "BDORZ=B490B5EBF6F3CD402E515D22BCDA1598; Domain=.baidu.com; Path=/";

/// Minimum spacing between consecutive requests in one session.
const MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Mutable per-session state: HTTP client, cookies, and pacing counters.
///
/// One instance per sequential run of searches. Batch search reuses a
/// single session so the pacing tiers escalate across keywords.
pub struct SearchSession {
    client: reqwest::Client,
    visit_count: u32,
    last_request: Option<Instant>,
    user_agent: Option<String>,
}

impl SearchSession {
    /// Build a session with a fresh cookie jar and a client configured
    /// from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the client cannot be constructed.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let jar = Jar::default();
        if let Ok(origin) = ENGINE_ORIGIN.parse() {
            jar.add_cookie_str(BASELINE_COOKIE, &origin);
        }

        let client = reqwest::Client::builder()
            .cookie_provider(Arc::new(jar))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            visit_count: 0,
            last_request: None,
            user_agent: config.user_agent.clone(),
        })
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// A freshly randomised header set for the next request.
    ///
    /// Picks a User-Agent from the rotation list (unless the config
    /// pinned one) and a random 0–2 subset of the optional headers.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut rng = rand::thread_rng();

        let ua = match self.user_agent {
            Some(ref custom) => custom.clone(),
            None => USER_AGENTS
                .choose(&mut rng)
                .copied()
                .unwrap_or(USER_AGENTS[0])
                .to_string(),
        };

        let mut headers: Vec<(&'static str, String)> = vec![("User-Agent", ua)];
        headers.extend(
            BASE_HEADERS
                .iter()
                .map(|(name, value)| (*name, (*value).to_string())),
        );

        let extra = rng.gen_range(0..=2);
        headers.extend(
            OPTIONAL_HEADERS
                .choose_multiple(&mut rng, extra)
                .map(|(name, value)| (*name, (*value).to_string())),
        );

        headers
    }

    /// Sleep before the next request.
    ///
    /// The delay window escalates with the visit counter (first visits
    /// are quick, sustained crawling slows down) and is extended when
    /// the previous request was less than [`MIN_INTERVAL`] ago, so two
    /// requests are never closer than that.
    pub async fn pace(&mut self) {
        self.visit_count += 1;

        let (low, high) = match self.visit_count {
            0..=3 => (500, 1500),
            4..=10 => (1000, 3000),
            _ => (3000, 5000),
        };

        let mut delay = Duration::from_millis(rand::thread_rng().gen_range(low..=high));

        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_INTERVAL {
                delay += MIN_INTERVAL - elapsed;
            }
        }

        tracing::trace!(visit = self.visit_count, delay_ms = delay.as_millis() as u64, "pacing");
        tokio::time::sleep(delay).await;
        self.last_request = Some(Instant::now());
    }

    /// Number of paced requests so far.
    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_session_with_default_config() {
        let session = SearchSession::new(&SearchConfig::default());
        assert!(session.is_ok());
    }

    #[test]
    fn headers_include_rotated_user_agent() {
        let session = SearchSession::new(&SearchConfig::default()).expect("session");
        let headers = session.headers();
        let (name, ua) = &headers[0];
        assert_eq!(*name, "User-Agent");
        assert!(USER_AGENTS.contains(&ua.as_str()));
    }

    #[test]
    fn headers_respect_pinned_user_agent() {
        let config = SearchConfig {
            user_agent: Some("CustomBot/1.0".into()),
            ..Default::default()
        };
        let session = SearchSession::new(&config).expect("session");
        assert_eq!(session.headers()[0].1, "CustomBot/1.0");
    }

    #[test]
    fn headers_always_carry_base_set() {
        let session = SearchSession::new(&SearchConfig::default()).expect("session");
        for _ in 0..10 {
            let headers = session.headers();
            for (base_name, _) in BASE_HEADERS {
                assert!(headers.iter().any(|(name, _)| name == base_name));
            }
            // At most the base set plus two optional headers.
            assert!(headers.len() <= 1 + BASE_HEADERS.len() + 2);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pace_increments_visit_counter() {
        let mut session = SearchSession::new(&SearchConfig::default()).expect("session");
        assert_eq!(session.visit_count(), 0);
        session.pace().await;
        session.pace().await;
        assert_eq!(session.visit_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pace_records_last_request() {
        let mut session = SearchSession::new(&SearchConfig::default()).expect("session");
        assert!(session.last_request.is_none());
        session.pace().await;
        assert!(session.last_request.is_some());
    }
}
