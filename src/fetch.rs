//! Fetching and classifying the engine's results page.
//!
//! One GET per call, paced by the session. The response is decoded
//! through an ordered list of charsets (the engine has historically
//! served both utf-8 and gbk) and scanned for anti-automation challenge
//! markers before it is handed to the extractor.

use encoding_rs::{Encoding, GBK, UTF_8};

use crate::session::SearchSession;
use crate::types::{FetchFailure, RawResponse, ResponseKind};

/// Results endpoint; `wd` carries the query, `pn` the result offset.
const SEARCH_ENDPOINT: &str = "https://www.baidu.com/s";

/// Substrings that identify an anti-automation challenge page.
const BLOCK_MARKERS: &[&str] = &["验证码", "安全验证", "antirobot", "wappass.baidu.com"];

/// Fetch one results page for `query`.
///
/// `page` is zero-based; the engine paginates in steps of 10. Transport
/// and HTTP-status failures are folded into the returned
/// [`RawResponse`] — this function never fails outright, the
/// classification is the orchestrator's branch point.
pub async fn fetch_page(session: &SearchSession, query: &str, page: usize) -> RawResponse {
    let offset = (page * 10).to_string();

    let mut request = session
        .client()
        .get(SEARCH_ENDPOINT)
        .query(&[("wd", query), ("pn", offset.as_str())]);
    for (name, value) in session.headers() {
        request = request.header(name, value);
    }

    tracing::trace!(query, page, "fetching results page");

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => {
            tracing::warn!(query, "search request timed out");
            return RawResponse::failed(FetchFailure::Timeout);
        }
        Err(e) => {
            tracing::warn!(query, error = %e, "search request failed");
            return RawResponse::failed(FetchFailure::Network(e.to_string()));
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(query, status = status.as_u16(), "non-success status");
        return RawResponse::failed(FetchFailure::Status(status.as_u16()));
    }

    let declared = declared_charset(&response);
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(query, error = %e, "failed to read response body");
            return RawResponse::failed(FetchFailure::Network(e.to_string()));
        }
    };

    let body = decode_body(&bytes, declared.as_deref());
    tracing::trace!(bytes = bytes.len(), chars = body.len(), "response decoded");

    let kind = if is_blocked(&body) {
        tracing::warn!(query, "anti-automation challenge detected");
        ResponseKind::Blocked
    } else {
        ResponseKind::Ok
    };

    RawResponse {
        status: status.as_u16(),
        body,
        kind,
    }
}

/// Charset label from the Content-Type header, if any.
fn declared_charset(response: &reqwest::Response) -> Option<String> {
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)?
        .to_str()
        .ok()?;
    let (_, after) = content_type.split_once("charset=")?;
    let label = after
        .split(';')
        .next()
        .unwrap_or(after)
        .trim()
        .trim_matches('"');
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// Decode body bytes, trying the declared charset first, then the
/// engine's historical encodings in order. The first clean decode wins;
/// if every attempt reports errors, falls back to lossy utf-8 rather
/// than failing.
pub fn decode_body(bytes: &[u8], declared: Option<&str>) -> String {
    let mut encodings: Vec<&'static Encoding> = Vec::with_capacity(3);
    if let Some(label) = declared {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            encodings.push(encoding);
        }
    }
    for fallback in [UTF_8, GBK] {
        if !encodings.contains(&fallback) {
            encodings.push(fallback);
        }
    }

    for encoding in &encodings {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            return text.into_owned();
        }
    }

    String::from_utf8_lossy(bytes).into_owned()
}

/// True when the decoded markup contains an anti-automation challenge.
pub fn is_blocked(body: &str) -> bool {
    BLOCK_MARKERS.iter().any(|marker| body.contains(marker))
}
