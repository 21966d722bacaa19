//! Conditional Response Negotiator
//!
//! Decides between `200` and `304 Not Modified` from the client's
//! `If-None-Match` header and the stored content hash, and stamps validator
//! and lifetime headers on the response.

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::cache::CacheEntry;

/// Header reporting whether the body came from the cache.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Result of comparing validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation {
    /// Client copy is current: reply 304 without a body
    NotModified,
    /// Client copy is missing or stale: reply 200 with the payload
    Modified,
}

/// Whether the entry was served from the store or freshly computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

impl CacheOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheOutcome::Hit => "HIT",
            CacheOutcome::Miss => "MISS",
        }
    }
}

/// Strips the weak-validator prefix so `W/"x"` and `"x"` compare equal.
fn opaque_tag(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Compares an `If-None-Match` value against the stored validator.
///
/// Accepts a single tag, a comma-separated list, or `*`. Comparison is weak,
/// as required for `If-None-Match`.
pub fn negotiate(if_none_match: Option<&str>, etag: &str) -> Negotiation {
    let Some(presented) = if_none_match else {
        return Negotiation::Modified;
    };

    let current = opaque_tag(etag);
    let matched = presented
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || opaque_tag(candidate) == current);

    if matched {
        Negotiation::NotModified
    } else {
        Negotiation::Modified
    }
}

/// Reads the `If-None-Match` header, ignoring non-ASCII values.
pub fn if_none_match(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
}

/// Builds the response for a cached entry.
///
/// Both the 200 and 304 forms carry `ETag`, `Cache-Control: public,
/// max-age=<ttl>` and `X-Cache`.
pub fn cached_response<T: Serialize>(
    request_headers: &HeaderMap,
    entry: &CacheEntry<T>,
    outcome: CacheOutcome,
) -> Response {
    let mut response = match negotiate(if_none_match(request_headers), &entry.content_hash) {
        Negotiation::NotModified => StatusCode::NOT_MODIFIED.into_response(),
        Negotiation::Modified => Json(&entry.data).into_response(),
    };

    let headers = response.headers_mut();
    if let Ok(etag) = HeaderValue::from_str(&entry.content_hash) {
        headers.insert(header::ETAG, etag);
    }
    if let Ok(cache_control) = HeaderValue::from_str(&format!("public, max-age={}", entry.ttl_secs)) {
        headers.insert(header::CACHE_CONTROL, cache_control);
    }
    headers.insert(X_CACHE, HeaderValue::from_static(outcome.as_str()));

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TAG: &str = "\"0123abcd\"";

    #[test]
    fn test_missing_validator_is_modified() {
        assert_eq!(negotiate(None, TAG), Negotiation::Modified);
    }

    #[test]
    fn test_matching_validator_is_not_modified() {
        assert_eq!(negotiate(Some(TAG), TAG), Negotiation::NotModified);
    }

    #[test]
    fn test_stale_validator_is_modified() {
        assert_eq!(negotiate(Some("\"ffff\""), TAG), Negotiation::Modified);
    }

    #[test]
    fn test_list_and_weak_validators() {
        assert_eq!(
            negotiate(Some("\"aaaa\", W/\"0123abcd\""), TAG),
            Negotiation::NotModified
        );
        assert_eq!(negotiate(Some("*"), TAG), Negotiation::NotModified);
    }

    fn entry() -> CacheEntry<serde_json::Value> {
        CacheEntry::new(json!({"ok": true}), TAG.to_string(), 11, 120, 0)
    }

    #[test]
    fn test_cached_response_full_body() {
        let response = cached_response(&HeaderMap::new(), &entry(), CacheOutcome::Miss);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ETAG], TAG);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "public, max-age=120");
        assert_eq!(response.headers()[X_CACHE], "MISS");
    }

    #[tokio::test]
    async fn test_cached_response_not_modified() {
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static(TAG));

        let response = cached_response(&headers, &entry(), CacheOutcome::Hit);

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers()[header::ETAG], TAG);
        assert_eq!(response.headers()[X_CACHE], "HIT");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}
