//! Rate limit decisions and their HTTP rendering.

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;

use crate::ratelimit::RateLimitRecord;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Outcome of consulting a limiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// End of the current window (Unix milliseconds)
    pub reset_at_ms: u64,
    /// Seconds until the window resets, set only when rejected
    pub retry_after: Option<u64>,
}

impl RateLimitDecision {
    /// Decision reflecting a record's current state.
    pub fn from_record(record: &RateLimitRecord, now: u64) -> Self {
        let allowed = !record.is_exceeded();
        let reset_at_ms = record.reset_at();
        let retry_after = if allowed {
            None
        } else {
            Some(reset_at_ms.saturating_sub(now).div_ceil(1000).max(1))
        };

        Self {
            allowed,
            limit: record.limit,
            remaining: record.remaining(),
            reset_at_ms,
            retry_after,
        }
    }

    /// Permissive decision used when the limiter itself failed.
    pub fn fail_open(limit: u32, window_ms: u64, now: u64) -> Self {
        Self {
            allowed: true,
            limit,
            remaining: limit,
            reset_at_ms: now.saturating_add(window_ms),
            retry_after: None,
        }
    }

    /// Window reset time as RFC 3339 / ISO-8601.
    pub fn reset_at_iso(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.reset_at_ms as i64)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Adds limit, remaining and reset headers (plus `Retry-After` when rejected).
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(self.remaining));
        if let Ok(reset) = HeaderValue::from_str(&self.reset_at_iso()) {
            headers.insert(X_RATELIMIT_RESET, reset);
        }
        if let Some(retry_after) = self.retry_after {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }
    }

    /// 429 response for a rejected caller.
    pub fn rejection(&self) -> Response {
        let retry_after = self.retry_after.unwrap_or(1);
        let body = Json(json!({
            "error": format!("Rate limit exceeded, retry in {} seconds", retry_after),
            "retry_after": retry_after,
        }));

        let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        self.apply_headers(response.headers_mut());
        response
    }
}
