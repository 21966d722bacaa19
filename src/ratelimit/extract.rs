//! Caller key extraction
//!
//! Identifies who is spending a rate-limit budget. The default extractor falls
//! back from session id, to the authorization header, to the forwarded client
//! address, to a shared `unknown` bucket.

use std::sync::Arc;

use axum::http::{header, HeaderMap};

/// Derives a caller key from request headers. `None` signals a fault.
pub type KeyExtractor = Arc<dyn Fn(&HeaderMap) -> Option<String> + Send + Sync>;

/// Header carrying the session id for API clients.
pub const SESSION_HEADER: &str = "x-session-id";
/// Cookie carrying the session id for browser clients.
pub const SESSION_COOKIE: &str = "session_id";
/// Number of leading `Authorization` characters used as the key.
pub const AUTH_PREFIX_LEN: usize = 16;
/// Key shared by callers that cannot be identified.
pub const UNKNOWN_CALLER: &str = "unknown";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    if let Some(id) = header_str(headers, SESSION_HEADER) {
        return Some(id);
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

/// Default extractor: `session:<id>`, `auth:<prefix>`, `ip:<addr>` or `unknown`.
pub fn default_caller_key(headers: &HeaderMap) -> Option<String> {
    if let Some(id) = session_id(headers) {
        return Some(format!("session:{}", id));
    }

    if let Some(auth) = header_str(headers, header::AUTHORIZATION.as_str()) {
        let prefix: String = auth.chars().take(AUTH_PREFIX_LEN).collect();
        return Some(format!("auth:{}", prefix));
    }

    if let Some(ip) = header_str(headers, "x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return Some(format!("ip:{}", ip));
    }

    Some(UNKNOWN_CALLER.to_string())
}
