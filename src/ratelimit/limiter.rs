//! Fixed-window Rate Limiter
//!
//! `check` never consumes budget; only `on_success` does. A failed upstream
//! call therefore costs the caller nothing and can be retried.
//!
//! Internal faults (no caller key, poisoned record table) fail open: the
//! request is allowed and a warning is logged.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::HeaderMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cache::current_timestamp_ms;
use crate::ratelimit::{
    default_caller_key, KeyExtractor, LimitState, RateLimitDecision, RateLimitRecord,
};

/// Budget of one limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitConfig {
    /// Successful operations allowed per window
    pub limit: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
}

impl RateLimitConfig {
    pub fn new(limit: u32, window_ms: u64) -> Self {
        Self { limit, window_ms }
    }
}

/// Per-caller fixed-window limiter.
pub struct RateLimiter {
    name: String,
    config: RateLimitConfig,
    extractor: KeyExtractor,
    records: Mutex<HashMap<String, RateLimitRecord>>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    /// Creates a limiter using the default caller key extractor.
    pub fn new(name: impl Into<String>, config: RateLimitConfig) -> Self {
        Self {
            name: name.into(),
            config,
            extractor: Arc::new(default_caller_key),
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the caller key extractor.
    pub fn with_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&HeaderMap) -> Option<String> + Send + Sync + 'static,
    {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    fn fail_open(&self, now: u64) -> RateLimitDecision {
        RateLimitDecision::fail_open(self.config.limit, self.config.window_ms, now)
    }

    /// Locks the record table, or `None` if a panic poisoned it.
    ///
    /// The poison flag is cleared so only the current request fails open.
    fn records(&self) -> Option<MutexGuard<'_, HashMap<String, RateLimitRecord>>> {
        match self.records.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!(limiter = %self.name, "rate limit table poisoned, failing open");
                self.records.clear_poison();
                None
            }
        }
    }

    fn caller_key(&self, headers: &HeaderMap) -> Option<String> {
        let key = (self.extractor)(headers);
        if key.is_none() {
            warn!(limiter = %self.name, "could not derive caller key, failing open");
        }
        key
    }

    // == Check ==
    /// Reports whether the caller still has budget. Does not consume any.
    pub fn check(&self, headers: &HeaderMap) -> RateLimitDecision {
        self.check_at(headers, current_timestamp_ms())
    }

    pub fn check_at(&self, headers: &HeaderMap, now: u64) -> RateLimitDecision {
        match self.caller_key(headers) {
            Some(key) => self.check_key_at(&key, now),
            None => self.fail_open(now),
        }
    }

    /// Checks an already-derived caller key.
    pub fn check_key_at(&self, key: &str, now: u64) -> RateLimitDecision {
        let Some(mut records) = self.records() else {
            return self.fail_open(now);
        };

        let record = records.entry(key.to_string()).or_insert_with(|| {
            RateLimitRecord::new(key, self.config.limit, self.config.window_ms, now)
        });
        if record.roll_window_at(now) {
            debug!(limiter = %self.name, key, "rate limit window reset");
        }

        let decision = RateLimitDecision::from_record(record, now);
        if !decision.allowed {
            warn!(
                limiter = %self.name,
                key,
                retry_after = decision.retry_after.unwrap_or_default(),
                "rate limit exceeded"
            );
        }
        decision
    }

    // == On Success ==
    /// Consumes one unit of the caller's budget after a successful operation.
    ///
    /// Returns the updated decision so responses can report the new remaining count.
    pub fn on_success(&self, headers: &HeaderMap) -> RateLimitDecision {
        self.on_success_at(headers, current_timestamp_ms())
    }

    pub fn on_success_at(&self, headers: &HeaderMap, now: u64) -> RateLimitDecision {
        match self.caller_key(headers) {
            Some(key) => self.record_success_at(&key, now),
            None => self.fail_open(now),
        }
    }

    pub fn record_success_at(&self, key: &str, now: u64) -> RateLimitDecision {
        let Some(mut records) = self.records() else {
            return self.fail_open(now);
        };

        let record = records.entry(key.to_string()).or_insert_with(|| {
            RateLimitRecord::new(key, self.config.limit, self.config.window_ms, now)
        });
        record.roll_window_at(now);
        record.increment();

        RateLimitDecision::from_record(record, now)
    }

    // == Introspection ==
    pub fn state_at(&self, key: &str, now: u64) -> LimitState {
        self.records()
            .and_then(|records| records.get(key).map(|r| r.state_at(now)))
            .unwrap_or(LimitState::NotTracked)
    }

    pub fn record(&self, key: &str) -> Option<RateLimitRecord> {
        self.records().and_then(|records| records.get(key).cloned())
    }

    /// Number of tracked caller keys.
    pub fn tracked(&self) -> usize {
        self.records().map_or(0, |records| records.len())
    }

    // == Maintenance ==
    /// Forgets records whose window has elapsed. Returns the number dropped.
    pub fn prune_expired_at(&self, now: u64) -> usize {
        let Some(mut records) = self.records() else {
            return 0;
        };
        let before = records.len();
        records.retain(|_, record| !record.window_elapsed_at(now));
        before - records.len()
    }

    pub fn clear(&self) {
        if let Some(mut records) = self.records() {
            records.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const T0: u64 = 1_700_000_000_000;

    fn limiter() -> RateLimiter {
        RateLimiter::new("stream-test", RateLimitConfig::new(10, 60_000))
    }

    fn caller(ip: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(ip));
        headers
    }

    #[test]
    fn test_check_does_not_consume() {
        let limiter = limiter();
        let headers = caller("10.0.0.1");
        for _ in 0..50 {
            assert!(limiter.check_at(&headers, T0).allowed);
        }
        assert_eq!(limiter.record("ip:10.0.0.1").unwrap().count, 0);
    }

    #[test]
    fn test_eleventh_request_rejected() {
        let limiter = limiter();
        let headers = caller("10.0.0.1");

        for i in 0..10 {
            let decision = limiter.check_at(&headers, T0 + i);
            assert!(decision.allowed, "request {} should pass", i + 1);
            limiter.on_success_at(&headers, T0 + i);
        }

        let decision = limiter.check_at(&headers, T0 + 10);
        assert!(!decision.allowed);
        assert!(decision.retry_after.unwrap() > 0);
        assert_eq!(decision.remaining, 0);
        assert_eq!(limiter.state_at("ip:10.0.0.1", T0 + 10), LimitState::LimitExceeded);
    }

    #[test]
    fn test_window_elapse_resets_counter() {
        let limiter = limiter();
        let headers = caller("10.0.0.1");
        for _ in 0..10 {
            limiter.on_success_at(&headers, T0);
        }
        assert!(!limiter.check_at(&headers, T0 + 59_999).allowed);

        let decision = limiter.check_at(&headers, T0 + 60_000);
        assert!(decision.allowed);
        assert_eq!(limiter.record("ip:10.0.0.1").unwrap().count, 0);
        assert_eq!(decision.remaining, 10);
    }

    #[test]
    fn test_count_never_exceeds_limit() {
        let limiter = limiter();
        for _ in 0..25 {
            limiter.record_success_at("session:x", T0);
        }
        assert_eq!(limiter.record("session:x").unwrap().count, 10);
    }

    #[test]
    fn test_callers_are_independent() {
        let limiter = limiter();
        for _ in 0..10 {
            limiter.on_success_at(&caller("10.0.0.1"), T0);
        }
        assert!(!limiter.check_at(&caller("10.0.0.1"), T0).allowed);
        assert!(limiter.check_at(&caller("10.0.0.2"), T0).allowed);
    }

    #[test]
    fn test_untracked_state() {
        assert_eq!(limiter().state_at("ip:1.1.1.1", T0), LimitState::NotTracked);
    }

    #[test]
    fn test_extractor_fault_fails_open() {
        let limiter = limiter().with_extractor(|_| None);
        let decision = limiter.check_at(&HeaderMap::new(), T0);
        assert!(decision.allowed);
        assert_eq!(limiter.tracked(), 0);
    }

    #[test]
    fn test_poisoned_table_fails_open_then_recovers() {
        let limiter = Arc::new(limiter());
        for _ in 0..10 {
            limiter.record_success_at("k", T0);
        }

        let poisoner = limiter.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.records.lock().unwrap();
            panic!("poison the table");
        })
        .join();

        assert!(limiter.check_key_at("k", T0).allowed, "fault must fail open");
        assert!(!limiter.check_key_at("k", T0).allowed, "table recovers afterwards");
    }

    #[test]
    fn test_prune_expired() {
        let limiter = limiter();
        limiter.check_key_at("old", T0);
        limiter.check_key_at("new", T0 + 30_000);

        assert_eq!(limiter.prune_expired_at(T0 + 60_000), 1);
        assert_eq!(limiter.tracked(), 1);
        assert_eq!(limiter.state_at("old", T0 + 60_000), LimitState::NotTracked);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Within one window, exactly `limit` successes are admitted no
            // matter how many checks are interleaved.
            #[test]
            fn prop_window_admits_exactly_limit(
                limit in 1u32..20,
                attempts in 1usize..60,
                offsets in prop::collection::vec(0u64..59_999, 60),
            ) {
                let limiter = RateLimiter::new("prop", RateLimitConfig::new(limit, 60_000));
                let mut admitted = 0u32;

                for offset in offsets.iter().take(attempts) {
                    if limiter.check_key_at("k", T0 + offset).allowed {
                        limiter.record_success_at("k", T0 + offset);
                        admitted += 1;
                    }
                }

                prop_assert_eq!(admitted, limit.min(attempts as u32));
                prop_assert!(limiter.record("k").unwrap().count <= limit);
            }

            // A rejected caller always gets a positive retry hint no later than the window.
            #[test]
            fn prop_retry_after_within_window(limit in 1u32..10, elapsed in 0u64..60_000) {
                let limiter = RateLimiter::new("prop", RateLimitConfig::new(limit, 60_000));
                for _ in 0..limit {
                    limiter.record_success_at("k", T0);
                }

                let decision = limiter.check_key_at("k", T0 + elapsed);
                prop_assert!(!decision.allowed);
                let retry_after = decision.retry_after.unwrap();
                prop_assert!((1..=60).contains(&retry_after));
            }
        }
    }
}
