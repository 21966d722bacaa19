//! Rate Limit Record
//!
//! Per-caller fixed-window counter.

use serde::Serialize;

/// Where a caller key stands in its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LimitState {
    /// No record exists for the key
    NotTracked,
    /// Budget remains in the current window
    WithinLimit,
    /// `count == limit` in the current window
    LimitExceeded,
}

/// Counter for one caller key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitRecord {
    pub key: String,
    /// Window start (Unix milliseconds)
    pub window_start: u64,
    /// Successful operations in the current window, never above `limit`
    pub count: u32,
    pub limit: u32,
    pub window_ms: u64,
}

impl RateLimitRecord {
    pub fn new(key: impl Into<String>, limit: u32, window_ms: u64, now: u64) -> Self {
        Self {
            key: key.into(),
            window_start: now,
            count: 0,
            limit,
            window_ms,
        }
    }

    pub fn window_elapsed_at(&self, now: u64) -> bool {
        now.saturating_sub(self.window_start) >= self.window_ms
    }

    /// Starts a new window if the current one has elapsed. Returns true on reset.
    pub fn roll_window_at(&mut self, now: u64) -> bool {
        if self.window_elapsed_at(now) {
            self.window_start = now;
            self.count = 0;
            true
        } else {
            false
        }
    }

    /// End of the current window (Unix milliseconds).
    pub fn reset_at(&self) -> u64 {
        self.window_start.saturating_add(self.window_ms)
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }

    pub fn is_exceeded(&self) -> bool {
        self.count >= self.limit
    }

    /// Counts one success, saturating at `limit`.
    pub fn increment(&mut self) {
        if self.count < self.limit {
            self.count += 1;
        }
    }

    /// State at `now`, treating an elapsed window as already reset.
    pub fn state_at(&self, now: u64) -> LimitState {
        if self.window_elapsed_at(now) || !self.is_exceeded() {
            LimitState::WithinLimit
        } else {
            LimitState::LimitExceeded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_saturates() {
        let mut record = RateLimitRecord::new("ip:1.2.3.4", 2, 1_000, 0);
        record.increment();
        record.increment();
        record.increment();
        assert_eq!(record.count, 2);
        assert!(record.is_exceeded());
        assert_eq!(record.remaining(), 0);
    }

    #[test]
    fn test_window_rolls_exactly_at_boundary() {
        let mut record = RateLimitRecord::new("k", 1, 1_000, 500);
        record.increment();

        assert!(!record.roll_window_at(1_499));
        assert_eq!(record.count, 1);

        assert!(record.roll_window_at(1_500));
        assert_eq!(record.count, 0);
        assert_eq!(record.window_start, 1_500);
        assert_eq!(record.reset_at(), 2_500);
    }

    #[test]
    fn test_state_transitions() {
        let mut record = RateLimitRecord::new("k", 1, 1_000, 0);
        assert_eq!(record.state_at(10), LimitState::WithinLimit);

        record.increment();
        assert_eq!(record.state_at(10), LimitState::LimitExceeded);

        assert_eq!(record.state_at(1_000), LimitState::WithinLimit);
    }
}
