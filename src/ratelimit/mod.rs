//! Rate Limit Module
//!
//! Fixed-window request counting per caller, used in front of endpoints that
//! trigger costly outbound calls (stream connectivity tests, metadata scraping).
//! Independent of the response cache.

mod decision;
mod extract;
mod limiter;
mod record;

pub use decision::{
    RateLimitDecision, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET,
};
pub use extract::{default_caller_key, KeyExtractor, UNKNOWN_CALLER};
pub use limiter::{RateLimitConfig, RateLimiter};
pub use record::{LimitState, RateLimitRecord};
