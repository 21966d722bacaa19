//! Invalidation pattern matching
//!
//! Translates glob patterns into anchored regular expressions. `*` is the
//! only special character and matches any run of characters, including the
//! key delimiter: `mobile:*` matches `mobile:news:1:10:all`.

use regex::Regex;

use crate::error::{AppError, Result};

/// Wildcard character recognised in patterns.
pub const WILDCARD: char = '*';

/// A compiled key pattern.
#[derive(Debug, Clone)]
pub enum KeyPattern {
    /// No wildcard: matches one key by equality
    Exact(String),
    /// Glob translated to an anchored regex
    Glob(Regex),
}

impl KeyPattern {
    /// Compiles a glob pattern.
    ///
    /// Every literal run is regex-escaped, so characters such as `.`, `?` or
    /// `(` in keys are matched literally.
    pub fn compile(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(AppError::InvalidPattern("pattern is empty".to_string()));
        }

        if !pattern.contains(WILDCARD) {
            return Ok(KeyPattern::Exact(pattern.to_string()));
        }

        let body = pattern
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        Regex::new(&format!("^{}$", body))
            .map(KeyPattern::Glob)
            .map_err(|e| AppError::InvalidPattern(format!("{}: {}", pattern, e)))
    }

    /// Tests a key against the pattern.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Exact(exact) => exact == key,
            KeyPattern::Glob(re) => re.is_match(key),
        }
    }
}
