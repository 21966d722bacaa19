//! Content domains and the cache patterns they own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache_key;
use crate::error::AppError;

/// A content area whose writes invalidate cached reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    News,
    Polls,
    Radio,
    Media,
}

impl Domain {
    pub const ALL: [Domain; 4] = [Domain::News, Domain::Polls, Domain::Radio, Domain::Media];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::News => "news",
            Domain::Polls => "polls",
            Domain::Radio => "radio",
            Domain::Media => "media",
        }
    }

    /// Patterns removed on every write in this domain.
    ///
    /// Radio also drops the app configuration, which embeds stream URLs, and
    /// media drops the home cards, which embed images.
    pub fn general_patterns(self) -> &'static [&'static str] {
        match self {
            Domain::News => &["mobile:news:*", "news:*"],
            Domain::Polls => &["mobile:polls:*", "polls:*"],
            Domain::Radio => &["mobile:radio:*", "radio:*", "mobile:config:*"],
            Domain::Media => &["mobile:media:*", "media:*", "mobile:cards:*"],
        }
    }

    /// Patterns scoped to one entity of this domain.
    pub fn id_patterns(self, id: &str) -> Vec<String> {
        let name = self.as_str();
        let mut patterns = vec![cache_key!(name, id, "*")];
        if self == Domain::News {
            patterns.push(cache_key!("mobile", "news", "detail", id));
        }
        patterns
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidRequest(format!("unknown domain '{}'", s)))
    }
}
