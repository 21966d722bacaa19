//! Cache Key Builder
//!
//! Keys are ordered segments joined with [`KEY_DELIMITER`], following the
//! `domain:resource:discriminator...` convention. Segment order is significant:
//! `news:1:10` and `news:10:1` are different keys.

use std::fmt::Display;

/// Separator placed between key segments.
pub const KEY_DELIMITER: &str = ":";

/// Joins ordered key parts with the key delimiter.
pub fn create_key<I>(parts: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    parts
        .into_iter()
        .map(|part| part.to_string())
        .collect::<Vec<_>>()
        .join(KEY_DELIMITER)
}

/// Builds a cache key from heterogeneous parts (strings, numbers, ids).
///
/// ```
/// use station_cache::cache_key;
/// assert_eq!(cache_key!("mobile", "news", 2, 10, "all"), "mobile:news:2:10:all");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($($part:expr),+ $(,)?) => {
        $crate::cache::create_key([$(&$part as &dyn ::std::fmt::Display),+])
    };
}

// == Mobile API keys ==

/// Paginated news list.
pub fn news_page(page: u32, limit: u32, category: &str) -> String {
    cache_key!("mobile", "news", page, limit, category)
}

/// Single news article.
pub fn news_detail(id: &str) -> String {
    cache_key!("mobile", "news", "detail", id)
}

/// Home screen cards.
pub fn cards() -> String {
    cache_key!("mobile", "cards", "all")
}

/// Application configuration (stream URLs, feature switches).
pub fn app_config() -> String {
    cache_key!("mobile", "config", "app")
}

/// Currently open polls with vote counts.
pub fn active_polls() -> String {
    cache_key!("mobile", "polls", "active")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_key_joins_parts() {
        assert_eq!(create_key(["mobile", "cards", "all"]), "mobile:cards:all");
    }

    #[test]
    fn test_create_key_numbers() {
        assert_eq!(create_key([1u32, 10, 3]), "1:10:3");
    }

    #[test]
    fn test_key_order_is_significant() {
        assert_ne!(cache_key!("news", 1, 10), cache_key!("news", 10, 1));
    }

    #[test]
    fn test_macro_mixes_types() {
        let id = String::from("42");
        assert_eq!(cache_key!("polls", id, "results"), "polls:42:results");
    }

    #[test]
    fn test_resource_keys() {
        assert_eq!(news_page(2, 10, "all"), "mobile:news:2:10:all");
        assert_eq!(news_detail("7"), "mobile:news:detail:7");
        assert_eq!(cards(), "mobile:cards:all");
        assert_eq!(app_config(), "mobile:config:app");
        assert_eq!(active_polls(), "mobile:polls:active");
    }
}
