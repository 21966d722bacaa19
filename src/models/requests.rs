//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming query strings and JSON bodies.

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::invalidation::Domain;

/// Largest page size a client may request.
pub const MAX_PAGE_LIMIT: u32 = 50;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;
const DEFAULT_CATEGORY: &str = "all";

/// Query string of `GET /mobile/news`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsPageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
}

/// Validated paging parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsPage {
    pub page: u32,
    pub limit: u32,
    pub category: String,
}

impl NewsPageQuery {
    /// Applies defaults and validates.
    ///
    /// Categories become a key segment, so they are restricted to
    /// alphanumerics, `-` and `_`.
    pub fn resolve(self) -> Result<NewsPage> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        let category = self
            .category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        if page == 0 {
            return Err(AppError::InvalidRequest("page must be at least 1".to_string()));
        }
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(AppError::InvalidRequest(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        if !category
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(AppError::InvalidRequest(format!("invalid category '{}'", category)));
        }

        Ok(NewsPage {
            page,
            limit,
            category,
        })
    }
}

/// Body of `POST /admin/cache/invalidate`, sent after an admin write commits.
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub domain: String,
    #[serde(default)]
    pub id: Option<String>,
}

impl InvalidateRequest {
    /// Parses the domain and normalises a blank id to `None`.
    pub fn resolve(&self) -> Result<(Domain, Option<String>)> {
        let domain = self.domain.parse::<Domain>()?;
        let id = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        Ok((domain, id))
    }
}

/// Body of `POST /admin/cache/invalidate/batch`.
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateBatchRequest {
    pub entities: Vec<InvalidateRequest>,
}

impl InvalidateBatchRequest {
    pub fn resolve(&self) -> Result<Vec<(Domain, Option<String>)>> {
        if self.entities.is_empty() {
            return Err(AppError::InvalidRequest("entities cannot be empty".to_string()));
        }
        self.entities.iter().map(InvalidateRequest::resolve).collect()
    }
}

/// Body of the stream test and metadata endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamRequest {
    pub url: String,
}

impl StreamRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.url.trim().is_empty() {
            return Some("url cannot be empty".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_query_defaults() {
        let page = NewsPageQuery::default().resolve().unwrap();
        assert_eq!(
            page,
            NewsPage {
                page: 1,
                limit: 10,
                category: "all".to_string()
            }
        );
    }

    #[test]
    fn test_news_query_bounds() {
        let zero_page = NewsPageQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(zero_page.resolve().is_err());

        let huge_limit = NewsPageQuery {
            limit: Some(MAX_PAGE_LIMIT + 1),
            ..Default::default()
        };
        assert!(huge_limit.resolve().is_err());
    }

    #[test]
    fn test_news_query_category_cannot_inject_key_segments() {
        for bad in ["a:b", "music*", "x y"] {
            let query = NewsPageQuery {
                category: Some(bad.to_string()),
                ..Default::default()
            };
            assert!(query.resolve().is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_invalidate_request_deserialize() {
        let req: InvalidateRequest = serde_json::from_str(r#"{"domain":"polls","id":"5"}"#).unwrap();
        assert_eq!(req.resolve().unwrap(), (Domain::Polls, Some("5".to_string())));

        let req: InvalidateRequest = serde_json::from_str(r#"{"domain":"news","id":"  "}"#).unwrap();
        assert_eq!(req.resolve().unwrap(), (Domain::News, None));
    }

    #[test]
    fn test_invalidate_request_unknown_domain() {
        let req: InvalidateRequest = serde_json::from_str(r#"{"domain":"weather"}"#).unwrap();
        assert!(matches!(req.resolve(), Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_batch_cannot_be_empty() {
        let req: InvalidateBatchRequest = serde_json::from_str(r#"{"entities":[]}"#).unwrap();
        assert!(req.resolve().is_err());
    }

    #[test]
    fn test_stream_request_validate() {
        let req = StreamRequest { url: " ".to_string() };
        assert!(req.validate().is_some());
        let req = StreamRequest {
            url: "https://stream.example.org/live".to_string(),
        };
        assert!(req.validate().is_none());
    }
}
