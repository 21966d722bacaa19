//! Collaborator seams
//!
//! The caching layer only needs two things from the rest of the CMS: something
//! that computes the payloads it caches, and something that performs the
//! expensive outbound stream checks it rate-limits. Both are traits so the
//! HTTP surface can run against in-memory data in tests.

mod memory;
mod probe;
mod radio;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use memory::{Card, InMemoryContent, NewsItem, Poll, PollOption};
pub use probe::HttpStreamProbe;
pub use radio::RadioConfigCache;

/// Failure reported by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("{url} responded with status {status}")]
    BadStatus { url: String, status: u16 },

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Computes the payloads served by the mobile API.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// One page of news, optionally filtered by category (`all` for none).
    async fn news_page(&self, page: u32, limit: u32, category: &str) -> Result<Value, SourceError>;

    async fn news_detail(&self, id: &str) -> Result<Value, SourceError>;

    async fn cards(&self) -> Result<Value, SourceError>;

    async fn app_config(&self) -> Result<Value, SourceError>;

    async fn active_polls(&self) -> Result<Value, SourceError>;

    /// Stream endpoints and station identity.
    async fn radio_config(&self) -> Result<Value, SourceError>;
}

/// Outcome of a stream connectivity test.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProbeReport {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub latency_ms: u64,
}

/// Metadata advertised by a stream through its ICY headers.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StreamMetadata {
    pub url: String,
    pub name: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub bitrate: Option<String>,
    pub content_type: Option<String>,
}

/// Performs outbound requests against radio streams.
#[async_trait]
pub trait StreamProbe: Send + Sync {
    /// Opens the stream and reports whether it answers with a success status.
    async fn test_stream(&self, url: &str) -> Result<ProbeReport, SourceError>;

    /// Reads the stream's advertised metadata.
    async fn fetch_metadata(&self, url: &str) -> Result<StreamMetadata, SourceError>;
}
