//! HTTP stream probe
//!
//! Opens a radio stream with `reqwest`, inspects the status line and headers,
//! and drops the connection without reading the (endless) body.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use tracing::debug;

use super::{ProbeReport, SourceError, StreamMetadata, StreamProbe};

/// Stream probe backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpStreamProbe {
    client: reqwest::Client,
}

impl HttpStreamProbe {
    /// Builds a probe whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("station_cache/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        Ok(Self { client })
    }

    /// Sends the request and rejects non-success statuses.
    async fn open(&self, url: &str) -> Result<reqwest::Response, SourceError> {
        let parsed = reqwest::Url::parse(url).map_err(|_| SourceError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SourceError::InvalidUrl(url.to_string()));
        }

        let response = self
            .client
            .get(parsed)
            .header("Icy-MetaData", "1")
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "stream responded");
        if !status.is_success() {
            return Err(SourceError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Extracts ICY metadata from response headers.
pub(crate) fn metadata_from_headers(url: &str, headers: &HeaderMap) -> StreamMetadata {
    StreamMetadata {
        url: url.to_string(),
        name: header_text(headers, "icy-name"),
        genre: header_text(headers, "icy-genre"),
        description: header_text(headers, "icy-description"),
        bitrate: header_text(headers, "icy-br"),
        content_type: header_text(headers, CONTENT_TYPE.as_str()),
    }
}

#[async_trait]
impl StreamProbe for HttpStreamProbe {
    async fn test_stream(&self, url: &str) -> Result<ProbeReport, SourceError> {
        let started = Instant::now();
        let response = self.open(url).await?;

        Ok(ProbeReport {
            url: url.to_string(),
            status: response.status().as_u16(),
            content_type: header_text(response.headers(), CONTENT_TYPE.as_str()),
            latency_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn fetch_metadata(&self, url: &str) -> Result<StreamMetadata, SourceError> {
        let response = self.open(url).await?;
        Ok(metadata_from_headers(url, response.headers()))
    }
}
