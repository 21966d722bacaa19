//! Error types for the caching layer and its HTTP surface
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::SourceError;

// == App Error Enum ==
/// Unified error type for the cache server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Requested resource does not exist upstream
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalidation pattern could not be turned into a matcher
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Payload could not be serialized for hashing
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A collaborator (content source, stream probe) failed
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound(what) => AppError::NotFound(what),
            SourceError::Unavailable(msg) => AppError::Upstream(msg),
            SourceError::BadStatus { url, status } => {
                AppError::Upstream(format!("{} responded with status {}", url, status))
            }
            SourceError::InvalidUrl(url) => AppError::InvalidRequest(format!("invalid url: {}", url)),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) | AppError::InvalidPattern(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Serialization(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = vec![
            (AppError::NotFound("news 9".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidPattern("".into()), StatusCode::BAD_REQUEST),
            (AppError::Serialization("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Upstream("down".into()), StatusCode::BAD_GATEWAY),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_source_error_conversion() {
        let err: AppError = SourceError::NotFound("news 4".into()).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = SourceError::BadStatus {
            url: "http://stream".into(),
            status: 503,
        }
        .into();
        assert!(matches!(err, AppError::Upstream(msg) if msg.contains("503")));
    }
}
