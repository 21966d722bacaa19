//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    InvalidateBatchRequest, InvalidateRequest, NewsPage, NewsPageQuery, StreamRequest,
    MAX_PAGE_LIMIT,
};
pub use responses::{ClearResponse, ErrorResponse, HealthResponse, InvalidateResponse, StatsResponse};
