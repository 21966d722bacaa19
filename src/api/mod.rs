//! API Module
//!
//! HTTP handlers and routing for the station cache.
//!
//! # Endpoints
//! - `GET /mobile/news`, `/mobile/news/:id`, `/mobile/cards`, `/mobile/config`,
//!   `/mobile/polls/active` - cached reads with ETag negotiation
//! - `POST /admin/cache/invalidate[/batch]` - evict reads after a write
//! - `DELETE /admin/cache`, `GET /admin/cache/stats` - cache administration
//! - `POST /admin/streams/test`, `/admin/streams/metadata` - rate-limited stream tools
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;
mod state;

pub use handlers::*;
pub use routes::create_router;
pub use state::{AppState, METADATA_LIMITER, STREAM_TEST_LIMITER};
