//! API Routes
//!
//! Configures the Axum router with all station cache endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    active_polls_handler, app_config_handler, cards_handler, clear_cache_handler, health_handler,
    invalidate_batch_handler, invalidate_handler, news_detail_handler, news_page_handler,
    stats_handler, stream_metadata_handler, stream_test_handler,
};
use super::state::AppState;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mobile = Router::new()
        .route("/news", get(news_page_handler))
        .route("/news/:id", get(news_detail_handler))
        .route("/cards", get(cards_handler))
        .route("/config", get(app_config_handler))
        .route("/polls/active", get(active_polls_handler));

    let admin = Router::new()
        .route("/cache", delete(clear_cache_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .route("/cache/invalidate/batch", post(invalidate_batch_handler))
        .route("/streams/test", post(stream_test_handler))
        .route("/streams/metadata", post(stream_metadata_handler));

    Router::new()
        .nest("/mobile", mobile)
        .nest("/admin", admin)
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
