//! API Handlers
//!
//! HTTP request handlers for the mobile read surface, the cache admin
//! endpoints and the rate-limited stream tools.

use std::future::Future;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::state::AppState;
use crate::cache::{cached_response, keys, CacheOutcome};
use crate::error::{AppError, Result};
use crate::models::{
    ClearResponse, HealthResponse, InvalidateBatchRequest, InvalidateRequest, InvalidateResponse,
    NewsPageQuery, StatsResponse, StreamRequest,
};
use crate::ratelimit::RateLimiter;
use crate::services::SourceError;

// == Cached reads ==

/// Serves `key` from the cache, computing and storing it on a miss.
///
/// Concurrent misses for the same key wait on one computation. Failed
/// computations are returned to the caller and leave the cache untouched.
pub async fn serve_cached<F, Fut>(
    state: &AppState,
    headers: &HeaderMap,
    key: String,
    ttl_secs: u64,
    compute: F,
) -> Result<Response>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let hit = state.cache.write().await.get(&key);
    if let Some(entry) = hit {
        return Ok(cached_response(headers, &entry, CacheOutcome::Hit));
    }

    let _flight = state.flights.acquire(&key).await;

    // Filled by the computation we just waited on.
    let filled = state.cache.write().await.peek(&key);
    if let Some(entry) = filled {
        return Ok(cached_response(headers, &entry, CacheOutcome::Hit));
    }

    let value = compute().await?;
    let entry = state.cache.write().await.set(key.as_str(), value, ttl_secs)?;
    debug!(key, ttl_secs, etag = %entry.content_hash, "cache filled");

    Ok(cached_response(headers, &entry, CacheOutcome::Miss))
}

/// Handler for GET /mobile/news
pub async fn news_page_handler(
    State(state): State<AppState>,
    Query(query): Query<NewsPageQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let page = query.resolve()?;
    let key = keys::news_page(page.page, page.limit, &page.category);

    serve_cached(&state, &headers, key, state.ttl.news_page, || async {
        state
            .source
            .news_page(page.page, page.limit, &page.category)
            .await
            .map_err(AppError::from)
    })
    .await
}

/// Handler for GET /mobile/news/:id
///
/// Unknown ids produce a 404 that is not cached.
pub async fn news_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    if id.is_empty()
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::InvalidRequest(format!("invalid news id '{}'", id)));
    }
    let key = keys::news_detail(&id);

    serve_cached(&state, &headers, key, state.ttl.news_detail, || async {
        state.source.news_detail(&id).await.map_err(AppError::from)
    })
    .await
}

/// Handler for GET /mobile/cards
pub async fn cards_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    serve_cached(&state, &headers, keys::cards(), state.ttl.cards, || async {
        state.source.cards().await.map_err(AppError::from)
    })
    .await
}

/// Handler for GET /mobile/config
///
/// Combines the application config with the memoized radio config.
pub async fn app_config_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    serve_cached(&state, &headers, keys::app_config(), state.ttl.app_config, || async {
        let app = state.source.app_config().await?;
        let radio = state.radio.get_or_load(state.source.as_ref()).await?;
        Ok::<_, AppError>(json!({ "app": app, "radio": radio }))
    })
    .await
}

/// Handler for GET /mobile/polls/active
pub async fn active_polls_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    serve_cached(&state, &headers, keys::active_polls(), state.ttl.polls, || async {
        state.source.active_polls().await.map_err(AppError::from)
    })
    .await
}

// == Cache administration ==

/// Handler for POST /admin/cache/invalidate
///
/// Called after a domain write commits.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    let (domain, id) = req.resolve()?;
    let removed = state
        .router
        .invalidate_entity_cache(domain, id.as_deref())
        .await;

    Ok(Json(InvalidateResponse {
        removed,
        domains: vec![domain],
    }))
}

/// Handler for POST /admin/cache/invalidate/batch
pub async fn invalidate_batch_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateBatchRequest>,
) -> Result<Json<InvalidateResponse>> {
    let entities = req.resolve()?;
    let removed = state.router.invalidate_multiple_entities(&entities).await;

    Ok(Json(InvalidateResponse {
        removed,
        domains: entities.iter().map(|(domain, _)| *domain).collect(),
    }))
}

/// Handler for DELETE /admin/cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = {
        let mut cache = state.cache.write().await;
        let cleared = cache.len();
        cache.clear();
        cleared
    };
    state.radio.clear();
    info!(cleared, "cache cleared");

    Json(ClearResponse { cleared })
}

/// Handler for GET /admin/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.read().await.stats();
    Json(StatsResponse::new(stats, state.flights.pending()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Rate-limited stream tools ==

/// Runs `operation` under `limiter`.
///
/// Rejects before any outbound work when the caller is over budget. Only a
/// successful operation consumes budget.
async fn rate_limited<T, F, Fut>(
    limiter: &RateLimiter,
    headers: &HeaderMap,
    operation: F,
) -> Response
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, SourceError>>,
{
    let decision = limiter.check(headers);
    if !decision.allowed {
        return decision.rejection();
    }

    match operation().await {
        Ok(body) => {
            let decision = limiter.on_success(headers);
            let mut response = Json(body).into_response();
            decision.apply_headers(response.headers_mut());
            response
        }
        Err(err) => {
            debug!(limiter = limiter.name(), error = %err, "operation failed, budget untouched");
            let mut response = AppError::from(err).into_response();
            decision.apply_headers(response.headers_mut());
            response
        }
    }
}

/// Handler for POST /admin/streams/test
pub async fn stream_test_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<StreamRequest>,
) -> Response {
    if let Some(error_msg) = req.validate() {
        return AppError::InvalidRequest(error_msg).into_response();
    }
    let url = req.url.trim();

    rate_limited(&state.stream_limiter, &headers, || state.probe.test_stream(url)).await
}

/// Handler for POST /admin/streams/metadata
pub async fn stream_metadata_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<StreamRequest>,
) -> Response {
    if let Some(error_msg) = req.validate() {
        return AppError::InvalidRequest(error_msg).into_response();
    }
    let url = req.url.trim();

    rate_limited(&state.metadata_limiter, &headers, || state.probe.fetch_metadata(url)).await
}
