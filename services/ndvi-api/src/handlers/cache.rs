//! Response cache management handlers.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde::Serialize;
use tracing::{info, instrument};

use crate::request_cache::CacheSnapshot;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CacheClearResponse {
    pub cleared: usize,
}

/// GET /cache/stats
pub async fn cache_stats_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<CacheSnapshot> {
    Json(state.request_cache.snapshot().await)
}

/// DELETE /cache - Drop every cached response
#[instrument(skip(state))]
pub async fn cache_clear_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<CacheClearResponse> {
    info!("Clearing response cache");
    let cleared = state.request_cache.clear().await;
    Json(CacheClearResponse { cleared })
}
