//! LeafSense NDVI API service library.
//!
//! Exposes the router and its building blocks so integration tests can
//! drive the service without binding a socket.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod request;
pub mod request_cache;
pub mod state;
pub mod token_cache;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the service router with its middleware stack.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // NDVI statistics
        .route("/point-ndvi", post(handlers::point_ndvi_handler))
        .route("/zonal-ndvi", post(handlers::zonal_ndvi_handler))
        // Response cache
        .route("/cache/stats", get(handlers::cache_stats_handler))
        .route("/cache", delete(handlers::cache_clear_handler))
        // Health and metrics
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/metrics", get(handlers::api_metrics_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
