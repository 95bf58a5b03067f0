//! HTTP request handlers.
//!
//! - `ndvi`: point and zonal NDVI statistics
//! - `health`: liveness, Prometheus and JSON metrics
//! - `cache`: response cache inspection and clearing

pub mod cache;
pub mod health;
pub mod ndvi;

pub use cache::{cache_clear_handler, cache_stats_handler};
pub use health::{api_metrics_handler, health_handler, metrics_handler};
pub use ndvi::{point_ndvi_handler, zonal_ndvi_handler, CacheStatus, NdviResponse};
