//! `POST /point-ndvi` and `POST /zonal-ndvi`.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ndvi_common::NdviError;
use ndvi_processor::{BandUrls, SpatialQuery, StatisticsResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::request::{PointRequest, ZonalRequest};
use crate::request_cache::CacheKey;
use crate::state::AppState;

/// Whether a response came from the request cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// Body of every NDVI response, success or error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdviResponse {
    #[serde(flatten)]
    pub result: StatisticsResult,
    pub cache: CacheStatus,
}

/// A parsed request, ready for the cache and the pipeline.
struct Prepared {
    key: CacheKey,
    query: SpatialQuery,
    bands: BandUrls,
}

impl From<PointRequest> for Prepared {
    fn from(request: PointRequest) -> Self {
        Self {
            key: request.cache_key(),
            query: request.query(),
            bands: request.bands,
        }
    }
}

impl From<ZonalRequest> for Prepared {
    fn from(request: ZonalRequest) -> Self {
        Self {
            key: request.cache_key(),
            query: request.query(),
            bands: request.bands,
        }
    }
}

/// POST /point-ndvi
pub async fn point_ndvi_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    state.metrics.record_request("point");

    let prepared = json_body(body).and_then(|body| PointRequest::from_json(&body).map(Prepared::from));
    serve(&state, prepared).await
}

/// POST /zonal-ndvi
pub async fn zonal_ndvi_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    state.metrics.record_request("zonal");

    let prepared = json_body(body).and_then(|body| ZonalRequest::from_json(&body).map(Prepared::from));
    serve(&state, prepared).await
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, NdviError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        warn!(error = %rejection, "Rejected request body");
        NdviError::MissingInput("Missing body".to_string())
    })
}

async fn serve(state: &AppState, prepared: Result<Prepared, NdviError>) -> Response {
    let prepared = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return error_response(state, e),
    };

    if let Some(result) = state.request_cache.get(&prepared.key).await {
        state.metrics.record_cache_hit();
        return success_response(result, CacheStatus::Hit);
    }
    state.metrics.record_cache_miss();

    match compute(state, &prepared).await {
        Ok(result) => {
            if !result.has_statistics() {
                state.metrics.record_empty_result();
            }
            state.request_cache.put(prepared.key, result.clone()).await;
            success_response(result, CacheStatus::Miss)
        }
        Err(e) => error_response(state, e),
    }
}

async fn compute(state: &AppState, prepared: &Prepared) -> Result<StatisticsResult, NdviError> {
    let signed = state.sign(&prepared.bands).await?;

    let start = Instant::now();
    let result = state.pipeline.run(&prepared.query, &signed).await;
    state
        .metrics
        .record_pipeline(prepared.query.kind(), start.elapsed())
        .await;

    result
}

fn success_response(result: StatisticsResult, cache: CacheStatus) -> Response {
    (StatusCode::OK, Json(NdviResponse { result, cache })).into_response()
}

fn error_response(state: &AppState, err: NdviError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::BAD_REQUEST);

    if status.is_server_error() {
        warn!(kind = err.kind(), error = %err, "NDVI request failed upstream");
    } else {
        info!(kind = err.kind(), error = %err, "NDVI request rejected");
    }
    state.metrics.record_failure(err.kind());

    let body = NdviResponse {
        result: StatisticsResult::empty(0.0, err.to_string()),
        cache: CacheStatus::Miss,
    };
    (status, Json(body)).into_response()
}
