use crate::api::requests::{ApiQuery, InvalidateQuery};
use crate::api::responses::{ApiResponse, HealthResponse};
use crate::state::{ApiResult, AppState};
use axum::extract::{Path, State};
use axum::Json;
use compass::InvalidationReport;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub key_count: u64,
    pub approx_memory_bytes: u64,
    pub hit_rate: f64,
    pub tier2_enabled: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let tier2 = match state.search.cache().tier2_healthy().await {
        Some(true) => "connected",
        Some(false) => "unreachable",
        None => "disabled",
    };
    Json(ApiResponse::ok(HealthResponse { status: "ok", tier2 }))
}

/// GET /api/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> ApiResult<CacheStatsResponse> {
    let stats = state.search.statistics().await;
    state.respond(Ok(CacheStatsResponse {
        hit_rate: stats.hit_rate(),
        hits: stats.hits,
        misses: stats.misses,
        key_count: stats.key_count,
        approx_memory_bytes: stats.approx_memory_bytes,
        tier2_enabled: state.search.cache().has_tier2(),
    }))
}

/// DELETE /api/cache?pattern=
pub async fn invalidate(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<InvalidateQuery>,
) -> ApiResult<InvalidationReport> {
    info!("Cache invalidation requested: pattern={:?}", query.pattern);
    let report = state.search.invalidate(query.pattern.as_deref()).await;
    let message = match &report.pattern {
        Some(pattern) => format!("Invalidated cache entries matching '{}'", pattern),
        None => "Cache cleared".to_string(),
    };
    state
        .respond(Ok(report))
        .map(|Json(body)| Json(body.with_message(message)))
}

/// DELETE /api/cache/hotels/{id}
pub async fn invalidate_hotel(
    State(state): State<AppState>,
    Path(hotel_id): Path<String>,
) -> ApiResult<InvalidationReport> {
    info!("Hotel cache invalidation requested: hotel={}", hotel_id);
    let result = state.search.invalidate_hotel(&hotel_id).await;
    state.respond(result)
}
