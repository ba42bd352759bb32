//! Liveness endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub cache: CacheStats,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        cache: state.cache.stats(),
    })
}
