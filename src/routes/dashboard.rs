//! Dashboard route handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::cache::AppCache;
use crate::db;
use crate::error::Result;
use crate::models::DashboardMetrics;
use crate::AppState;

/// GET /api/dashboard
///
/// Metrics computed across a concurrent write are returned but not cached.
pub async fn show(State(state): State<AppState>) -> Result<Json<DashboardMetrics>> {
    let today = crate::today();
    let key = AppCache::dashboard_key(today);

    // Try cache first
    if let Some(cached) = state.cache.dashboard.get(&key).await {
        tracing::debug!("Cache HIT for dashboard: {}", key);
        return Ok(Json((*cached).clone()));
    }

    tracing::debug!("Cache MISS for dashboard: {}", key);
    let generation = state.cache.dashboard_generation();
    let properties = db::list_properties(&state.db).await?;
    let contracts = db::list_contracts(&state.db).await?;
    let payments = db::list_payments(&state.db).await?;

    let metrics = DashboardMetrics::build(&properties, &contracts, &payments, today);
    state
        .cache
        .store_dashboard(key, Arc::new(metrics.clone()), generation)
        .await;

    Ok(Json(metrics))
}
