//! Tax API route handlers

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Datelike;

use crate::error::{ApiJson, EntityId, Result};
use crate::AppState;

use super::calculators::{calculate_taxes, TaxInput};
use super::requests::{AnnualSummaryQuery, CalculateTaxesRequest};
use super::responses::{AnnualSummaryResponse, TaxBreakdownResponse};
use super::services;

/// Tax routes, mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/taxes/calculate", post(calculate))
        .route("/taxes/annual", get(annual))
        .route("/payments/:id/taxes", get(payment_taxes))
}

/// POST /api/taxes/calculate
async fn calculate(ApiJson(req): ApiJson<CalculateTaxesRequest>) -> Json<TaxBreakdownResponse> {
    let breakdown = calculate_taxes(&TaxInput::from(req));
    Json(breakdown.into())
}

/// GET /api/payments/:id/taxes
async fn payment_taxes(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<TaxBreakdownResponse>> {
    let breakdown = services::payment_taxes(&state.db, id).await?;
    Ok(Json(breakdown.into()))
}

/// GET /api/taxes/annual?year=YYYY
async fn annual(
    State(state): State<AppState>,
    Query(query): Query<AnnualSummaryQuery>,
) -> Result<Json<AnnualSummaryResponse>> {
    let year = query.year.unwrap_or_else(|| crate::today().year());
    tracing::debug!("Annual summary requested for {}", year);

    let summary = services::annual_summary(&state.db, year).await?;
    Ok(Json(summary.into()))
}
