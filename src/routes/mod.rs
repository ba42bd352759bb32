//! HTTP routes

pub mod auth;
pub mod contracts;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod payments;
pub mod properties;
pub mod uploads;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::finance::amounts::{has_excess_scale, MAX_AMOUNT, MAX_RATE};
use crate::{finance, AppState};

/// Build the application router
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(dashboard::show))
        .merge(properties::router())
        .merge(contracts::router())
        .merge(payments::router())
        .merge(finance::router())
        .merge(export::router())
        .merge(uploads::router(state.config.max_upload_bytes))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ));

    let api = Router::new().nest("/auth", auth::router()).merge(protected);

    let mut app = Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .nest_service(
            crate::uploads::PUBLIC_PREFIX,
            ServeDir::new(&state.config.upload_dir),
        );

    if let Some(dir) = &state.config.static_dir {
        app = app.fallback_service(
            ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html"))),
        );
    }

    let mut app = app
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = state.config.cors_origin.as_deref() {
        match origin.parse::<HeaderValue>() {
            Ok(origin) => {
                app = app.layer(
                    CorsLayer::new()
                        .allow_origin(origin)
                        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                        .allow_headers([header::CONTENT_TYPE])
                        .allow_credentials(true),
                );
            }
            Err(_) => tracing::warn!("Ignoring invalid CORS_ORIGIN: {}", origin),
        }
    }

    app.with_state(state)
}

// ==================== Request validation ====================

/// Collects per-field validation messages for a request body
#[derive(Debug, Default)]
pub(crate) struct FieldErrors {
    details: Vec<String>,
}

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: &str) {
        self.details.push(format!("{}: {}", field, message));
    }

    /// Non-blank text, trimmed
    pub fn required(&mut self, field: &str, value: Option<String>) -> String {
        match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => {
                self.push(field, "campo obrigatório");
                String::new()
            }
        }
    }

    /// Non-negative, at most `max`, at most two decimal places
    fn in_range(&mut self, field: &str, value: Decimal, max: Decimal) -> bool {
        if value < Decimal::ZERO {
            self.push(field, "deve ser maior ou igual a zero");
            false
        } else if value > max {
            self.push(field, &format!("deve ser no máximo {}", max));
            false
        } else if has_excess_scale(value) {
            self.push(field, "use no máximo 2 casas decimais");
            false
        } else {
            true
        }
    }

    pub fn required_amount(&mut self, field: &str, value: Option<Decimal>) -> Decimal {
        match value {
            Some(v) if self.in_range(field, v, MAX_AMOUNT) => v,
            Some(_) => Decimal::ZERO,
            None => {
                self.push(field, "valor numérico obrigatório");
                Decimal::ZERO
            }
        }
    }

    /// Optional amount; present values must fit the money columns
    pub fn optional_amount(&mut self, field: &str, value: Option<Decimal>) -> Option<Decimal> {
        value.filter(|v| self.in_range(field, *v, MAX_AMOUNT))
    }

    /// Optional percentage
    pub fn optional_rate(&mut self, field: &str, value: Option<Decimal>) -> Option<Decimal> {
        value.filter(|v| self.in_range(field, *v, MAX_RATE))
    }

    /// `YYYY-MM-DD`; a datetime suffix is ignored
    pub fn required_date(&mut self, field: &str, value: Option<String>) -> NaiveDate {
        match self.optional_date(field, value.clone()) {
            Some(date) => date,
            None => {
                if value.map_or(true, |v| v.trim().is_empty()) {
                    self.push(field, "campo obrigatório");
                }
                NaiveDate::default()
            }
        }
    }

    pub fn optional_date(&mut self, field: &str, value: Option<String>) -> Option<NaiveDate> {
        let raw = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
        let day = raw.get(..10).unwrap_or(&raw);
        match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.push(field, "data inválida (use AAAA-MM-DD)");
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.details.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation {
                message: "Dados inválidos".to_string(),
                details: self.details,
            })
        }
    }
}

/// Blank optional text becomes `None`
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Referenced ids that are not UUIDs cannot exist
pub(crate) fn parse_reference(value: Option<&str>) -> Option<Uuid> {
    value.and_then(|v| Uuid::parse_str(v.trim()).ok())
}

/// Turn a foreign-key violation into a 409 with the given explanation
pub(crate) fn conflict_on_fk(err: AppError, message: &str, details: String) -> AppError {
    match &err {
        AppError::Database(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            AppError::Conflict {
                message: message.to_string(),
                details,
            }
        }
        _ => err,
    }
}
