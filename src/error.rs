//! Error handling for the application

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{message}")]
    Validation { message: String, details: Vec<String> },

    #[error("{message}")]
    Conflict { message: String, details: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Single-message validation failure
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Template(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::NotFound(msg) => json!({ "error": msg }),
            AppError::Validation { message, details } if details.is_empty() => {
                json!({ "error": message })
            }
            AppError::Validation { message, details } => {
                json!({ "error": message, "details": details })
            }
            AppError::Conflict { message, details } => {
                json!({ "error": message, "details": details })
            }
            AppError::Unauthorized(msg) => json!({ "error": msg }),
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {}", msg);
                json!({ "error": msg })
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                json!({ "error": "Erro no banco de dados" })
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {}", e);
                json!({ "error": "Erro ao gerar documento" })
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({ "error": "Erro interno do servidor" })
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// JSON body extractor that reports malformed bodies as 400 validation errors
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::Validation {
        message: "Dados inválidos".to_string(),
        details: vec![rejection.body_text()],
    }
}

/// `:id` path segment; anything that is not a UUID cannot name a row and yields 404
#[derive(Debug, Clone, Copy)]
pub struct EntityId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound("Registro não encontrado"))?;

        Uuid::parse_str(&raw)
            .map(EntityId)
            .map_err(|_| AppError::NotFound("Registro não encontrado"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Conflict {
                message: "x".into(),
                details: "y".into()
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response = AppError::Internal("secret detail".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("secret detail"));
    }

    #[tokio::test]
    async fn test_conflict_body_has_details() {
        let response = AppError::Conflict {
            message: "Não é possível excluir".into(),
            details: "2 contrato(s) encontrado(s)".into(),
        }
        .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["details"], "2 contrato(s) encontrado(s)");
    }
}
