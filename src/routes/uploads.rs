//! Contract document upload handlers

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::uploads::{self, UploadedFile};
use crate::AppState;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn router(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/uploads", post(upload))
        .route("/uploads/:name", delete(remove))
        .layer(DefaultBodyLimit::max(max_bytes + MULTIPART_OVERHEAD))
}

/// POST /api/uploads
///
/// Expects a multipart body with a `file` field.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadedFile>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Upload inválido: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("documento").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Upload inválido: {}", e)))?;

        let stored = uploads::save(
            &state.config.upload_dir,
            &original_name,
            &bytes,
            state.config.max_upload_bytes,
        )
        .await?;
        return Ok((StatusCode::CREATED, Json(stored)));
    }

    Err(AppError::bad_request("Nenhum arquivo enviado"))
}

/// DELETE /api/uploads/:name
async fn remove(State(state): State<AppState>, Path(name): Path<String>) -> Result<StatusCode> {
    uploads::delete(&state.config.upload_dir, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}
