//! Authentication route handlers

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{
    clear_session_cookie, current_session, end_session, hash_password, session_cookie, session_id,
    start_session, verify_password, MIN_PASSWORD_LEN,
};
use crate::db;
use crate::error::{ApiJson, AppError, Result};
use crate::models::UserResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user", get(current_user))
}

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Trimmed username and raw password, both required
    fn into_parts(self) -> Result<(String, String)> {
        let username = self.username.map(|u| u.trim().to_string()).unwrap_or_default();
        let password = self.password.unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::bad_request("Usuário e senha são obrigatórios"));
        }
        Ok((username, password))
    }
}

fn with_session_cookie(state: &AppState, status: StatusCode, sid: &str, user: UserResponse) -> Response {
    let cookie = session_cookie(sid, state.config.production);
    (status, [(header::SET_COOKIE, cookie)], Json(user)).into_response()
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    ApiJson(creds): ApiJson<Credentials>,
) -> Result<Response> {
    let (username, password) = creds.into_parts()?;

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(format!(
            "A senha deve ter pelo menos {} caracteres",
            MIN_PASSWORD_LEN
        )));
    }

    if db::get_user_by_username(&state.db, &username).await?.is_some() {
        return Err(AppError::bad_request("Este usuário já existe"));
    }

    let password_hash = hash_password(password).await?;
    let user = db::insert_user(&state.db, &username, &password_hash)
        .await
        .map_err(|e| match e {
            AppError::Database(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                AppError::bad_request("Este usuário já existe")
            }
            other => other,
        })?;

    tracing::info!("Registered user {}", user.username);
    let sid = start_session(&state, user.id, &user.username).await?;
    Ok(with_session_cookie(&state, StatusCode::CREATED, &sid, UserResponse::from(&user)))
}

/// POST /api/auth/login
async fn login(State(state): State<AppState>, ApiJson(creds): ApiJson<Credentials>) -> Result<Response> {
    let (username, password) = creds.into_parts()?;

    let user = db::get_user_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuário não encontrado".to_string()))?;

    if !verify_password(password, user.password.clone()).await? {
        tracing::warn!("Failed login for {}", username);
        return Err(AppError::Unauthorized("Senha incorreta".to_string()));
    }

    let sid = start_session(&state, user.id, &user.username).await?;
    Ok(with_session_cookie(&state, StatusCode::OK, &sid, UserResponse::from(&user)))
}

/// POST /api/auth/logout
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    if let Some(sid) = session_id(&headers) {
        end_session(&state, &sid).await?;
    }

    let cookie = clear_session_cookie(state.config.production);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Logout realizado com sucesso" })),
    )
        .into_response())
}

/// GET /api/auth/user
async fn current_user(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<UserResponse>> {
    let session = current_session(&state, &headers)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Não autenticado".to_string()))?;

    Ok(Json(UserResponse::from(session.as_ref())))
}
