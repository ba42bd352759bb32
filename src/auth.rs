//! Authentication: password hashing, cookie sessions and the auth middleware

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration as ChronoDuration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::models::SessionUser;
use crate::AppState;

pub const SESSION_COOKIE: &str = "sid";
pub const SESSION_TTL_HOURS: i64 = 24;
pub const MIN_PASSWORD_LEN: usize = 6;

// ==================== Passwords ====================

/// Hash a password into an Argon2 PHC string on the blocking pool
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("password hash failed: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(format!("hash task failed: {}", e)))?
}

/// Check a password against a stored hash; malformed hashes never match
pub async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = match PasswordHash::new(&hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash is malformed: {}", e);
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| AppError::Internal(format!("verify task failed: {}", e)))
}

// ==================== Sessions ====================

/// 256 random bits, URL-safe
pub fn new_session_id() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// `Set-Cookie` value carrying a new session
pub fn session_cookie(sid: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        sid,
        SESSION_TTL_HOURS * 60 * 60
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Session id from the request's `Cookie` headers
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Persist a new session and return its id
pub async fn start_session(state: &AppState, user_id: Uuid, username: &str) -> Result<String> {
    let sid = new_session_id();
    let expires_at = Utc::now() + ChronoDuration::hours(SESSION_TTL_HOURS);

    db::insert_session(&state.db, &sid, user_id, expires_at).await?;

    let session = SessionUser {
        user_id,
        username: username.to_string(),
        expires_at,
    };
    state.cache.sessions.insert(sid.clone(), Arc::new(session)).await;

    info!("Session started for {}", username);
    Ok(sid)
}

pub async fn end_session(state: &AppState, sid: &str) -> Result<()> {
    state.cache.invalidate_session(sid).await;
    db::delete_session(&state.db, sid).await
}

/// Resolve the request's session, cache first
pub async fn current_session(state: &AppState, headers: &HeaderMap) -> Result<Option<Arc<SessionUser>>> {
    let Some(sid) = session_id(headers) else {
        return Ok(None);
    };

    let now = Utc::now();
    if let Some(cached) = state.cache.sessions.get(&sid).await {
        if cached.is_valid_at(now) {
            return Ok(Some(cached));
        }
        state.cache.invalidate_session(&sid).await;
        return Ok(None);
    }

    match db::find_session(&state.db, &sid).await? {
        Some(session) => {
            let session = Arc::new(session);
            state.cache.sessions.insert(sid, session.clone()).await;
            Ok(Some(session))
        }
        None => Ok(None),
    }
}

/// Middleware rejecting requests without a live session.
///
/// The resolved [`SessionUser`] is stored in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let session = current_session(&state, req.headers())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Autenticação necessária".to_string()))?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Delete expired sessions every hour
pub async fn start_session_sweeper(db: PgPool) {
    let mut interval = interval(Duration::from_secs(60 * 60));
    loop {
        interval.tick().await;
        match db::purge_expired_sessions(&db).await {
            Ok(0) => {}
            Ok(removed) => info!("Removed {} expired sessions", removed),
            Err(e) => warn!("Failed to purge expired sessions: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_id_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; sid=abc123; lang=pt"),
        );
        assert_eq!(session_id(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_session_id_missing_or_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("sid=; other=1"));
        assert_eq!(session_id(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("sidx=abc"));
        assert_eq!(session_id(&headers), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("xyz", false);
        assert!(cookie.starts_with("sid=xyz;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));

        assert!(session_cookie("xyz", true).ends_with("; Secure"));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }

    #[test]
    fn test_session_ids_are_unique_and_url_safe() {
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let hash = hash_password("admin123".to_string()).await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("admin123".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_never_matches() {
        let ok = verify_password("admin123".to_string(), "deadbeef.salt".to_string())
            .await
            .unwrap();
        assert!(!ok);
    }
}
