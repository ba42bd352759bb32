//! User and session queries

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{SessionUser, User};

pub async fn get_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn insert_user(pool: &PgPool, username: &str, password_hash: &str) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, password)
        VALUES ($1, $2, $3)
        RETURNING id, username, password
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn count_users(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

pub async fn insert_session(
    pool: &PgPool,
    sid: &str,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("INSERT INTO user_sessions (sid, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(sid)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(())
}

/// Resolve a live session to its user
pub async fn find_session(pool: &PgPool, sid: &str) -> Result<Option<SessionUser>> {
    let session = sqlx::query_as::<_, SessionUser>(
        r#"
        SELECT s.user_id, u.username, s.expires_at
        FROM user_sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.sid = $1
          AND s.expires_at > NOW()
        "#,
    )
    .bind(sid)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

pub async fn delete_session(pool: &PgPool, sid: &str) -> Result<()> {
    sqlx::query("DELETE FROM user_sessions WHERE sid = $1")
        .bind(sid)
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove expired sessions; returns how many were deleted
pub async fn purge_expired_sessions(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= NOW()")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
