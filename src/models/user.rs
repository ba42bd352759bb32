//! Users and sessions

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// User from the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Argon2 PHC string
    pub password: String,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
}

/// Authenticated session resolved from the session cookie
#[derive(Debug, Clone, FromRow)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionUser {
    pub fn is_valid_at(&self, check_time: DateTime<Utc>) -> bool {
        check_time < self.expires_at
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

impl From<&SessionUser> for UserResponse {
    fn from(session: &SessionUser) -> Self {
        Self {
            id: session.user_id,
            username: session.username.clone(),
        }
    }
}
