//! Shared router setup for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, request::Builder, Request},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use gestao_alugueis::{models::SessionUser, router, AppState, Config};

pub const SID: &str = "test-session";

/// State whose pool never connects; only for requests answered before the database
pub fn lazy_pool(config: &Config) -> PgPool {
    PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database_url)
        .expect("lazy pool")
}

/// Pool on `TEST_DATABASE_URL` with migrations applied, `None` when unset
pub async fn database_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok().filter(|u| !u.is_empty())?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to TEST_DATABASE_URL");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}

/// Router over `pool` with a logged-in session already cached
pub async fn app_with(pool: PgPool) -> Router {
    let state = AppState::new(pool, Config::for_tests());

    state
        .cache
        .sessions
        .insert(
            SID.to_string(),
            Arc::new(SessionUser {
                user_id: Uuid::new_v4(),
                username: "admin@gestao.com".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
            }),
        )
        .await;

    router(state)
}

pub async fn lazy_app() -> Router {
    app_with(lazy_pool(&Config::for_tests())).await
}

pub fn authed(method: &str, uri: &str) -> Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("sid={}", SID))
}

pub fn json_request(builder: Builder, body: Value) -> Request<Body> {
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty(builder: Builder) -> Request<Body> {
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
