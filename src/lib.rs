//! Rental property management backend: properties, lease contracts,
//! payments, receipts, reminders and Brazilian tax estimates.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod finance;
pub mod format;
pub mod models;
pub mod notify;
pub mod receipts;
pub mod routes;
pub mod seed;
pub mod uploads;

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::PgPool;

pub use cache::AppCache;
pub use config::Config;
pub use routes::router;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub config: Arc<Config>,
    pub notifier: notify::Notifier,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let notifier = notify::Notifier::new(config.email.clone());
        Self {
            db,
            cache: AppCache::new(),
            config: Arc::new(config),
            notifier,
        }
    }
}

/// Current local day, the reference for payment status and reminders
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
