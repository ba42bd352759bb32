//! In-memory caching using moka
//!
//! Sessions are looked up on every authenticated request, so resolved
//! sessions are kept in front of the `user_sessions` table. Dashboard
//! metrics scan every table and are cached per day until the next write.

use moka::future::Cache;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::models::{DashboardMetrics, SessionUser};

/// Application cache holding sessions and dashboard metrics
#[derive(Clone)]
pub struct AppCache {
    /// Sessions (sid -> SessionUser)
    pub sessions: Cache<String, Arc<SessionUser>>,
    /// Dashboard metrics (YYYY-MM-DD -> DashboardMetrics)
    pub dashboard: Cache<String, Arc<DashboardMetrics>>,
    /// Bumped on every invalidation so in-flight computations can tell they are stale
    dashboard_generation: Arc<AtomicU64>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Sessions: 10k entries, 5 min TTL so deleted sessions age out
            sessions: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(5 * 60))
                .build(),

            // Dashboard: one entry per day, 60s TTL
            dashboard: Cache::builder()
                .max_capacity(4)
                .time_to_live(Duration::from_secs(60))
                .build(),

            dashboard_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            sessions_size: self.sessions.entry_count(),
            dashboard_cached: self.dashboard.entry_count() > 0,
        }
    }

    /// Drop cached dashboard metrics after any write
    pub fn invalidate_dashboard(&self) {
        self.dashboard_generation.fetch_add(1, Ordering::SeqCst);
        self.dashboard.invalidate_all();
        debug!("Dashboard cache invalidated");
    }

    /// Generation to read before computing dashboard metrics
    pub fn dashboard_generation(&self) -> u64 {
        self.dashboard_generation.load(Ordering::SeqCst)
    }

    /// Cache metrics computed at `generation`.
    ///
    /// Metrics are dropped when a write invalidated the dashboard after
    /// `generation` was read, even if it lands between the check and the insert.
    pub async fn store_dashboard(&self, key: String, metrics: Arc<DashboardMetrics>, generation: u64) -> bool {
        if self.dashboard_generation() != generation {
            debug!("Discarding stale dashboard metrics for {}", key);
            return false;
        }

        self.dashboard.insert(key.clone(), metrics).await;
        if self.dashboard_generation() != generation {
            self.dashboard.invalidate(&key).await;
            return false;
        }
        true
    }

    pub async fn invalidate_session(&self, sid: &str) {
        self.sessions.invalidate(sid).await;
    }

    /// Cache key for the dashboard of a given day
    pub fn dashboard_key(today: chrono::NaiveDate) -> String {
        today.format("%Y-%m-%d").to_string()
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for the health endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub sessions_size: u64,
    pub dashboard_cached: bool,
}
