//! Shared server state

use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{JwtService, RateLimiter};
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::services::subscription::SubscriptionCache;

/// Interval of the rate limiter prune task
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// State shared by every handler (cheap to clone)
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    /// SQLite pool (WAL)
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    /// Login/register throttling
    pub rate_limiter: RateLimiter,
    /// Per-owner subscription lookups for feature gates
    pub subscriptions: SubscriptionCache,
}

impl ServerState {
    /// Open the configured database and build the state
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_url).await?;
        Ok(Self::with_pool(config.clone(), db.pool))
    }

    /// State over a private in-memory database (tests)
    pub async fn in_memory(config: Config) -> Result<Self> {
        let db = DbService::in_memory().await?;
        Ok(Self::with_pool(config, db.pool))
    }

    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            pool,
            jwt_service,
            rate_limiter: RateLimiter::new(),
            subscriptions: SubscriptionCache::new(),
        }
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Spawn periodic maintenance
    pub fn start_background_tasks(&self) {
        let limiter = self.rate_limiter.clone();
        let cache = self.subscriptions.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                limiter.cleanup().await;
                cache.purge_expired().await;
                tracing::debug!("Pruned rate limiter and subscription cache");
            }
        });
    }
}
