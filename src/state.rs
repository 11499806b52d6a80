use std::sync::Arc;

use crate::cache::CacheGateway;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::middleware::RateLimiter;

/// Everything a handler needs, built once in `main` and cloned per request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseManager,
    pub cache: CacheGateway,
    pub rate_limiter: Option<RateLimiter>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseManager, cache: CacheGateway) -> Self {
        let rate_limiter = RateLimiter::from_config(&config.api);
        Self {
            config: Arc::new(config),
            db,
            cache,
            rate_limiter,
        }
    }
}
