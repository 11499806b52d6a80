use async_trait::async_trait;
use deadpool_redis::{redis, redis::AsyncCommands, Config as PoolConfig, Pool, Runtime};
use std::time::Duration;
use tracing::{debug, info};

use super::{CacheBackend, CacheError, CacheResult};
use crate::config::CacheConfig;

const SCAN_BATCH: usize = 200;

/// Redis store behind a deadpool connection pool
#[derive(Clone)]
pub struct RedisBackend {
    pool: Pool,
}

impl RedisBackend {
    pub fn new(url: &str, config: &CacheConfig) -> CacheResult<Self> {
        let mut cfg = PoolConfig::from_url(url);
        cfg.pool = Some(deadpool_redis::PoolConfig::new(config.pool_size.max(1)));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::Backend(format!("Failed to create Redis pool: {}", e)))?;

        info!("Redis cache pool created (pool size: {})", config.pool_size);
        Ok(Self { pool })
    }

    async fn connection(&self) -> CacheResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Backend(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis GET failed for key {}: {}", key, e)))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        match ttl {
            Some(duration) => {
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(|e| CacheError::Backend(format!("Redis SETEX failed for key {}: {}", key, e)))?;
                debug!("Redis SET {} (TTL: {}s)", key, seconds);
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(|e| CacheError::Backend(format!("Redis SET failed for key {}: {}", key, e)))?;
            }
        }
        Ok(())
    }

    /// SCAN + DEL in batches
    async fn clear_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let mut conn = self.connection().await?;
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut *conn)
                .await
                .map_err(|e| CacheError::Backend(format!("Redis SCAN failed for {}: {}", pattern, e)))?;

            if !keys.is_empty() {
                let count: u64 = conn
                    .del(&keys)
                    .await
                    .map_err(|e| CacheError::Backend(format!("Redis DEL failed for {}: {}", pattern, e)))?;
                removed += count;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(removed)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis PING failed: {}", e)))?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_creation_does_not_connect() {
        let config = CacheConfig {
            redis_url: None,
            ttl_secs: 60,
            pool_size: 0,
        };
        assert!(RedisBackend::new("redis://127.0.0.1:1/0", &config).is_ok());
    }
}
