pub mod inmemory;
pub mod redis;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub use inmemory::InMemoryBackend;
pub use self::redis::RedisBackend;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache payload error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store with pattern deletion. Values are JSON text.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()>;

    /// Delete every key matching a `*` glob; returns how many were removed
    async fn clear_pattern(&self, pattern: &str) -> CacheResult<u64>;

    async fn health_check(&self) -> CacheResult<bool>;
}

/// Read-through cache used by the list endpoints. Every fault is logged and
/// swallowed here so callers fall back to the database.
#[derive(Clone)]
pub struct CacheGateway {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl CacheGateway {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(InMemoryBackend::new()), ttl)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("cache miss: {}", key);
                return None;
            }
            Err(e) => {
                warn!("cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("cache hit: {}", key);
                Some(value)
            }
            Err(e) => {
                warn!("discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("cache encode failed for {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.backend.set(key, payload, Some(self.ttl)).await {
            warn!("cache write failed for {}: {}", key, e);
        }
    }

    pub async fn clear_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let removed = self.backend.clear_pattern(pattern).await?;
        debug!("cache cleared {} keys for {}", removed, pattern);
        Ok(removed)
    }

    /// Clears each pattern, logging failures instead of returning them
    pub async fn invalidate(&self, patterns: &[String]) {
        for pattern in patterns {
            if let Err(e) = self.clear_pattern(pattern).await {
                warn!("cache invalidation failed for {}: {}", pattern, e);
            }
        }
    }

    pub async fn health_check(&self) -> bool {
        match self.backend.health_check().await {
            Ok(ok) => ok,
            Err(e) => {
                warn!("cache health check failed: {}", e);
                false
            }
        }
    }
}

/// `<prefix>_<query>` with the query pairs re-encoded in key order, so the
/// same filters give the same key however the client ordered them.
pub fn cache_key(prefix: &str, raw_query: Option<&str>) -> String {
    let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(raw_query.unwrap_or("").as_bytes())
        .into_owned()
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{}_{}", prefix, encoded)
}

/// Glob match supporting `*` only, which is all the invalidation patterns use
pub(crate) fn glob_match(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !key.starts_with(first) || key.len() < first.len() + last.len() || !key.ends_with(last) {
        return false;
    }

    let mut rest = &key[first.len()..key.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    true
}
