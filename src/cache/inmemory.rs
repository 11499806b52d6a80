use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{glob_match, CacheBackend, CacheResult};

struct CacheEntry {
    data: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(data: String, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        CacheEntry { data, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// Process-local store used when no Redis URL is configured, and by tests.
/// Expired entries are dropped when touched.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    store: Arc<DashMap<String, CacheEntry>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl CacheBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        if let Some(entry) = self.store.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.data.clone()));
            }
        }

        self.store.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        self.store.insert(key.to_string(), CacheEntry::new(value, ttl));
        debug!("InMemory SET {} (TTL: {:?})", key, ttl);
        Ok(())
    }

    async fn clear_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let before = self.store.len();
        self.store.retain(|key, _| !glob_match(pattern, key));
        Ok(before.saturating_sub(self.store.len()) as u64)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }
}
