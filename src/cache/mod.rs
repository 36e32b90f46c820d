//! Cache layer
//!
//! In-memory cache for hot public reads (published post lists, the
//! services page, the gallery). The site runs as a single instance, so a
//! moka cache is the whole story; values are stored as JSON strings to
//! support generic types. Writes through the admin console invalidate by
//! key prefix.

use anyhow::{Context, Result};
use moka::future::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default maximum cache capacity (number of entries)
const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Default TTL for cache entries (5 minutes; public content changes rarely
/// but should not lag an admin edit by more than this)
const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache entry wrapper that stores serialized JSON data
#[derive(Clone)]
struct CacheEntry {
    data: Arc<String>,
}

impl CacheEntry {
    fn new<T: Serialize>(value: &T) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            data: Arc::new(json),
        })
    }

    fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).context("Failed to deserialize cache value")
    }
}

/// In-memory cache using moka
pub struct MemoryCache {
    cache: Cache<String, CacheEntry>,
    default_ttl: Duration,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl MemoryCache {
    /// Create a new memory cache with default settings
    pub fn new() -> Self {
        Self::with_capacity_and_ttl(DEFAULT_MAX_CAPACITY, DEFAULT_TTL)
    }

    /// Create a new memory cache with custom capacity and TTL
    pub fn with_capacity_and_ttl(max_capacity: u64, default_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(default_ttl)
            .build();

        Self { cache, default_ttl }
    }

    /// Get a value from cache.
    ///
    /// Returns `Ok(None)` if the key doesn't exist or has expired.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Some(entry) => Ok(Some(entry.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Set a value in cache. Expiry follows the cache-wide TTL.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let entry = CacheEntry::new(value)?;
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    /// Delete a single key. No-op when absent.
    pub async fn delete(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Delete all keys starting with the given prefix.
    ///
    /// Walks every entry, acceptable at this cache's size.
    pub async fn delete_prefix(&self, prefix: &str) {
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| (*key).clone())
            .collect();

        for key in keys {
            self.cache.invalidate(&key).await;
        }
    }

    /// Clear all cache entries
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Current number of entries
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();

        cache.set("key1", &"value1".to_string()).await.unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new();

        let result: Option<String> = cache.get("nonexistent").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_delete_prefix() {
        let cache = MemoryCache::new();

        cache.set("posts:list:1", &"a".to_string()).await.unwrap();
        cache.set("posts:list:2", &"b".to_string()).await.unwrap();
        cache.set("offerings:list", &"c".to_string()).await.unwrap();

        cache.delete_prefix("posts:").await;

        let p1: Option<String> = cache.get("posts:list:1").await.unwrap();
        let p2: Option<String> = cache.get("posts:list:2").await.unwrap();
        let o: Option<String> = cache.get("offerings:list").await.unwrap();
        assert_eq!(p1, None);
        assert_eq!(p2, None);
        assert_eq!(o, Some("c".to_string()));
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache = MemoryCache::with_capacity_and_ttl(100, Duration::from_millis(10));

        cache.set("key", &"value".to_string()).await.unwrap();
        let fresh: Option<String> = cache.get("key").await.unwrap();
        assert_eq!(fresh, Some("value".to_string()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.cache.run_pending_tasks().await;

        let stale: Option<String> = cache.get("key").await.unwrap();
        assert_eq!(stale, None);
    }

    #[tokio::test]
    async fn test_complex_types() {
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Card {
            id: i64,
            title: String,
        }

        let cache = MemoryCache::new();
        let card = Card {
            id: 1,
            title: "Web Design".to_string(),
        };

        cache.set("offering:1", &card).await.unwrap();

        let result: Option<Card> = cache.get("offering:1").await.unwrap();
        assert_eq!(result, Some(card));
    }
}
