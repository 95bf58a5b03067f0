//! In-memory cache of NDVI responses.
//!
//! Keys are built from the request parameters: names sorted
//! lexicographically, array and object values serialized as JSON, joined
//! as `name=value` pairs with `&`. Two requests carrying the same
//! parameters in a different order share a key.
//!
//! Entries are evicted least-recently-used once `capacity` is reached.
//! A capacity of 0 disables eviction.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use ndvi_processor::StatisticsResult;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

/// Normalized cache key.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from named parameters.
    pub fn from_params<'a>(params: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        let sorted: BTreeMap<&str, Value> = params.into_iter().collect();

        let key = sorted
            .iter()
            .map(|(name, value)| format!("{}={}", name, canonical_value(value)))
            .collect::<Vec<_>>()
            .join("&");

        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strings verbatim, everything else as compact JSON.
fn canonical_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Statistics for the request cache.
#[derive(Default)]
pub struct RequestCacheStats {
    /// Total cache hits.
    pub hits: AtomicU64,
    /// Total cache misses.
    pub misses: AtomicU64,
    /// Total entries evicted to make room.
    pub evictions: AtomicU64,
}

impl RequestCacheStats {
    /// Calculate cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// Point-in-time view of the cache, served on `/cache/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub entries: usize,
    /// 0 when unbounded.
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate_percent: f64,
}

/// Process-wide LRU cache of pipeline results.
pub struct RequestCache {
    cache: RwLock<LruCache<CacheKey, StatisticsResult>>,
    capacity: usize,
    stats: RequestCacheStats,
}

impl RequestCache {
    /// Create a cache holding at most `capacity` entries (0 = unbounded).
    pub fn new(capacity: usize) -> Self {
        let cache = match NonZeroUsize::new(capacity) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };

        tracing::info!(
            capacity = capacity,
            unbounded = capacity == 0,
            "RequestCache initialized"
        );

        Self {
            cache: RwLock::new(cache),
            capacity,
            stats: RequestCacheStats::default(),
        }
    }

    /// Look up a result, counting the hit or miss.
    pub async fn get(&self, key: &CacheKey) -> Option<StatisticsResult> {
        // LRU lookups reorder entries, so even reads take the write lock
        let mut cache = self.cache.write().await;

        match cache.get(key) {
            Some(result) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(result.clone())
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a result. A racing put for the same key wins by arriving last.
    pub async fn put(&self, key: CacheKey, result: StatisticsResult) {
        let mut cache = self.cache.write().await;

        if let Some((old_key, _)) = cache.push(key.clone(), result) {
            if old_key != key {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(evicted = %old_key, "RequestCache evicted entry");
            }
        }
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Get cache statistics.
    pub fn stats(&self) -> &RequestCacheStats {
        &self.stats
    }

    pub async fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            entries: self.len().await,
            capacity: self.capacity,
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            evictions: self.stats.evictions.load(Ordering::Relaxed),
            hit_rate_percent: self.stats.hit_rate(),
        }
    }

    /// Clear all entries, returning how many were removed.
    pub async fn clear(&self) -> usize {
        let mut cache = self.cache.write().await;
        let count = cache.len();
        cache.clear();
        tracing::info!("RequestCache cleared {} entries", count);
        count
    }
}
