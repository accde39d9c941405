//! Content-key cache for avoiding redundant SQL normalization.
//!
//! Under sustained load the same statements (and the same statement shapes)
//! arrive over and over. Normalizing them is a full lexical pass, so the
//! normalizer memoizes raw statement text -> content key.
//!
//! The cache is a pure optimization: a hit must return exactly what a fresh
//! normalization would have produced.

mod lru;

pub use lru::LruContentKeyCache;

use std::sync::Arc;

/// Cache of raw statement text to content key.
///
/// Implementations must be thread-safe as all dissector invocations share
/// one normalizer.
pub trait ContentKeyCache: Send + Sync {
    /// Get the cached content key for a statement, if available.
    fn get(&self, statement: &str) -> Option<Arc<str>>;

    /// Store the content key for a statement.
    fn put(&self, statement: &str, content_key: Arc<str>);

    /// Get the cached key or compute and store it.
    ///
    /// Returns the key and whether it was a cache hit.
    fn get_or_insert_with(
        &self,
        statement: &str,
        f: Box<dyn FnOnce() -> Arc<str> + '_>,
    ) -> (Arc<str>, bool) {
        if let Some(key) = self.get(statement) {
            return (key, true);
        }
        let key = f();
        self.put(statement, key.clone());
        (key, false)
    }

    /// Get cache statistics (if available).
    fn stats(&self) -> Option<CacheStats> {
        None
    }

    /// Reset statistics counters. Default implementation does nothing.
    fn reset_stats(&self) {}

    /// Drop all cached entries. Default implementation does nothing.
    fn clear(&self) {}
}

/// No-op cache implementation for when caching is disabled.
#[derive(Clone, Debug, Default)]
pub struct NoCache;

impl ContentKeyCache for NoCache {
    fn get(&self, _statement: &str) -> Option<Arc<str>> {
        None
    }

    fn put(&self, _statement: &str, _content_key: Arc<str>) {
        // No-op
    }
}

/// Cache statistics for monitoring.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Current number of cached entries.
    pub entries: usize,
    /// Maximum number of entries allowed.
    pub max_entries: usize,
    /// Number of entries evicted due to LRU policy.
    pub evictions: u64,
    /// Peak number of entries ever held (high watermark).
    pub peak_entries: usize,
}

impl CacheStats {
    /// Calculate the hit ratio (hits / total accesses).
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Calculate cache utilization (entries / max_entries).
    pub fn utilization(&self) -> f64 {
        if self.max_entries == 0 {
            0.0
        } else {
            self.entries as f64 / self.max_entries as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_cache_always_computes() {
        let cache = NoCache;
        let (key, hit) = cache.get_or_insert_with("SELECT 1", Box::new(|| Arc::from("SELECT ?")));
        assert_eq!(&*key, "SELECT ?");
        assert!(!hit);
        assert!(cache.get("SELECT 1").is_none());
        assert!(cache.stats().is_none());
    }

    #[test]
    fn test_stats_ratios() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            entries: 5,
            max_entries: 10,
            ..Default::default()
        };
        assert!((stats.hit_ratio() - 0.75).abs() < f64::EPSILON);
        assert!((stats.utilization() - 0.5).abs() < f64::EPSILON);

        let empty = CacheStats::default();
        assert_eq!(empty.hit_ratio(), 0.0);
        assert_eq!(empty.utilization(), 0.0);
    }
}
