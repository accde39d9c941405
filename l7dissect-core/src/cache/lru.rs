//! LRU content-key cache.
//!
//! Entries carry their last access stamp in an atomic, so hits only take the
//! read lock. Eviction runs under the write lock and removes roughly 10% of the
//! least recently used entries once the cache is full.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, trace};

use super::{CacheStats, ContentKeyCache};

/// Cached content key plus its last access stamp.
struct Entry {
    content_key: Arc<str>,
    last_access: AtomicU64,
}

/// LRU content-key cache with configurable size limit.
///
/// Thread-safe implementation using RwLock for the main map
/// and atomics for access stamps and statistics.
pub struct LruContentKeyCache {
    /// Maximum number of entries to cache
    max_entries: usize,

    /// Cached entries: statement text -> entry
    entries: RwLock<HashMap<Box<str>, Entry>>,

    /// Monotonically increasing access counter for LRU ordering
    access_counter: AtomicU64,

    /// Statistics
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    /// Peak entries ever held (high watermark)
    peak_entries: AtomicUsize,
}

impl LruContentKeyCache {
    /// Create a new cache with the specified maximum entries.
    ///
    /// A capacity of zero is treated as one; use
    /// [`NoCache`](super::NoCache) to disable caching.
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            max_entries,
            entries: RwLock::new(HashMap::with_capacity(max_entries.min(10_000))),
            access_counter: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            peak_entries: AtomicUsize::new(0),
        }
    }

    fn next_stamp(&self) -> u64 {
        self.access_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Evict least recently used entries until there is room for one more.
    fn evict_lru(&self, entries: &mut HashMap<Box<str>, Entry>) {
        if entries.len() < self.max_entries {
            return;
        }

        let target = self.max_entries - (self.max_entries / 10).max(1);
        let to_remove = entries.len() - target;

        let mut stamps: Vec<(u64, Box<str>)> = entries
            .iter()
            .map(|(statement, entry)| {
                (entry.last_access.load(Ordering::Relaxed), statement.clone())
            })
            .collect();
        stamps.sort_unstable_by_key(|(stamp, _)| *stamp);

        for (_, statement) in stamps.into_iter().take(to_remove) {
            entries.remove(&statement);
        }

        self.evictions.fetch_add(to_remove as u64, Ordering::Relaxed);
        debug!(evicted = to_remove, remaining = entries.len(), "content-key cache eviction");
    }

    /// Insert under the write lock; an entry raced in by another thread wins.
    fn insert(&self, statement: &str, content_key: Arc<str>) -> Arc<str> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = entries.get(statement) {
            existing.last_access.store(self.next_stamp(), Ordering::Relaxed);
            return existing.content_key.clone();
        }

        self.evict_lru(&mut entries);

        entries.insert(
            Box::from(statement),
            Entry {
                content_key: content_key.clone(),
                last_access: AtomicU64::new(self.next_stamp()),
            },
        );
        self.update_peak(entries.len());
        content_key
    }

    /// Update peak entries if current is higher.
    fn update_peak(&self, current: usize) {
        self.peak_entries.fetch_max(current, Ordering::Relaxed);
    }

    /// Get current cache statistics.
    pub fn get_stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len(),
            max_entries: self.max_entries,
            evictions: self.evictions.load(Ordering::Relaxed),
            peak_entries: self.peak_entries.load(Ordering::Relaxed),
        }
    }

    /// Reset statistics counters (keeps cache contents).
    pub fn reset_stats(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        // Note: peak_entries is NOT reset - it's a high watermark
    }

    /// Clear all cached entries.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }
}

impl ContentKeyCache for LruContentKeyCache {
    fn get(&self, statement: &str) -> Option<Arc<str>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get(statement) {
            entry.last_access.store(self.next_stamp(), Ordering::Relaxed);
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(entry.content_key.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    fn put(&self, statement: &str, content_key: Arc<str>) {
        self.insert(statement, content_key);
    }

    fn get_or_insert_with(
        &self,
        statement: &str,
        f: Box<dyn FnOnce() -> Arc<str> + '_>,
    ) -> (Arc<str>, bool) {
        // Fast path: read lock only
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(statement) {
                entry.last_access.store(self.next_stamp(), Ordering::Relaxed);
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(len = statement.len(), "content-key cache hit");
                return (entry.content_key.clone(), true);
            }
        }

        // Not cached - compute outside the lock, then insert
        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(len = statement.len(), "content-key cache miss");
        let content_key = f();

        (self.insert(statement, content_key), false)
    }

    fn stats(&self) -> Option<CacheStats> {
        Some(self.get_stats())
    }

    fn reset_stats(&self) {
        LruContentKeyCache::reset_stats(self);
    }

    fn clear(&self) {
        LruContentKeyCache::clear(self);
    }
}

impl std::fmt::Debug for LruContentKeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.get_stats();
        f.debug_struct("LruContentKeyCache")
            .field("max_entries", &self.max_entries)
            .field("entries", &stats.entries)
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .field("hit_ratio", &format!("{:.2}%", stats.hit_ratio() * 100.0))
            .finish()
    }
}
