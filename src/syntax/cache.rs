//! Highlight result cache
//!
//! Bounded LRU keyed by the exact text and the syntax and theme ids the
//! caller asked for. Values are shared `Arc<[StyleRange]>` slices and are
//! never mutated after insertion.
//!
//! Lookups share a read lock. A hit then marks the entry recently used
//! only if the write lock is free at that moment, so recency is exact
//! when uncontended and approximate under concurrent lookups.

use std::mem::size_of;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

use lru::LruCache;

use super::style::StyleRange;

/// Cache key: exact content, not references
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub text: String,
    pub syntax: String,
    pub theme: String,
}

impl CacheKey {
    pub fn new(text: &str, syntax: &str, theme: &str) -> Self {
        Self {
            text: text.to_string(),
            syntax: syntax.to_string(),
            theme: theme.to_string(),
        }
    }

    fn size_bytes(&self) -> usize {
        size_of::<Self>() + self.text.len() + self.syntax.len() + self.theme.len()
    }
}

/// Current occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheSize {
    pub entries: usize,
    pub bytes: usize,
}

/// Counters since creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub bytes: usize,
}

struct CacheEntry {
    ranges: Arc<[StyleRange]>,
    bytes: usize,
}

struct Inner {
    lru: LruCache<CacheKey, CacheEntry>,
    bytes: usize,
}

/// Thread-safe LRU of highlight results
pub struct ResultCache {
    inner: RwLock<Inner>,
    max_entries: NonZeroUsize,
    max_bytes: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

fn entry_size(key: &CacheKey, ranges: &[StyleRange]) -> usize {
    key.size_bytes() + size_of::<CacheEntry>() + std::mem::size_of_val(ranges)
}

impl ResultCache {
    /// Create a cache bounded by entry count and approximate byte size
    pub fn new(max_entries: usize, max_bytes: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                lru: LruCache::unbounded(),
                bytes: 0,
            }),
            max_entries: NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN),
            max_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Mark `key` most recently used unless a writer holds the lock
    fn promote(&self, key: &CacheKey) {
        let mut inner = match self.inner.try_write() {
            Ok(inner) => inner,
            Err(TryLockError::Poisoned(p)) => p.into_inner(),
            Err(TryLockError::WouldBlock) => {
                tracing::trace!("cache busy; recency not updated");
                return;
            }
        };
        inner.lru.promote(key);
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries.get()
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Look up a result, marking it most recently used
    pub fn get(&self, key: &CacheKey) -> Option<Arc<[StyleRange]>> {
        let found = self.read().lru.peek(key).map(|entry| entry.ranges.clone());
        match &found {
            Some(_) => {
                self.promote(key);
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(syntax = %key.syntax, theme = %key.theme, "cache hit");
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(syntax = %key.syntax, theme = %key.theme, "cache miss");
            }
        }
        found
    }

    /// Store a result, evicting least recently used entries as needed
    ///
    /// Storing content equal to what is already cached only refreshes
    /// its recency. Entries larger than the whole byte budget are not
    /// stored.
    pub fn put(&self, key: CacheKey, ranges: Arc<[StyleRange]>) {
        let bytes = entry_size(&key, &ranges);
        if bytes > self.max_bytes {
            tracing::debug!(bytes, max_bytes = self.max_bytes, "result too large to cache");
            return;
        }

        let mut inner = self.write();
        if let Some(existing) = inner.lru.get(&key) {
            if existing.ranges == ranges {
                return;
            }
        }
        if let Some(old) = inner.lru.put(key, CacheEntry { ranges, bytes }) {
            inner.bytes -= old.bytes;
        }
        inner.bytes += bytes;

        let mut evicted = 0u64;
        while inner.lru.len() > self.max_entries.get() || inner.bytes > self.max_bytes {
            let Some((_, old)) = inner.lru.pop_lru() else {
                break;
            };
            inner.bytes -= old.bytes;
            evicted += 1;
        }
        drop(inner);

        if evicted > 0 {
            self.evictions.fetch_add(evicted, Ordering::Relaxed);
            tracing::debug!(evicted, "evicted cached results");
        }
    }

    /// Drop every entry; counters are kept
    pub fn clear(&self) {
        let mut inner = self.write();
        let dropped = inner.lru.len();
        inner.lru.clear();
        inner.bytes = 0;
        drop(inner);
        tracing::debug!(dropped, "cleared result cache");
    }

    pub fn len(&self) -> usize {
        self.read().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn size_bytes(&self) -> usize {
        self.read().bytes
    }

    pub fn size(&self) -> CacheSize {
        let inner = self.read();
        CacheSize {
            entries: inner.lru.len(),
            bytes: inner.bytes,
        }
    }

    pub fn stats(&self) -> CacheStats {
        let size = self.size();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: size.entries,
            bytes: size.bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::style::Style;

    fn ranges(len: usize) -> Arc<[StyleRange]> {
        vec![StyleRange::new(0, len, Style::default())].into()
    }

    fn key(text: &str) -> CacheKey {
        CacheKey::new(text, "Rust", "Monokai")
    }

    #[test]
    fn test_get_put() {
        let cache = ResultCache::new(4, 1 << 20);
        assert!(cache.get(&key("a")).is_none());
        cache.put(key("a"), ranges(1));
        assert_eq!(cache.get(&key("a")).unwrap().len(), 1);

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
        assert!(stats.bytes > 0);
    }

    #[test]
    fn test_key_is_exact() {
        let cache = ResultCache::new(4, 1 << 20);
        cache.put(key("a"), ranges(1));
        assert!(cache.get(&CacheKey::new("a", "Rust", "Other")).is_none());
        assert!(cache.get(&CacheKey::new("a", "rust", "Monokai")).is_none());
        assert!(cache.get(&key("a ")).is_none());
    }

    #[test]
    fn test_lru_eviction_order() {
        let cache = ResultCache::new(2, 1 << 20);
        cache.put(key("a"), ranges(1));
        cache.put(key("b"), ranges(1));
        // Touch "a" so "b" becomes least recently used
        cache.get(&key("a"));
        cache.put(key("c"), ranges(1));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("a")).is_some());
        assert!(cache.get(&key("b")).is_none());
        assert!(cache.get(&key("c")).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_lookup_while_another_reader_holds_the_lock() {
        let cache = ResultCache::new(2, 1 << 20);
        cache.put(key("a"), ranges(1));
        cache.put(key("b"), ranges(1));

        let reader = cache.read();
        let found = std::thread::scope(|s| s.spawn(|| cache.get(&key("a"))).join().unwrap());
        drop(reader);
        assert!(found.is_some());
        assert_eq!(cache.stats().hits, 1);

        // The lock was busy, so "a" kept its place and goes first
        cache.put(key("c"), ranges(1));
        assert!(cache.get(&key("a")).is_none());
        assert!(cache.get(&key("b")).is_some());
    }

    #[test]
    fn test_byte_budget() {
        let one = entry_size(&key("a"), &ranges(1));
        let cache = ResultCache::new(100, one * 2);
        cache.put(key("a"), ranges(1));
        cache.put(key("b"), ranges(1));
        cache.put(key("c"), ranges(1));
        assert_eq!(cache.len(), 2);
        assert!(cache.size_bytes() <= one * 2);

        let big: Arc<[StyleRange]> = vec![StyleRange::new(0, 1, Style::default()); 64].into();
        cache.put(key("big"), big);
        assert!(cache.get(&key("big")).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_replace_and_promote() {
        let cache = ResultCache::new(2, 1 << 20);
        cache.put(key("a"), ranges(1));
        cache.put(key("b"), ranges(1));
        // Same content: only promotes "a"
        cache.put(key("a"), ranges(1));
        cache.put(key("c"), ranges(1));
        assert!(cache.get(&key("a")).is_some());
        assert!(cache.get(&key("b")).is_none());

        cache.put(key("a"), ranges(5));
        assert_eq!(cache.get(&key("a")).unwrap()[0].end, 5);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_clear() {
        let cache = ResultCache::new(4, 1 << 20);
        cache.put(key("a"), ranges(1));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.size(), CacheSize::default());
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let cache = ResultCache::new(0, 1 << 20);
        assert_eq!(cache.max_entries(), 1);
        cache.put(key("a"), ranges(1));
        cache.put(key("b"), ranges(1));
        assert_eq!(cache.len(), 1);
    }
}
