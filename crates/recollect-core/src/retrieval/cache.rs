//! Time-bounded cache in front of ranked search.

use std::collections::HashMap;
use std::sync::Arc;

use crate::traits::Clock;
use crate::types::{ScoredMemory, SearchOptions};

/// Default time-to-live: five minutes.
pub const DEFAULT_CACHE_TTL_MS: i64 = 5 * 60 * 1000;

#[derive(Debug, Clone)]
struct CacheEntry {
    results: Vec<ScoredMemory>,
    stored_at: i64,
}

impl CacheEntry {
    fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms.saturating_sub(self.stored_at) < ttl_ms
    }
}

/// Search result cache keyed by query and serialized options.
///
/// Any write to the store drops every entry; entries older than the TTL are
/// treated as missing even without a write.
pub struct SearchCache {
    entries: HashMap<(String, String), CacheEntry>,
    ttl_ms: i64,
    generation: u64,
    clock: Arc<dyn Clock>,
}

impl SearchCache {
    /// Create an empty cache.
    pub fn new(clock: Arc<dyn Clock>, ttl_ms: i64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_ms,
            generation: 0,
            clock,
        }
    }

    fn key(query: &str, options: &SearchOptions) -> (String, String) {
        (query.to_string(), options.cache_key())
    }

    /// Cached results, if present and fresh. Stale entries are evicted.
    pub fn get(&mut self, query: &str, options: &SearchOptions) -> Option<Vec<ScoredMemory>> {
        let key = Self::key(query, options);
        let now = self.clock.now_ms();
        match self.entries.get(&key) {
            Some(entry) if entry.is_fresh(now, self.ttl_ms) => Some(entry.results.clone()),
            Some(_) => {
                self.entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store results for a query. Expired entries are pruned first.
    pub fn put(&mut self, query: &str, options: &SearchOptions, results: Vec<ScoredMemory>) {
        let stored_at = self.clock.now_ms();
        let ttl_ms = self.ttl_ms;
        self.entries.retain(|_, entry| entry.is_fresh(stored_at, ttl_ms));
        self.entries
            .insert(Self::key(query, options), CacheEntry { results, stored_at });
    }

    /// Drop every entry and start a new generation.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    /// Incremented by every [`SearchCache::invalidate_all`]. Results computed
    /// under an older generation must not be stored.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured time-to-live in milliseconds.
    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ManualClock;

    fn cache(clock: &Arc<ManualClock>) -> SearchCache {
        SearchCache::new(clock.clone(), DEFAULT_CACHE_TTL_MS)
    }

    #[test]
    fn test_hit_and_miss() {
        let clock = Arc::new(ManualClock::new(0));
        let mut cache = cache(&clock);
        let options = SearchOptions::default();

        assert!(cache.get("q", &options).is_none());
        cache.put("q", &options, Vec::new());
        assert_eq!(cache.get("q", &options), Some(Vec::new()));

        // Different options, different key.
        assert!(cache.get("q", &options.clone().with_limit(3)).is_none());
    }

    #[test]
    fn test_ttl_expiry() {
        let clock = Arc::new(ManualClock::new(0));
        let mut cache = cache(&clock);
        let options = SearchOptions::default();
        cache.put("q", &options, Vec::new());

        clock.advance(DEFAULT_CACHE_TTL_MS - 1);
        assert!(cache.get("q", &options).is_some());

        clock.advance(1);
        assert!(cache.get("q", &options).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_prunes_expired_entries() {
        let clock = Arc::new(ManualClock::new(0));
        let mut cache = cache(&clock);
        let options = SearchOptions::default();
        cache.put("a", &options, Vec::new());
        cache.put("b", &options, Vec::new());

        clock.advance(DEFAULT_CACHE_TTL_MS);
        cache.put("c", &options, Vec::new());
        assert_eq!(cache.len(), 1);
        assert!(cache.get("c", &options).is_some());
    }

    #[test]
    fn test_invalidate_all() {
        let clock = Arc::new(ManualClock::new(0));
        let mut cache = cache(&clock);
        let options = SearchOptions::default();
        cache.put("a", &options, Vec::new());
        cache.put("b", &options, Vec::new());
        assert_eq!(cache.len(), 2);

        let before = cache.generation();
        cache.invalidate_all();
        assert!(cache.get("a", &options).is_none());
        assert!(cache.get("b", &options).is_none());
        assert_eq!(cache.generation(), before + 1);
    }
}
