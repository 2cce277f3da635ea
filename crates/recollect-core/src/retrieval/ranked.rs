//! Ranked search over a memory store.

use std::cmp::Reverse;
use std::sync::{Arc, Mutex};

use ordered_float::OrderedFloat;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::scoring::enhanced_score;
use crate::config::RetrievalConfig;
use crate::error::RecollectResult;
use crate::traits::{Clock, MemoryStore};
use crate::types::{ScoredMemory, SearchOptions};

/// Background recorder for memory accesses.
///
/// Each returned memory gets its own `touch` task so the caller never waits
/// on the store. [`AccessTracker::flush`] awaits whatever is still pending.
#[derive(Default)]
pub struct AccessTracker {
    pending: Mutex<JoinSet<()>>,
}

impl AccessTracker {
    /// Create an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn one access record per id. Must be called inside a tokio runtime.
    pub fn record(&self, store: &Arc<dyn MemoryStore>, ids: Vec<String>, at_ms: i64) {
        let Ok(mut pending) = self.pending.lock() else {
            warn!("Access tracker lock poisoned, dropping access records");
            return;
        };
        while pending.try_join_next().is_some() {}

        for id in ids {
            let store = Arc::clone(store);
            pending.spawn(async move {
                match store.touch(&id, at_ms).await {
                    Ok(true) => {}
                    Ok(false) => debug!(memory_id = %id, "Touched memory no longer exists"),
                    Err(e) => warn!(memory_id = %id, error = %e, "Failed to record access"),
                }
            });
        }
    }

    /// Number of records not yet reaped.
    pub fn pending(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Wait for every outstanding access record.
    pub async fn flush(&self) {
        let mut pending = match self.pending.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return,
        };
        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Access record task failed");
            }
        }
    }
}

/// Retrieves, filters, boosts and ranks memories for a query.
pub struct RankedSearch {
    store: Arc<dyn MemoryStore>,
    clock: Arc<dyn Clock>,
    config: RetrievalConfig,
    access: AccessTracker,
}

impl RankedSearch {
    /// Create a ranked search over `store`.
    pub fn new(store: Arc<dyn MemoryStore>, clock: Arc<dyn Clock>, config: RetrievalConfig) -> Self {
        Self {
            store,
            clock,
            config,
            access: AccessTracker::new(),
        }
    }

    /// Retrieval settings in use.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Ranked memories for `query`.
    ///
    /// Returns at most `options.limit` results, each with a raw score of at
    /// least `options.threshold`, ordered by enhanced score with store order
    /// breaking ties. Store failures propagate.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> RecollectResult<Vec<ScoredMemory>> {
        if options.limit == 0 {
            return Ok(Vec::new());
        }

        let now = self.clock.now_ms();
        let fetch = options.limit.saturating_mul(self.config.oversample_factor.max(1));
        let candidates = self.store.search(query, fetch).await?;
        let candidate_count = candidates.len();

        let mut scored: Vec<ScoredMemory> = candidates
            .into_iter()
            .filter(|(memory, _)| options.admits(memory, now))
            .filter(|(_, raw)| *raw >= options.threshold)
            .map(|(memory, raw_score)| {
                let score = enhanced_score(raw_score, &memory, now);
                ScoredMemory {
                    memory,
                    raw_score,
                    score,
                }
            })
            .collect();

        scored.sort_by_key(|s| Reverse(OrderedFloat(s.score)));
        scored.truncate(options.limit);

        debug!(
            query = %query,
            candidates = candidate_count,
            returned = scored.len(),
            "Ranked search complete"
        );

        if self.config.persist_access && !scored.is_empty() {
            let ids = scored.iter().map(|s| s.memory.id.clone()).collect();
            self.access.record(&self.store, ids, now);
        }

        if !scored.is_empty() {
            self.bump_prompts_enhanced(now).await;
        }

        Ok(scored)
    }

    /// Wait for pending access records.
    pub async fn flush_access(&self) {
        self.access.flush().await;
    }

    /// Pending access records.
    pub fn pending_access(&self) -> usize {
        self.access.pending()
    }

    async fn bump_prompts_enhanced(&self, now: i64) {
        let mut counters = match self.store.get_user_counters().await {
            Ok(counters) => counters,
            Err(e) => {
                warn!(error = %e, "Failed to read usage counters");
                return;
            }
        };
        counters.prompts_enhanced += 1;
        counters.last_active = Some(now);
        if let Err(e) = self.store.set_user_counters(counters).await {
            warn!(error = %e, "Failed to update usage counters");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::traits::ManualClock;
    use crate::types::{Category, Memory, MemoryMetadata, MemorySource};

    const DAY_MS: i64 = 86_400_000;

    fn memory(id: &str, content: &str, category: Category, confidence: f32, ts: i64) -> Memory {
        let meta = MemoryMetadata::new(category, confidence, "cli", MemorySource::AutoExtract);
        Memory::new(content, content, meta, ts).with_id(id)
    }

    fn search_over(
        memories: Vec<Memory>,
        now: i64,
        config: RetrievalConfig,
    ) -> (Arc<InMemoryStore>, RankedSearch) {
        let store = Arc::new(InMemoryStore::with_memories(memories));
        let search = RankedSearch::new(store.clone(), Arc::new(ManualClock::new(now)), config);
        (store, search)
    }

    #[tokio::test]
    async fn test_confidence_dominates_ranking() {
        let (_, search) = search_over(
            vec![
                memory("low", "hiking trails", Category::Hobby, 0.3, 0),
                memory("high", "hiking", Category::Preference, 0.9, 0),
            ],
            0,
            RetrievalConfig::default(),
        );

        let results = search
            .search("hiking trails", &SearchOptions::default())
            .await
            .unwrap();
        let ids: Vec<&str> = results.iter().map(|s| s.memory.id.as_str()).collect();
        // "low" matches both terms (raw 1.0) but "high" wins on confidence.
        assert_eq!(ids, vec!["high", "low"]);
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_limit_and_threshold_hold() {
        let memories = (0..8)
            .map(|i| memory(&format!("m{}", i), "coffee beans", Category::Preference, 0.5, 0))
            .collect();
        let (_, search) = search_over(memories, 0, RetrievalConfig::default());

        let options = SearchOptions::default().with_limit(3);
        let results = search.search("coffee", &options).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|s| s.raw_score >= options.threshold));
    }

    #[tokio::test]
    async fn test_high_threshold_returns_empty() {
        let (_, search) = search_over(
            vec![memory("m", "rust code", Category::Tech, 0.8, 0)],
            0,
            RetrievalConfig::default(),
        );
        // One of three terms matches: raw score 0.33.
        let options = SearchOptions::default().with_threshold(0.9);
        let results = search.search("rust python golang", &options).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_zero_limit() {
        let (_, search) = search_over(
            vec![memory("m", "rust", Category::Tech, 0.8, 0)],
            0,
            RetrievalConfig::default(),
        );
        let results = search
            .search("rust", &SearchOptions::default().with_limit(0))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_filters_apply() {
        let now = 30 * DAY_MS;
        let (_, search) = search_over(
            vec![
                memory("old", "tennis club", Category::Hobby, 0.8, 0),
                memory("general", "tennis match", Category::General, 0.8, now),
                memory("fresh", "tennis racket", Category::Hobby, 0.8, now),
            ],
            now,
            RetrievalConfig::default(),
        );

        let options = SearchOptions::default()
            .with_include_general(false)
            .with_time_range_ms(7 * DAY_MS);
        let results = search.search("tennis", &options).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|s| s.memory.id.as_str()).collect();
        assert_eq!(ids, vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_ties_keep_store_order() {
        // Same content, confidence and age: equal scores. The store orders
        // equal raw scores newest first.
        let (_, search) = search_over(
            vec![
                memory("a", "chess", Category::Hobby, 0.5, 10),
                memory("b", "chess", Category::Hobby, 0.5, 20),
            ],
            20,
            RetrievalConfig::default(),
        );
        let results = search.search("chess", &SearchOptions::default()).await.unwrap();
        assert_eq!(results[0].memory.id, "b");
        assert_eq!(results[1].memory.id, "a");
    }

    #[tokio::test]
    async fn test_prompts_enhanced_counter() {
        let (store, search) = search_over(
            vec![memory("m", "gardening", Category::Hobby, 0.8, 0)],
            1_234,
            RetrievalConfig::default(),
        );

        search.search("astronomy", &SearchOptions::default()).await.unwrap();
        assert_eq!(store.get_user_counters().await.unwrap().prompts_enhanced, 0);

        search.search("gardening", &SearchOptions::default()).await.unwrap();
        let counters = store.get_user_counters().await.unwrap();
        assert_eq!(counters.prompts_enhanced, 1);
        assert_eq!(counters.last_active, Some(1_234));
    }

    // Access persistence is configurable; the two tests below pin both
    // behaviors of the `persist_access` flag.

    #[tokio::test]
    async fn test_access_ambiguity_persisted_when_enabled() {
        let (store, search) = search_over(
            vec![memory("m", "sailing", Category::Hobby, 0.8, 0)],
            500,
            RetrievalConfig::default(),
        );

        for _ in 0..3 {
            search.search("sailing", &SearchOptions::default()).await.unwrap();
        }
        search.flush_access().await;
        assert_eq!(search.pending_access(), 0);

        let stored = store.get("m").await.unwrap().unwrap();
        assert_eq!(stored.access_count, 3);
        assert_eq!(stored.last_accessed, 500);

        let results = search.search("sailing", &SearchOptions::default()).await.unwrap();
        // Boost reflects the three persisted accesses.
        let expected = 1.0 + 2.0 + 0.3 + 1.6;
        assert!((results[0].score - expected).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_access_ambiguity_inert_when_disabled() {
        let config = RetrievalConfig {
            persist_access: false,
            ..RetrievalConfig::default()
        };
        let (store, search) = search_over(
            vec![memory("m", "sailing", Category::Hobby, 0.8, 0)],
            500,
            config,
        );

        for _ in 0..3 {
            search.search("sailing", &SearchOptions::default()).await.unwrap();
        }
        search.flush_access().await;

        let stored = store.get("m").await.unwrap().unwrap();
        assert_eq!(stored.access_count, 0);
        assert_eq!(stored.last_accessed, 0);
    }
}
