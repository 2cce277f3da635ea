//! Store-on-write, search-on-read orchestration.

use std::sync::{Arc, Mutex};

use futures::stream;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info, warn};

use super::stats::MemoryStats;
use crate::config::RecollectConfig;
use crate::export::{export_jsonl, ExportStats};
use crate::extraction::{
    categorize_content, collapse_whitespace, extract_top_keywords, FactExtractor,
};
use crate::import::{import_jsonl, ImportStats, DEFAULT_BATCH_SIZE};
use crate::injection::{format_memories, FormatOptions};
use crate::retrieval::{RankedSearch, SearchCache};
use crate::traits::{Clock, MemoryStore, PromptSurface, SystemClock};
use crate::types::{
    Category, Memory, MemoryMetadata, MemorySource, ScoredMemory, SearchOptions, UserCounters,
};

/// Confidence of memories the user saved explicitly.
const MANUAL_CONFIDENCE: f32 = 1.0;

/// Entry point of the engine.
///
/// Owns the search cache and is the only place store failures are absorbed:
/// every public operation logs the failure and returns an empty result,
/// `false`, an empty string or stats carrying the error.
pub struct MemoryManager {
    store: Arc<dyn MemoryStore>,
    clock: Arc<dyn Clock>,
    extractor: FactExtractor,
    ranked: RankedSearch,
    cache: Mutex<SearchCache>,
    config: RecollectConfig,
}

impl MemoryManager {
    /// Create a manager on the wall clock.
    pub fn new(store: Arc<dyn MemoryStore>, config: RecollectConfig) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    /// Create a manager with an explicit clock.
    pub fn with_clock(
        store: Arc<dyn MemoryStore>,
        clock: Arc<dyn Clock>,
        config: RecollectConfig,
    ) -> Self {
        let ranked = RankedSearch::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            config.retrieval.clone(),
        );
        let cache = SearchCache::new(Arc::clone(&clock), config.cache.ttl_ms());
        info!(store = store.name(), "Memory manager ready");
        Self {
            store,
            clock,
            extractor: FactExtractor::new(),
            ranked,
            cache: Mutex::new(cache),
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &RecollectConfig {
        &self.config
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn MemoryStore> {
        &self.store
    }

    /// Search options built from the configured defaults.
    pub fn default_search_options(&self) -> SearchOptions {
        SearchOptions::default()
            .with_limit(self.config.retrieval.default_limit)
            .with_threshold(self.config.retrieval.default_threshold)
    }

    /// Format options built from the configured defaults.
    pub fn default_format_options(&self) -> FormatOptions {
        FormatOptions::from(&self.config.injection)
    }

    /// Extract facts from `text` and persist one memory per fact.
    ///
    /// When nothing matches and the whitespace-collapsed text is long enough,
    /// a single `general` memory is stored instead. Returns the memories that
    /// were saved.
    pub async fn store_from_text(&self, text: &str, platform: &str) -> Vec<Memory> {
        let now = self.clock.now_ms();
        let max_keywords = self.config.extraction.max_keywords;
        let facts = self.extractor.extract(text, now);

        let candidates: Vec<Memory> = if facts.is_empty() {
            let collapsed = collapse_whitespace(text);
            if collapsed.chars().count() <= self.config.extraction.fallback_min_length {
                debug!("No facts and text too short for a general memory");
                return Vec::new();
            }
            let keywords = extract_top_keywords(&collapsed, max_keywords);
            vec![Memory::general(
                &collapsed,
                text,
                categorize_content(&collapsed),
                self.config.extraction.fallback_confidence,
                platform,
                now,
            )
            .with_keywords(keywords)]
        } else {
            facts
                .iter()
                .map(|fact| {
                    let keywords = extract_top_keywords(&fact.original, max_keywords);
                    Memory::from_fact(fact, text, platform, keywords, now)
                })
                .collect()
        };

        let saved = self.save_all(candidates).await;
        if !saved.is_empty() {
            self.bump_memories_created(saved.len() as u64, now).await;
        }
        info!(platform = %platform, stored = saved.len(), "Stored memories from text");
        saved
    }

    /// Save a user-selected snippet verbatim.
    ///
    /// The category is taken from `category` or guessed from the text.
    pub async fn store_manual(
        &self,
        text: &str,
        platform: &str,
        category: Option<Category>,
    ) -> Option<Memory> {
        let content = collapse_whitespace(text);
        if content.is_empty() {
            return None;
        }

        let now = self.clock.now_ms();
        let category = category.unwrap_or_else(|| categorize_content(&content));
        let keywords = extract_top_keywords(&content, self.config.extraction.max_keywords);
        let metadata = MemoryMetadata::new(
            category,
            MANUAL_CONFIDENCE,
            platform,
            MemorySource::ManualSelection,
        )
        .with_keywords(keywords);
        let memory = Memory::new(&content, text, metadata, now);

        let saved = self.save_all(vec![memory]).await.into_iter().next()?;
        self.bump_memories_created(1, now).await;
        Some(saved)
    }

    /// Ranked memories for `query`, served from the cache when fresh.
    ///
    /// Cache hits have no side effects: no access is recorded and no
    /// counter changes.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Vec<ScoredMemory> {
        let cache_enabled = self.config.cache.enabled;
        let mut generation = 0;

        if cache_enabled {
            if let Ok(mut cache) = self.cache.lock() {
                if let Some(hit) = cache.get(query, options) {
                    debug!(query = %query, results = hit.len(), "Search cache hit");
                    return hit;
                }
                generation = cache.generation();
            }
        }

        let results = match self.ranked.search(query, options).await {
            Ok(results) => results,
            Err(e) => {
                warn!(query = %query, error = %e, "Search failed, returning no memories");
                return Vec::new();
            }
        };

        if cache_enabled {
            if let Ok(mut cache) = self.cache.lock() {
                if cache.generation() == generation {
                    cache.put(query, options, results.clone());
                }
            }
        }
        results
    }

    /// Search and render the results as a context block.
    pub async fn get_context(
        &self,
        query: &str,
        options: &SearchOptions,
        format: &FormatOptions,
    ) -> String {
        let memories: Vec<Memory> = self
            .search(query, options)
            .await
            .into_iter()
            .map(|s| s.memory)
            .collect();
        format_memories(&memories, format)
    }

    /// Append relevant context to the prompt currently on `surface`.
    ///
    /// Returns whether the prompt was changed.
    pub async fn enhance_prompt(&self, surface: &dyn PromptSurface) -> bool {
        let input = match surface.get_input().await {
            Ok(input) => input,
            Err(e) => {
                warn!(platform = surface.platform(), error = %e, "Failed to read prompt");
                return false;
            }
        };
        if input.trim().is_empty() {
            return false;
        }

        let context = self
            .get_context(
                &input,
                &self.default_search_options(),
                &self.default_format_options(),
            )
            .await;
        if context.is_empty() {
            debug!(platform = surface.platform(), "No context for prompt");
            return false;
        }

        match surface.set_input(&format!("{}\n\n{}", input, context)).await {
            Ok(()) => true,
            Err(e) => {
                warn!(platform = surface.platform(), error = %e, "Failed to write prompt");
                false
            }
        }
    }

    /// Every stored memory.
    pub async fn list(&self) -> Vec<Memory> {
        self.store.list().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list memories");
            Vec::new()
        })
    }

    /// One memory by id.
    pub async fn get(&self, id: &str) -> Option<Memory> {
        self.store.get(id).await.unwrap_or_else(|e| {
            warn!(memory_id = %id, error = %e, "Failed to get memory");
            None
        })
    }

    /// Delete one memory.
    pub async fn delete(&self, id: &str) -> bool {
        match self.store.delete(id).await {
            Ok(deleted) => {
                self.invalidate_cache();
                deleted
            }
            Err(e) => {
                warn!(memory_id = %id, error = %e, "Failed to delete memory");
                false
            }
        }
    }

    /// Delete every memory. Usage counters are kept.
    pub async fn clear(&self) -> bool {
        match self.store.clear().await {
            Ok(cleared) => {
                self.invalidate_cache();
                info!("Cleared all memories");
                cleared
            }
            Err(e) => {
                warn!(error = %e, "Failed to clear memories");
                false
            }
        }
    }

    /// Counts per category and platform plus usage counters.
    pub async fn stats(&self) -> MemoryStats {
        let memories = self.list().await;
        let counters = self.store.get_user_counters().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read usage counters");
            UserCounters::default()
        });
        MemoryStats::from_memories(&memories, counters)
    }

    /// Write every memory to `writer` as JSON Lines.
    ///
    /// Store and writer failures are logged and recorded in the returned
    /// stats.
    pub async fn export_jsonl<W>(&self, writer: W) -> ExportStats
    where
        W: AsyncWrite + Unpin,
    {
        let memories = match self.store.list().await {
            Ok(memories) => memories,
            Err(e) => {
                warn!(error = %e, "Failed to list memories for export");
                let mut stats = ExportStats::new();
                stats.errors.push(format!("Store error: {}", e));
                return stats;
            }
        };

        let total = memories.len() as u64;
        export_jsonl(stream::iter(memories), writer)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Export failed");
                let mut stats = ExportStats::new();
                stats.total = total;
                stats.errors.push(format!("Write error: {}", e));
                stats
            })
    }

    /// Restore memories from JSON Lines. Ids already present are skipped.
    ///
    /// Read failures and rejected saves are logged and recorded in the
    /// returned stats.
    pub async fn import_jsonl<R>(&self, reader: R) -> ImportStats
    where
        R: AsyncBufRead + Unpin,
    {
        let store = Arc::clone(&self.store);
        let failures = Arc::new(Mutex::new(Vec::new()));
        let batch_failures = Arc::clone(&failures);

        let result = import_jsonl(reader, DEFAULT_BATCH_SIZE, |batch| {
            let store = Arc::clone(&store);
            let failures = Arc::clone(&batch_failures);
            async move {
                let mut imported = 0;
                for memory in batch {
                    let id = memory.id.clone();
                    match store.save(memory).await {
                        Ok(_) => imported += 1,
                        Err(e) if e.is_duplicate() => {}
                        Err(e) => {
                            warn!(memory_id = %id, error = %e, "Failed to import memory");
                            if let Ok(mut failures) = failures.lock() {
                                failures.push(format!("Save error for memory {}: {}", id, e));
                            }
                        }
                    }
                }
                Ok(imported)
            }
        })
        .await;

        let mut stats = result.unwrap_or_else(|e| {
            warn!(error = %e, "Import aborted");
            let mut stats = ImportStats::new();
            stats.errors.push(format!("Read error: {}", e));
            stats
        });
        if let Ok(mut failures) = failures.lock() {
            stats.errors.append(&mut failures);
        }

        if stats.imported > 0 {
            self.invalidate_cache();
        }
        stats
    }

    /// Wait for access records spawned by earlier searches.
    pub async fn flush_access(&self) {
        self.ranked.flush_access().await;
    }

    async fn save_all(&self, memories: Vec<Memory>) -> Vec<Memory> {
        let mut saved = Vec::with_capacity(memories.len());
        for memory in memories {
            match self.store.save(memory).await {
                Ok(memory) => saved.push(memory),
                Err(e) => warn!(error = %e, "Failed to save memory"),
            }
        }
        if !saved.is_empty() {
            self.invalidate_cache();
        }
        saved
    }

    async fn bump_memories_created(&self, count: u64, now: i64) {
        let mut counters = match self.store.get_user_counters().await {
            Ok(counters) => counters,
            Err(e) => {
                warn!(error = %e, "Failed to read usage counters");
                return;
            }
        };
        counters.memories_created += count;
        counters.last_active = Some(now);
        if let Err(e) = self.store.set_user_counters(counters).await {
            warn!(error = %e, "Failed to update usage counters");
        }
    }

    fn invalidate_cache(&self) {
        match self.cache.lock() {
            Ok(mut cache) => cache.invalidate_all(),
            Err(_) => warn!("Search cache lock poisoned"),
        }
    }
}
