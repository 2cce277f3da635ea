//! Search option types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::memory::Memory;

/// Default number of results.
pub const DEFAULT_LIMIT: usize = 10;

/// Default minimum raw score.
pub const DEFAULT_THRESHOLD: f32 = 0.3;

/// Options recognised by ranked search.
///
/// Unknown fields are ignored when deserializing. Sets are ordered so the
/// serialized form is stable and can be used as a cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOptions {
    /// Maximum number of results.
    pub limit: usize,
    /// Minimum raw score a memory needs to be returned.
    pub threshold: f32,
    /// Whether `general` memories may be returned.
    pub include_general: bool,
    /// Platform allow-list; empty means any.
    pub platforms: BTreeSet<String>,
    /// Category allow-list; empty means any.
    pub categories: BTreeSet<String>,
    /// Only memories created within this many milliseconds.
    #[serde(rename = "timeRange", skip_serializing_if = "Option::is_none")]
    pub time_range_ms: Option<i64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            threshold: DEFAULT_THRESHOLD,
            include_general: true,
            platforms: BTreeSet::new(),
            categories: BTreeSet::new(),
            time_range_ms: None,
        }
    }
}

impl SearchOptions {
    /// Set the result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the raw-score threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Include or exclude `general` memories.
    pub fn with_include_general(mut self, include_general: bool) -> Self {
        self.include_general = include_general;
        self
    }

    /// Add a platform to the allow-list.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platforms.insert(platform.into());
        self
    }

    /// Add a category to the allow-list.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    /// Restrict to memories younger than `range_ms`.
    pub fn with_time_range_ms(mut self, range_ms: i64) -> Self {
        self.time_range_ms = Some(range_ms);
        self
    }

    /// Whether a memory passes the platform, category, general and recency
    /// filters. The raw-score threshold is checked separately.
    pub fn admits(&self, memory: &Memory, now_ms: i64) -> bool {
        if !self.platforms.is_empty() && !self.platforms.contains(&memory.metadata.platform) {
            return false;
        }
        if !self.categories.is_empty()
            && !self.categories.contains(memory.metadata.category.as_str())
        {
            return false;
        }
        if !self.include_general && memory.metadata.category.is_general() {
            return false;
        }
        if let Some(range) = self.time_range_ms {
            // A negative range is an empty window.
            if memory.timestamp < now_ms.saturating_sub(range.max(0)) {
                return false;
            }
        }
        true
    }

    /// Stable string form used as part of the cache key.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Aggregate usage statistics kept by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserCounters {
    /// Memories created through ingestion or manual saves.
    pub memories_created: u64,
    /// Searches that returned at least one memory.
    pub prompts_enhanced: u64,
    /// Last time a counter changed, epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<i64>,
}
