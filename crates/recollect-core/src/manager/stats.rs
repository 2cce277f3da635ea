//! Aggregate statistics about stored memories.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Memory, UserCounters};

/// Snapshot of the memory set and usage counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    /// Number of stored memories.
    pub total: usize,
    /// Memory count per category name.
    pub by_category: BTreeMap<String, usize>,
    /// Memory count per platform.
    pub by_platform: BTreeMap<String, usize>,
    /// Usage counters kept by the store.
    pub counters: UserCounters,
}

impl MemoryStats {
    /// Tally `memories`.
    pub fn from_memories(memories: &[Memory], counters: UserCounters) -> Self {
        let mut by_category = BTreeMap::new();
        let mut by_platform = BTreeMap::new();
        for memory in memories {
            *by_category
                .entry(memory.category().as_str().to_string())
                .or_insert(0) += 1;
            *by_platform
                .entry(memory.metadata.platform.clone())
                .or_insert(0) += 1;
        }
        Self {
            total: memories.len(),
            by_category,
            by_platform,
            counters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, MemoryMetadata, MemorySource};

    #[test]
    fn test_from_memories() {
        let memories: Vec<Memory> = [
            (Category::Hobby, "claude"),
            (Category::Hobby, "chatgpt"),
            (Category::Work, "claude"),
        ]
        .into_iter()
        .map(|(category, platform)| {
            let meta = MemoryMetadata::new(category, 0.5, platform, MemorySource::AutoExtract);
            Memory::new("x", "x", meta, 0)
        })
        .collect();

        let stats = MemoryStats::from_memories(&memories, UserCounters::default());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_category["hobby"], 2);
        assert_eq!(stats.by_category["work"], 1);
        assert_eq!(stats.by_platform["claude"], 2);
    }
}
