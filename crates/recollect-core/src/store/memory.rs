//! In-process memory store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::lexical::rank_lexically;
use crate::error::{RecollectError, RecollectResult};
use crate::traits::MemoryStore;
use crate::types::{Memory, UserCounters};

/// Volatile store backed by a vector; useful for tests, demos and as the
/// reference implementation of [`MemoryStore`].
#[derive(Default)]
pub struct InMemoryStore {
    memories: RwLock<Vec<Memory>>,
    counters: RwLock<UserCounters>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with memories.
    pub fn with_memories(memories: Vec<Memory>) -> Self {
        Self {
            memories: RwLock::new(memories),
            counters: RwLock::new(UserCounters::default()),
        }
    }

    /// Number of stored memories.
    pub async fn len(&self) -> usize {
        self.memories.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.memories.read().await.is_empty()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn save(&self, memory: Memory) -> RecollectResult<Memory> {
        memory.validate()?;
        let mut memories = self.memories.write().await;
        if memories.iter().any(|m| m.id == memory.id) {
            return Err(RecollectError::duplicate(&memory.id));
        }
        memories.push(memory.clone());
        Ok(memory)
    }

    async fn get(&self, id: &str) -> RecollectResult<Option<Memory>> {
        Ok(self
            .memories
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn list(&self) -> RecollectResult<Vec<Memory>> {
        Ok(self.memories.read().await.clone())
    }

    async fn search(&self, query: &str, limit: usize) -> RecollectResult<Vec<(Memory, f32)>> {
        let memories = self.memories.read().await.clone();
        Ok(rank_lexically(query, memories, limit))
    }

    async fn touch(&self, id: &str, at_ms: i64) -> RecollectResult<bool> {
        let mut memories = self.memories.write().await;
        match memories.iter_mut().find(|m| m.id == id) {
            Some(memory) => {
                memory.access_count += 1;
                memory.last_accessed = at_ms;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> RecollectResult<bool> {
        let mut memories = self.memories.write().await;
        let before = memories.len();
        memories.retain(|m| m.id != id);
        Ok(memories.len() != before)
    }

    async fn clear(&self) -> RecollectResult<bool> {
        self.memories.write().await.clear();
        Ok(true)
    }

    async fn get_user_counters(&self) -> RecollectResult<UserCounters> {
        Ok(self.counters.read().await.clone())
    }

    async fn set_user_counters(&self, counters: UserCounters) -> RecollectResult<()> {
        *self.counters.write().await = counters;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
