//! Storage contract required by the engine.

use async_trait::async_trait;

use crate::error::RecollectResult;
use crate::types::{Memory, UserCounters};

/// Persistence backend for memories.
///
/// The engine never inspects how `search` computes its raw score; it only
/// relies on the score being in `[0, 1]` and the result being best-first.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Persist a new memory. Fails if the id already exists.
    async fn save(&self, memory: Memory) -> RecollectResult<Memory>;

    /// Fetch a memory by id.
    async fn get(&self, id: &str) -> RecollectResult<Option<Memory>>;

    /// All memories, oldest first.
    async fn list(&self) -> RecollectResult<Vec<Memory>>;

    /// Best-effort relevance search returning `(memory, raw_score)` pairs.
    async fn search(&self, query: &str, limit: usize) -> RecollectResult<Vec<(Memory, f32)>>;

    /// Record one retrieval: bump the access count and set last access.
    /// Returns false if the memory no longer exists.
    async fn touch(&self, id: &str, at_ms: i64) -> RecollectResult<bool>;

    /// Delete a memory. Returns whether something was removed.
    async fn delete(&self, id: &str) -> RecollectResult<bool>;

    /// Remove every memory.
    async fn clear(&self) -> RecollectResult<bool>;

    /// Read the usage counters.
    async fn get_user_counters(&self) -> RecollectResult<UserCounters>;

    /// Replace the usage counters.
    async fn set_user_counters(&self, counters: UserCounters) -> RecollectResult<()>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}
