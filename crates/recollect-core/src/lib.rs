//! recollect-core - Core library for recollect.
//!
//! Extracts durable facts from conversational text, stores them as
//! memories, and retrieves a ranked, formatted subset to prepend to later
//! prompts.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use recollect_core::{InMemoryStore, MemoryManager, RecollectConfig, SearchOptions};
//!
//! let manager = MemoryManager::new(Arc::new(InMemoryStore::new()), RecollectConfig::default());
//!
//! manager.store_from_text("My name is Alice and I live in Boston.", "claude").await;
//!
//! let context = manager
//!     .get_context("where do I live", &SearchOptions::default(), &Default::default())
//!     .await;
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod import;
pub mod injection;
pub mod manager;
pub mod retrieval;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::RecollectConfig;
pub use error::{ErrorCode, RecollectError, RecollectResult};
pub use export::{export_jsonl, ExportStats};
pub use extraction::{categorize_content, extract_facts, extract_keywords, FactExtractor};
pub use import::{import_jsonl, ImportStats};
pub use injection::{format_memories, FormatOptions};
pub use manager::{MemoryManager, MemoryStats};
pub use retrieval::{RankedSearch, SearchCache};
pub use store::InMemoryStore;
pub use traits::{Clock, ManualClock, MemoryStore, PromptSurface, SystemClock};
pub use types::{
    Category, Fact, Memory, MemoryMetadata, MemorySource, ScoredMemory, SearchOptions,
    UserCounters,
};
