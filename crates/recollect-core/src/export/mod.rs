//! Export utilities for memory data.
//!
//! Memories are written as JSON Lines: one memory per line in its
//! interchange JSON shape, so output can be streamed, appended and piped
//! through line-oriented tools.
//!
//! # Example
//!
//! ```ignore
//! use recollect_core::export::export_jsonl;
//! use tokio::fs::File;
//!
//! let file = File::create("memories.jsonl").await?;
//! let stats = export_jsonl(futures::stream::iter(memories), file).await?;
//! println!("Exported {} memories", stats.exported);
//! ```

pub mod jsonl;

pub use jsonl::{export_jsonl, ExportStats};
