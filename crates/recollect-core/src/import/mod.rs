//! Import utilities for memory data.
//!
//! Reads the JSON Lines format produced by [`crate::export`] in batches.
//!
//! # Example
//!
//! ```ignore
//! use recollect_core::import::import_jsonl;
//! use tokio::fs::File;
//! use tokio::io::BufReader;
//!
//! let reader = BufReader::new(File::open("memories.jsonl").await?);
//! let stats = import_jsonl(reader, 100, |batch| async move { Ok(batch.len()) }).await?;
//! println!("Imported {}/{}", stats.imported, stats.total);
//! ```

pub mod jsonl;

pub use jsonl::{import_jsonl, ImportStats, DEFAULT_BATCH_SIZE};
