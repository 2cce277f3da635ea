//! recollect-stores - Persistent [`MemoryStore`] backends for recollect.
//!
//! # Example
//!
//! ```ignore
//! use recollect_stores::SqliteMemoryStore;
//!
//! let store = SqliteMemoryStore::open("~/.recollect/memories.db")?;
//! ```
//!
//! [`MemoryStore`]: recollect_core::MemoryStore

pub mod sqlite;

pub use sqlite::SqliteMemoryStore;
