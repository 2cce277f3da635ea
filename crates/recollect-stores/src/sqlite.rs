//! SQLite-backed memory store.
//!
//! Memories live in a single `memories` table with the metadata object kept
//! as JSON. Usage counters live in a one-row `user_counters` table. Search
//! loads the memory set and ranks it with the shared lexical scorer.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use recollect_core::error::{ErrorCode, RecollectError, RecollectResult};
use recollect_core::store::rank_lexically;
use recollect_core::traits::MemoryStore;
use recollect_core::types::{Memory, MemoryMetadata, UserCounters};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS memories (
        id             TEXT PRIMARY KEY,
        content        TEXT NOT NULL,
        original_text  TEXT NOT NULL,
        metadata       TEXT NOT NULL,
        category       TEXT NOT NULL,
        platform       TEXT NOT NULL,
        timestamp      INTEGER NOT NULL,
        last_accessed  INTEGER NOT NULL,
        access_count   INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_memories_category ON memories(category);
    CREATE INDEX IF NOT EXISTS idx_memories_platform ON memories(platform);
    CREATE TABLE IF NOT EXISTS user_counters (
        id                INTEGER PRIMARY KEY CHECK (id = 1),
        memories_created  INTEGER NOT NULL DEFAULT 0,
        prompts_enhanced  INTEGER NOT NULL DEFAULT 0,
        last_active       INTEGER
    );
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, content, original_text, metadata, timestamp, last_accessed, access_count FROM memories";

/// Memory store on an embedded SQLite database.
pub struct SqliteMemoryStore {
    /// SQLite connection (wrapped in Mutex for Send + Sync).
    conn: Mutex<Connection>,
}

/// A memory row before its metadata JSON is decoded.
struct MemoryRow {
    id: String,
    content: String,
    original_text: String,
    metadata: String,
    timestamp: i64,
    last_accessed: i64,
    access_count: i64,
}

impl MemoryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content: row.get(1)?,
            original_text: row.get(2)?,
            metadata: row.get(3)?,
            timestamp: row.get(4)?,
            last_accessed: row.get(5)?,
            access_count: row.get(6)?,
        })
    }

    fn into_memory(self) -> RecollectResult<Memory> {
        let metadata: MemoryMetadata = serde_json::from_str(&self.metadata).map_err(|e| {
            RecollectError::parse(format!("Corrupt metadata for memory {}: {}", self.id, e))
        })?;
        Ok(Memory {
            id: self.id,
            content: self.content,
            original_text: self.original_text,
            metadata,
            timestamp: self.timestamp,
            last_accessed: self.last_accessed,
            access_count: self.access_count.max(0) as u64,
        })
    }
}

fn db_error(context: &str, e: rusqlite::Error) -> RecollectError {
    RecollectError::Database {
        message: format!("{}: {}", context, e),
        code: ErrorCode::DbOperationFailed,
        source: Some(Box::new(e)),
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl SqliteMemoryStore {
    /// Open (or create) a database file. `":memory:"` opens a private
    /// in-memory database.
    pub fn open(db_path: impl AsRef<Path>) -> RecollectResult<Self> {
        let path = db_path.as_ref();
        let conn = if path.to_str() == Some(":memory:") {
            Connection::open_in_memory()
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(path)
        }
        .map_err(|e| RecollectError::Database {
            message: format!("Failed to open SQLite database {}: {}", path.display(), e),
            code: ErrorCode::DbConnectionFailed,
            source: Some(Box::new(e)),
        })?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| db_error("Failed to create schema", e))?;

        info!(path = %path.display(), "Opened SQLite memory store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> RecollectResult<Self> {
        Self::open(":memory:")
    }

    fn conn(&self) -> RecollectResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RecollectError::database("SQLite connection lock poisoned"))
    }

    fn load_all(conn: &Connection) -> RecollectResult<Vec<Memory>> {
        let mut stmt = conn
            .prepare(&format!("{} ORDER BY rowid", SELECT_COLUMNS))
            .map_err(|e| db_error("Failed to prepare list", e))?;
        let rows = stmt
            .query_map([], MemoryRow::from_row)
            .map_err(|e| db_error("Failed to list memories", e))?;

        let mut memories = Vec::new();
        for row in rows {
            let row = row.map_err(|e| db_error("Failed to read memory row", e))?;
            memories.push(row.into_memory()?);
        }
        Ok(memories)
    }
}

#[async_trait]
impl MemoryStore for SqliteMemoryStore {
    async fn save(&self, memory: Memory) -> RecollectResult<Memory> {
        memory.validate()?;
        let metadata = serde_json::to_string(&memory.metadata)?;

        let conn = self.conn()?;
        let result = conn.execute(
            r#"
            INSERT INTO memories (
                id, content, original_text, metadata, category, platform,
                timestamp, last_accessed, access_count
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                memory.id,
                memory.content,
                memory.original_text,
                metadata,
                memory.metadata.category.as_str(),
                memory.metadata.platform,
                memory.timestamp,
                memory.last_accessed,
                memory.access_count as i64,
            ],
        );

        match result {
            Ok(_) => {
                debug!(memory_id = %memory.id, "Saved memory");
                Ok(memory)
            }
            Err(e) if is_constraint_violation(&e) => Err(RecollectError::duplicate(&memory.id)),
            Err(e) => Err(db_error("Failed to save memory", e)),
        }
    }

    async fn get(&self, id: &str) -> RecollectResult<Option<Memory>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                MemoryRow::from_row,
            )
            .optional()
            .map_err(|e| db_error("Failed to get memory", e))?;
        row.map(MemoryRow::into_memory).transpose()
    }

    async fn list(&self) -> RecollectResult<Vec<Memory>> {
        let conn = self.conn()?;
        Self::load_all(&conn)
    }

    async fn search(&self, query: &str, limit: usize) -> RecollectResult<Vec<(Memory, f32)>> {
        let memories = {
            let conn = self.conn()?;
            Self::load_all(&conn)?
        };
        Ok(rank_lexically(query, memories, limit))
    }

    async fn touch(&self, id: &str, at_ms: i64) -> RecollectResult<bool> {
        let conn = self.conn()?;
        let updated = conn
            .execute(
                "UPDATE memories SET access_count = access_count + 1, last_accessed = ?2 WHERE id = ?1",
                params![id, at_ms],
            )
            .map_err(|e| db_error("Failed to record access", e))?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &str) -> RecollectResult<bool> {
        let conn = self.conn()?;
        let deleted = conn
            .execute("DELETE FROM memories WHERE id = ?1", params![id])
            .map_err(|e| db_error("Failed to delete memory", e))?;
        Ok(deleted > 0)
    }

    async fn clear(&self) -> RecollectResult<bool> {
        let conn = self.conn()?;
        let deleted = conn
            .execute("DELETE FROM memories", [])
            .map_err(|e| db_error("Failed to clear memories", e))?;
        info!(deleted, "Cleared memories");
        Ok(true)
    }

    async fn get_user_counters(&self) -> RecollectResult<UserCounters> {
        let conn = self.conn()?;
        let counters = conn
            .query_row(
                "SELECT memories_created, prompts_enhanced, last_active FROM user_counters WHERE id = 1",
                [],
                |row| {
                    Ok(UserCounters {
                        memories_created: row.get::<_, i64>(0)?.max(0) as u64,
                        prompts_enhanced: row.get::<_, i64>(1)?.max(0) as u64,
                        last_active: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(|e| db_error("Failed to read usage counters", e))?;
        Ok(counters.unwrap_or_default())
    }

    async fn set_user_counters(&self, counters: UserCounters) -> RecollectResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO user_counters (id, memories_created, prompts_enhanced, last_active)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                memories_created = excluded.memories_created,
                prompts_enhanced = excluded.prompts_enhanced,
                last_active = excluded.last_active
            "#,
            params![
                counters.memories_created as i64,
                counters.prompts_enhanced as i64,
                counters.last_active,
            ],
        )
        .map_err(|e| db_error("Failed to write usage counters", e))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
