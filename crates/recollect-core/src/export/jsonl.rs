//! JSON Lines export.

use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::info;

use crate::error::RecollectResult;
use crate::types::Memory;

/// Statistics from an export operation.
#[derive(Debug, Default, Clone)]
pub struct ExportStats {
    /// Memories pulled from the stream.
    pub total: u64,
    /// Memories written.
    pub exported: u64,
    /// One message per failed memory.
    pub errors: Vec<String>,
}

impl ExportStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every memory was written.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.total == self.exported
    }
}

/// Write memories to `writer`, one JSON object per line.
///
/// Per-memory failures are recorded in the stats and do not stop the
/// export.
pub async fn export_jsonl<W, S>(memories: S, writer: W) -> RecollectResult<ExportStats>
where
    W: AsyncWrite + Unpin,
    S: Stream<Item = Memory>,
{
    let mut stats = ExportStats::new();
    let mut writer = BufWriter::new(writer);
    let mut memories = std::pin::pin!(memories);

    while let Some(memory) = memories.next().await {
        stats.total += 1;

        let mut line = match serde_json::to_string(&memory) {
            Ok(json) => json,
            Err(e) => {
                stats
                    .errors
                    .push(format!("Serialization error for memory {}: {}", memory.id, e));
                continue;
            }
        };
        line.push('\n');

        if let Err(e) = writer.write_all(line.as_bytes()).await {
            stats
                .errors
                .push(format!("Write error for memory {}: {}", memory.id, e));
            continue;
        }
        stats.exported += 1;
    }

    if let Err(e) = writer.flush().await {
        stats.errors.push(format!("Final flush error: {}", e));
    }

    info!(total = stats.total, exported = stats.exported, "Export finished");
    Ok(stats)
}
