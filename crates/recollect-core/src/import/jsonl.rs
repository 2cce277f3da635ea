//! JSON Lines import.
//!
//! Lines are parsed and validated one at a time and handed to a callback in
//! batches, so the whole file is never held in memory.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::error::RecollectResult;
use crate::types::Memory;

/// Batch size used by the memory manager.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Statistics from an import operation.
#[derive(Debug, Default, Clone)]
pub struct ImportStats {
    /// Non-blank lines read.
    pub total: u64,
    /// Memories accepted by the callback.
    pub imported: u64,
    /// Memories the callback declined, such as duplicates.
    pub skipped: u64,
    /// Parse, validation and batch errors.
    pub errors: Vec<String>,
}

impl ImportStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no errors were recorded.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors as a percentage of lines read.
    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.errors.len() as f64 / self.total as f64) * 100.0
        }
    }

    fn record_batch(&mut self, batch_len: usize, result: RecollectResult<usize>) {
        match result {
            Ok(count) => {
                let count = count.min(batch_len);
                self.imported += count as u64;
                self.skipped += (batch_len - count) as u64;
            }
            Err(e) => self.errors.push(format!("Batch import error: {}", e)),
        }
    }
}

/// Import memories from JSON Lines.
///
/// Blank lines are ignored. Malformed or invalid lines are recorded as
/// errors and do not abort the import. `import_batch` receives up to
/// `batch_size` memories and returns how many it kept; the rest count as
/// skipped.
pub async fn import_jsonl<R, F, Fut>(
    reader: R,
    batch_size: usize,
    mut import_batch: F,
) -> RecollectResult<ImportStats>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(Vec<Memory>) -> Fut,
    Fut: Future<Output = RecollectResult<usize>>,
{
    let batch_size = batch_size.max(1);
    let mut stats = ImportStats::new();
    let mut batch = Vec::with_capacity(batch_size);
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.total += 1;

        let memory = match serde_json::from_str::<Memory>(line) {
            Ok(memory) => memory,
            Err(e) => {
                stats
                    .errors
                    .push(format!("Parse error at line {}: {}", stats.total, e));
                continue;
            }
        };
        if let Err(e) = memory.validate() {
            stats
                .errors
                .push(format!("Invalid memory at line {}: {}", stats.total, e));
            continue;
        }

        batch.push(memory);
        if batch.len() >= batch_size {
            let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
            let len = full.len();
            stats.record_batch(len, import_batch(full).await);
        }
    }

    if !batch.is_empty() {
        let len = batch.len();
        stats.record_batch(len, import_batch(batch).await);
    }

    info!(
        total = stats.total,
        imported = stats.imported,
        skipped = stats.skipped,
        errors = stats.errors.len(),
        "Import finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::io::BufReader;

    fn line(id: &str, content: &str) -> String {
        format!(
            r#"{{"id":"{id}","content":"{content}","originalText":"{content}","metadata":{{"type":"hobby","category":"hobby","confidence":0.7,"platform":"cli","source":"auto_extract","keywords":[]}},"timestamp":1,"lastAccessed":1,"accessCount":0}}"#
        )
    }

    #[tokio::test]
    async fn test_import_jsonl_basic() {
        let jsonl = [line("1", "chess"), line("2", "tennis")].join("\n");
        let reader = BufReader::new(Cursor::new(jsonl));

        let stats = import_jsonl(reader, 100, |batch| async move { Ok(batch.len()) })
            .await
            .unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.imported, 2);
        assert!(stats.is_success());
    }

    #[tokio::test]
    async fn test_import_jsonl_with_batching() {
        let jsonl = (0..25)
            .map(|i| line(&i.to_string(), "chess"))
            .collect::<Vec<_>>()
            .join("\n");
        let reader = BufReader::new(Cursor::new(jsonl));
        let mut batch_counts = Vec::new();

        let stats = import_jsonl(reader, 10, |batch| {
            let count = batch.len();
            batch_counts.push(count);
            async move { Ok(count) }
        })
        .await
        .unwrap();

        assert_eq!(stats.total, 25);
        assert_eq!(stats.imported, 25);
        assert_eq!(batch_counts, vec![10, 10, 5]);
    }

    #[tokio::test]
    async fn test_import_jsonl_errors_do_not_abort() {
        let invalid = line("3", "chess").replace("0.7", "1.7");
        let jsonl = [line("1", "chess"), "not json".to_string(), invalid, line("2", "go")]
            .join("\n");
        let reader = BufReader::new(Cursor::new(jsonl));

        let stats = import_jsonl(reader, 100, |batch| async move { Ok(batch.len()) })
            .await
            .unwrap();

        assert_eq!(stats.total, 4);
        assert_eq!(stats.imported, 2);
        assert_eq!(stats.errors.len(), 2);
        assert!(stats.errors[0].contains("Parse error at line 2"));
        assert!(stats.errors[1].contains("Invalid memory at line 3"));
        assert!((stats.error_rate() - 50.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_import_jsonl_skipped_and_blank_lines() {
        let jsonl = format!("{}\n\n{}\n\n", line("1", "chess"), line("2", "go"));
        let reader = BufReader::new(Cursor::new(jsonl));

        // Callback keeps only the first memory of each batch.
        let stats = import_jsonl(reader, 100, |batch| async move { Ok(batch.len().min(1)) })
            .await
            .unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.imported, 1);
        assert_eq!(stats.skipped, 1);
    }

    #[tokio::test]
    async fn test_import_jsonl_empty_input() {
        let reader = BufReader::new(Cursor::new(""));
        let stats = import_jsonl(reader, 100, |batch| async move { Ok(batch.len()) })
            .await
            .unwrap();

        assert_eq!(stats.total, 0);
        assert!(stats.is_success());
    }
}
