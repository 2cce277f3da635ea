//! Extracted fact type.

use serde::{Deserialize, Serialize};

use super::category::Category;

/// A candidate fact produced by the extractor.
///
/// Facts are transient: the manager turns each one into a [`super::Memory`]
/// straight away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Category of the rule that matched.
    #[serde(rename = "type")]
    pub fact_type: Category,
    /// Cleaned capture.
    pub content: String,
    /// Full matched span.
    pub original: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
    /// Extraction time, epoch milliseconds.
    pub timestamp: i64,
}

impl Fact {
    /// Deduplication key: type plus lowercased content.
    pub fn dedup_key(&self) -> (Category, String) {
        (self.fact_type, self.content.to_lowercase())
    }
}
