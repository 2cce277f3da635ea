//! Memory types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;
use super::fact::Fact;
use crate::error::{ErrorCode, RecollectError, RecollectResult};

/// Maximum number of characters in a memory's content.
pub const MAX_CONTENT_CHARS: usize = 200;

/// Maximum number of keywords kept per memory.
pub const MAX_KEYWORDS: usize = 10;

/// How a memory entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorySource {
    /// Produced by the fact extractor.
    AutoExtract,
    /// Fallback for text where no rule matched.
    GeneralContent,
    /// Explicitly selected and saved by the user.
    ManualSelection,
    /// Saved from a whole conversation turn.
    Conversation,
    /// Seeded fixtures.
    TestData,
}

/// Metadata attached to every memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    /// Kind of memory; `general` for fallback content.
    #[serde(rename = "type")]
    pub memory_type: Category,
    /// Category used for filtering and grouping.
    pub category: Category,
    /// Extraction confidence in `[0, 1]`.
    pub confidence: f32,
    /// Platform the text came from.
    pub platform: String,
    /// Provenance of the memory.
    pub source: MemorySource,
    /// Top keywords, most frequent first.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl MemoryMetadata {
    /// Metadata where type and category agree.
    pub fn new(
        category: Category,
        confidence: f32,
        platform: impl Into<String>,
        source: MemorySource,
    ) -> Self {
        Self {
            memory_type: category,
            category,
            confidence: clamp_confidence(confidence),
            platform: platform.into(),
            source,
            keywords: Vec::new(),
        }
    }

    /// Override the memory type.
    pub fn with_type(mut self, memory_type: Category) -> Self {
        self.memory_type = memory_type;
        self
    }

    /// Set the keywords, keeping at most [`MAX_KEYWORDS`].
    pub fn with_keywords(mut self, mut keywords: Vec<String>) -> Self {
        keywords.truncate(MAX_KEYWORDS);
        self.keywords = keywords;
        self
    }
}

/// A persisted memory.
///
/// Content never changes after creation; memories are only created and
/// deleted. The JSON shape is the export/import interchange format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    /// Unique identifier.
    pub id: String,
    /// Trimmed memory text, 1 to 200 characters.
    pub content: String,
    /// Verbatim source text.
    pub original_text: String,
    /// Classification and provenance.
    pub metadata: MemoryMetadata,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    /// Last retrieval time, epoch milliseconds.
    pub last_accessed: i64,
    /// Number of times the memory was returned by a search.
    #[serde(default)]
    pub access_count: u64,
}

impl Memory {
    /// Create a new memory with a fresh id.
    ///
    /// Content is trimmed and cut to [`MAX_CONTENT_CHARS`].
    pub fn new(
        content: impl AsRef<str>,
        original_text: impl Into<String>,
        metadata: MemoryMetadata,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: truncate_content(content.as_ref()),
            original_text: original_text.into(),
            metadata,
            timestamp: now_ms,
            last_accessed: now_ms,
            access_count: 0,
        }
    }

    /// Build a memory from an extracted fact.
    pub fn from_fact(
        fact: &Fact,
        original_text: impl Into<String>,
        platform: impl Into<String>,
        keywords: Vec<String>,
        now_ms: i64,
    ) -> Self {
        let metadata =
            MemoryMetadata::new(fact.fact_type, fact.confidence, platform, MemorySource::AutoExtract)
                .with_keywords(keywords);
        Self::new(&fact.content, original_text, metadata, now_ms)
    }

    /// Fallback memory for text where no rule matched.
    ///
    /// The memory type is always `general`; `category` comes from the
    /// keyword classifier and may be more specific.
    pub fn general(
        content: impl AsRef<str>,
        original_text: impl Into<String>,
        category: Category,
        confidence: f32,
        platform: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        let metadata =
            MemoryMetadata::new(category, confidence, platform, MemorySource::GeneralContent)
                .with_type(Category::General);
        Self::new(content, original_text, metadata, now_ms)
    }

    /// Set the keywords, keeping at most [`MAX_KEYWORDS`].
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.metadata = self.metadata.with_keywords(keywords);
        self
    }

    /// Replace the generated id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Override the creation timestamp (and last access).
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self.last_accessed = timestamp;
        self
    }

    /// Set the access counter.
    pub fn with_access_count(mut self, access_count: u64) -> Self {
        self.access_count = access_count;
        self
    }

    /// Category shortcut.
    pub fn category(&self) -> Category {
        self.metadata.category
    }

    /// Whole days elapsed since creation, as a fraction.
    pub fn age_days(&self, now_ms: i64) -> f64 {
        let elapsed = (now_ms - self.timestamp).max(0) as f64;
        elapsed / 86_400_000.0
    }

    /// Check the memory invariants.
    pub fn validate(&self) -> RecollectResult<()> {
        if self.id.trim().is_empty() {
            return Err(RecollectError::validation_code(
                "memory id must not be empty",
                ErrorCode::ValMissingField,
            ));
        }
        if self.content.is_empty() || self.content.trim() != self.content {
            return Err(RecollectError::validation(format!(
                "memory {} content must be non-empty and trimmed",
                self.id
            )));
        }
        if self.content.chars().count() > MAX_CONTENT_CHARS {
            return Err(RecollectError::validation_code(
                format!("memory {} content exceeds {} characters", self.id, MAX_CONTENT_CHARS),
                ErrorCode::ValContentTooLong,
            ));
        }
        let confidence = self.metadata.confidence;
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(RecollectError::validation_code(
                format!("memory {} confidence {} outside [0, 1]", self.id, confidence),
                ErrorCode::ValInvalidConfidence,
            ));
        }
        if self.metadata.keywords.len() > MAX_KEYWORDS {
            return Err(RecollectError::validation(format!(
                "memory {} has more than {} keywords",
                self.id, MAX_KEYWORDS
            )));
        }
        Ok(())
    }
}

/// A memory together with its search scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMemory {
    /// The memory.
    pub memory: Memory,
    /// Score reported by the store, in `[0, 1]`.
    pub raw_score: f32,
    /// Raw score plus recency, access and confidence boosts.
    pub score: f32,
}

fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Trim and cut to [`MAX_CONTENT_CHARS`] on a char boundary.
pub fn truncate_content(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= MAX_CONTENT_CHARS {
        return trimmed.to_string();
    }
    trimmed
        .chars()
        .take(MAX_CONTENT_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}
