//! Relevance ranking and caching.

mod cache;
mod ranked;
mod scoring;

pub use cache::{SearchCache, DEFAULT_CACHE_TTL_MS};
pub use ranked::{AccessTracker, RankedSearch};
pub use scoring::{access_boost, confidence_boost, enhanced_score, recency_boost};
