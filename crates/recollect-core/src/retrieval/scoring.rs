//! Score boosts applied on top of the store's raw relevance.

use crate::types::Memory;

/// Recency boost at age zero.
const MAX_RECENCY_BOOST: f64 = 2.0;
/// Recency boost lost per day of age.
const RECENCY_DECAY_PER_DAY: f64 = 0.1;
/// Boost per recorded access.
const ACCESS_BOOST_PER_HIT: f32 = 0.1;
/// Ceiling for the access boost.
const MAX_ACCESS_BOOST: f32 = 1.0;
/// Multiplier for extraction confidence.
const CONFIDENCE_WEIGHT: f32 = 2.0;

/// Linear decay from 2.0 at creation to 0.0 at twenty days.
pub fn recency_boost(age_days: f64) -> f32 {
    (MAX_RECENCY_BOOST - age_days.max(0.0) * RECENCY_DECAY_PER_DAY).max(0.0) as f32
}

/// 0.1 per access, capped at 1.0.
pub fn access_boost(access_count: u64) -> f32 {
    (access_count as f32 * ACCESS_BOOST_PER_HIT).min(MAX_ACCESS_BOOST)
}

/// Twice the extraction confidence.
pub fn confidence_boost(confidence: f32) -> f32 {
    confidence * CONFIDENCE_WEIGHT
}

/// Raw score plus recency, access and confidence boosts.
pub fn enhanced_score(raw_score: f32, memory: &Memory, now_ms: i64) -> f32 {
    raw_score
        + recency_boost(memory.age_days(now_ms))
        + access_boost(memory.access_count)
        + confidence_boost(memory.metadata.confidence)
}
