//! Rule-driven fact extractor.

use std::collections::HashSet;

use tracing::debug;

use super::normalize::{clean_capture, normalize, tokenize};
use super::rules::{default_rules, ExtractionRule};
use crate::types::Fact;

const BASE_CONFIDENCE: f32 = 0.5;
const LONG_SPAN_BONUS: f32 = 0.2;
const PUNCTUATION_BONUS: f32 = 0.1;
const INDICATOR_BONUS: f32 = 0.2;

/// Spans longer than this many characters earn [`LONG_SPAN_BONUS`].
const LONG_SPAN_CHARS: usize = 20;

const SENTENCE_FINAL: &[char] = &['.', '!', '?'];

const INDICATOR_VERBS: &[&str] = &["am", "is", "work", "live", "like", "love", "hate"];

/// Turns free text into candidate facts.
///
/// Extraction is pure: the same text, timestamp and rule table always give
/// the same facts in the same order. Cost is linear in the number of rules
/// times the length of the text.
#[derive(Debug, Clone, Copy)]
pub struct FactExtractor {
    rules: &'static [ExtractionRule],
}

impl FactExtractor {
    /// Extractor over the built-in rule table.
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Extractor over a custom rule table.
    pub fn with_rules(rules: &'static [ExtractionRule]) -> Self {
        Self { rules }
    }

    /// Extract facts from `text`, stamping them with `now_ms`.
    ///
    /// Rules are tried in table order and each contributes at most its first
    /// match. Invalid captures are dropped. Facts sharing a type and
    /// lowercased content are collapsed to the first one.
    pub fn extract(&self, text: &str, now_ms: i64) -> Vec<Fact> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut facts = Vec::new();

        for rule in self.rules {
            let Some(caps) = rule.pattern.captures(&normalized) else {
                continue;
            };
            let (Some(span), Some(capture)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            let content = clean_capture(capture.as_str());
            if !(rule.validate)(&content) {
                debug!(category = %rule.category, candidate = %content, "Dropped invalid capture");
                continue;
            }

            let fact = Fact {
                fact_type: rule.category,
                content,
                original: span.as_str().trim().to_string(),
                confidence: score_confidence(span.as_str()),
                timestamp: now_ms,
            };

            if seen.insert(fact.dedup_key()) {
                facts.push(fact);
            }
        }

        debug!(count = facts.len(), "Extracted facts");
        facts
    }
}

impl Default for FactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Confidence for a matched span.
///
/// Starts at 0.5 and adds bonuses for long spans, sentence-final
/// punctuation and strong indicator verbs, capped at 1.0.
pub fn score_confidence(span: &str) -> f32 {
    let mut confidence = BASE_CONFIDENCE;

    if span.chars().count() > LONG_SPAN_CHARS {
        confidence += LONG_SPAN_BONUS;
    }
    if span.contains(SENTENCE_FINAL) {
        confidence += PUNCTUATION_BONUS;
    }
    if tokenize(span).any(|t| INDICATOR_VERBS.contains(&t.as_str())) {
        confidence += INDICATOR_BONUS;
    }

    confidence.min(1.0)
}

/// Extract facts with the built-in rule table.
pub fn extract_facts(text: &str, now_ms: i64) -> Vec<Fact> {
    FactExtractor::new().extract(text, now_ms)
}
