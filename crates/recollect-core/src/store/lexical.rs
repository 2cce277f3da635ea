//! Lexical relevance scoring for the reference stores.

use std::cmp::Reverse;
use std::collections::HashSet;

use ordered_float::OrderedFloat;

use crate::extraction::{is_stop_word, tokenize};
use crate::types::Memory;

/// Distinct, non-stop-word query terms in first-seen order.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(query)
        .filter(|t| t.chars().count() >= 2 && !is_stop_word(t))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Fraction of `terms` found in the memory's content, keywords or category
/// name. Always in `[0, 1]`.
///
/// The source text is not searched: facts pulled from one message share it,
/// and would all match any word of that message.
pub fn lexical_score(terms: &[String], memory: &Memory) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }

    let mut vocabulary: HashSet<String> = tokenize(&memory.content).collect();
    for keyword in &memory.metadata.keywords {
        vocabulary.extend(tokenize(keyword));
    }
    vocabulary.insert(memory.metadata.category.as_str().to_string());

    let matched = terms.iter().filter(|t| vocabulary.contains(*t)).count();
    matched as f32 / terms.len() as f32
}

/// Score every memory against `query`, drop non-matches, order best first
/// (newest first on ties) and keep `limit`.
pub fn rank_lexically(
    query: &str,
    memories: impl IntoIterator<Item = Memory>,
    limit: usize,
) -> Vec<(Memory, f32)> {
    let terms = query_terms(query);
    let mut scored: Vec<(Memory, f32)> = memories
        .into_iter()
        .map(|m| {
            let score = lexical_score(&terms, &m);
            (m, score)
        })
        .filter(|(_, score)| *score > 0.0)
        .collect();

    scored.sort_by_key(|(m, score)| (Reverse(OrderedFloat(*score)), Reverse(m.timestamp)));
    scored.truncate(limit);
    scored
}
