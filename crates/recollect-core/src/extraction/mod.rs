//! Pattern-based fact extraction.
//!
//! Text is normalized, run through an ordered rule table, validated, scored
//! and deduplicated. Keyword extraction and the general-content classifier
//! live here as well since they share the tokenizer and stop-word list.

mod categorize;
mod extractor;
mod keywords;
mod normalize;
mod rules;
mod stopwords;

pub use categorize::categorize_content;
pub use extractor::{extract_facts, score_confidence, FactExtractor};
pub use keywords::{extract_keywords, extract_top_keywords};
pub use normalize::{clean_capture, collapse_whitespace, normalize, tokenize};
pub use rules::{
    default_rules, validate_candidate, validate_identity, validate_location, validate_work,
    validator_for, ExtractionRule,
};
pub use stopwords::is_stop_word;
