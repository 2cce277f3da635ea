//! Keyword extraction.

use std::collections::HashMap;

use super::stopwords::is_stop_word;
use crate::types::MAX_KEYWORDS;

/// Tokens this short or shorter are never keywords.
const MIN_KEYWORD_CHARS: usize = 4;

/// Top keywords of `text`, most frequent first.
///
/// Punctuation is stripped; stop-words, tokens of three characters or
/// fewer and purely numeric tokens are dropped. Ties keep first-seen order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    extract_top_keywords(text, MAX_KEYWORDS)
}

/// Like [`extract_keywords`] with a custom limit.
pub fn extract_top_keywords(text: &str, limit: usize) -> Vec<String> {
    let stripped: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .to_lowercase();

    // word -> (count, first position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, word) in stripped.split_whitespace().enumerate() {
        if word.chars().count() < MIN_KEYWORD_CHARS
            || is_stop_word(word)
            || word.chars().all(|c| c.is_numeric())
        {
            continue;
        }
        counts
            .entry(word)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _, _)| word.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_then_first_seen() {
        let keywords =
            extract_keywords("Rust is fast. Python is friendly. Rust is safe, rust rocks!");
        assert_eq!(keywords[0], "rust");
        assert_eq!(&keywords[1..], ["fast", "python", "friendly", "safe", "rocks"]);
    }

    #[test]
    fn test_drops_short_stop_and_numeric_tokens() {
        let keywords = extract_keywords("I am at the gym 2024 with my dog");
        assert!(keywords.is_empty());
    }

    #[test]
    fn test_limit() {
        let text = (0..30)
            .map(|i| format!("keyword{}", char::from(b'a' + (i % 26) as u8)))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(extract_keywords(&text).len(), MAX_KEYWORDS);
        assert_eq!(extract_top_keywords(&text, 3).len(), 3);
    }

    #[test]
    fn test_punctuation_split() {
        let keywords = extract_keywords("hiking/biking; swimming!");
        assert_eq!(keywords, vec!["hiking", "biking", "swimming"]);
    }
}
