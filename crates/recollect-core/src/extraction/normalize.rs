//! Text normalization shared by the extractor and keyword scoring.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static LEADING_CONJUNCTIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?:and|but|or|so|then|also|that)\s+)+").unwrap());

const TRAILING_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"', ')', '('];

/// Lowercase, unify quote characters, collapse whitespace and trim.
pub fn normalize(text: &str) -> String {
    let unified: String = text
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' | '\u{2032}' | '`' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201F}' | '\u{2033}' => '"',
            other => other,
        })
        .collect::<String>()
        .to_lowercase();
    collapse_whitespace(&unified)
}

/// Collapse runs of whitespace to a single space and trim, keeping case.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Strip leading conjunctions and trailing punctuation from a capture.
pub fn clean_capture(capture: &str) -> String {
    let trimmed = capture.trim();
    let without_conjunctions = LEADING_CONJUNCTIONS.replace(trimmed, "");
    without_conjunctions
        .trim_end_matches(|c: char| TRAILING_PUNCTUATION.contains(&c) || c.is_whitespace())
        .trim()
        .to_string()
}

/// Split into lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize("  I\u{2019}m   from\tBOSTON \n"),
            "i'm from boston"
        );
        assert_eq!(normalize("\u{201C}Quoted\u{201D}"), "\"quoted\"");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_clean_capture() {
        assert_eq!(clean_capture(" and then hiking!! "), "hiking");
        assert_eq!(clean_capture("boston."), "boston");
        assert_eq!(clean_capture("rock and roll"), "rock and roll");
        assert_eq!(clean_capture("...."), "");
    }

    #[test]
    fn test_tokenize() {
        let tokens: Vec<String> = tokenize("I'm a Rust-dev, 2024!").collect();
        assert_eq!(tokens, vec!["i", "m", "a", "rust", "dev", "2024"]);
    }
}
