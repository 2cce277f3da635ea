//! Keyword-group classifier for content no rule matched.

use super::normalize::tokenize;
use crate::types::Category;

/// Keyword groups checked in order; the first group with a hit wins.
const KEYWORD_GROUPS: &[(Category, &[&str])] = &[
    (
        Category::Work,
        &[
            "work", "job", "office", "career", "company", "boss", "colleague", "colleagues",
            "meeting", "salary", "project", "client", "employer",
        ],
    ),
    (
        Category::Family,
        &[
            "family", "wife", "husband", "kids", "children", "son", "daughter", "mother",
            "father", "mom", "dad", "brother", "sister", "parents", "baby",
        ],
    ),
    (
        Category::Preference,
        &["like", "love", "prefer", "favorite", "favourite", "hate", "enjoy", "dislike"],
    ),
    (
        Category::Location,
        &["live", "city", "country", "home", "moved", "town", "neighborhood", "address"],
    ),
    (
        Category::Education,
        &[
            "school", "college", "university", "study", "studying", "degree", "class", "course",
            "student", "exam", "teacher",
        ],
    ),
    (
        Category::Health,
        &[
            "health", "doctor", "allergy", "allergic", "diet", "exercise", "medication", "sick",
            "hospital", "symptoms",
        ],
    ),
];

/// Pick a category for free text by keyword groups, falling back to
/// `general`.
pub fn categorize_content(text: &str) -> Category {
    let tokens: Vec<String> = tokenize(text).collect();
    KEYWORD_GROUPS
        .iter()
        .find(|(_, words)| tokens.iter().any(|t| words.contains(&t.as_str())))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize() {
        assert_eq!(
            categorize_content("The meeting with my boss ran late"),
            Category::Work
        );
        assert_eq!(
            categorize_content("Dinner with my sister tonight"),
            Category::Family
        );
        assert_eq!(
            categorize_content("The exam is on Monday"),
            Category::Education
        );
        assert_eq!(
            categorize_content("Random thoughts about the weather"),
            Category::General
        );
    }

    #[test]
    fn test_first_group_wins() {
        // Mentions both work and family words.
        assert_eq!(
            categorize_content("My dad visited the office"),
            Category::Work
        );
    }

    #[test]
    fn test_whole_words_only() {
        // "homework" must not hit the location group's "home".
        assert_eq!(categorize_content("Finished the homework"), Category::General);
    }
}
