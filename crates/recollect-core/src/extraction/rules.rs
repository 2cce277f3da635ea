//! Data-driven extraction rule table.
//!
//! Each rule pairs a category with a single-capture-group pattern and a
//! validator for the cleaned capture. Rules are listed per category in
//! priority order; the extractor walks the table front to back.
//!
//! Patterns run against normalized (lowercased, whitespace-collapsed) text.

use once_cell::sync::Lazy;
use regex::Regex;

use super::stopwords::is_stop_word;
use crate::types::Category;

/// Lazily matched capture: anything up to clause punctuation.
const CAPTURE: &str = r"([^.,!?;]+?)";

/// Where a capture ends: a joining word, clause punctuation or end of text.
const TAIL: &str =
    r"(?:\s+(?:and|but|because|so|while|though|although|which|who|where|since)\b|[.,!?;]|$)";

/// Minimum and maximum length of a valid candidate, in characters.
const MIN_CANDIDATE_CHARS: usize = 2;
const MAX_CANDIDATE_CHARS: usize = 200;

const LOCATION_PLACEHOLDERS: &[&str] = &["here", "there", "somewhere"];

/// A single extraction rule.
pub struct ExtractionRule {
    /// Category assigned to facts produced by this rule.
    pub category: Category,
    /// Pattern with exactly one capture group.
    pub pattern: Regex,
    /// Accepts or rejects the cleaned capture.
    pub validate: fn(&str) -> bool,
}

impl ExtractionRule {
    /// Compile a rule. Panics on an invalid pattern, which is a programming
    /// error in the static table.
    pub fn new(category: Category, pattern: &str, validate: fn(&str) -> bool) -> Self {
        Self {
            category,
            pattern: Regex::new(pattern).unwrap(),
            validate,
        }
    }

    /// Rule whose capture follows a fixed lead-in phrase.
    fn phrase(category: Category, lead_in: &str) -> Self {
        Self::new(
            category,
            &format!(r"\b{}\s+{}{}", lead_in, CAPTURE, TAIL),
            validator_for(category),
        )
    }

    /// Rule with a fully custom pattern.
    fn custom(category: Category, pattern: &str) -> Self {
        Self::new(category, pattern, validator_for(category))
    }
}

impl std::fmt::Debug for ExtractionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionRule")
            .field("category", &self.category)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

static DEFAULT_RULES: Lazy<Vec<ExtractionRule>> = Lazy::new(|| {
    use Category::*;

    vec![
        // identity
        ExtractionRule::phrase(Identity, r"my name(?: is|'s)"),
        ExtractionRule::phrase(Identity, r"(?:please |you can |just )call me"),
        ExtractionRule::phrase(Identity, r"i(?:'m| am) called"),
        // location
        ExtractionRule::phrase(Location, r"i (?:currently )?live in"),
        ExtractionRule::phrase(Location, r"i(?:'m| am) (?:originally )?from"),
        ExtractionRule::phrase(Location, r"i(?:'m| am) (?:based|located) in"),
        ExtractionRule::phrase(Location, r"i (?:just |recently )?moved to"),
        ExtractionRule::phrase(Location, r"i reside in"),
        ExtractionRule::phrase(Location, r"my (?:home ?town|city) is"),
        // preference
        ExtractionRule::phrase(
            Preference,
            r"i (?:really |also |absolutely |just )?(?:like|love|adore|prefer)(?:\s+to)?",
        ),
        ExtractionRule::phrase(Preference, r"i (?:really )?(?:hate|dislike|can't stand)"),
        ExtractionRule::phrase(Preference, r"my favou?rite [a-z ]{1,30}? (?:is|are)"),
        // work
        ExtractionRule::phrase(Work, r"i work (?:as|at|for|in)(?:\s+(?:an?|the))?"),
        ExtractionRule::phrase(
            Work,
            r"i(?:'m| am) (?:employed|working) (?:at|by|for|as)(?:\s+(?:an?|the))?",
        ),
        ExtractionRule::phrase(
            Work,
            r"my (?:job|profession|occupation|role) is(?:\s+(?:an?|the))?",
        ),
        ExtractionRule::custom(
            Work,
            r"\bi(?:'m| am) an? ((?:[a-z]+ )?(?:engineer|developer|designer|teacher|doctor|nurse|lawyer|manager|scientist|writer|accountant|consultant|researcher|analyst|programmer|architect|artist|chef))\b",
        ),
        // education
        ExtractionRule::phrase(Education, r"i(?:'m| am) (?:currently )?studying"),
        ExtractionRule::phrase(Education, r"i stud(?:y|ied)"),
        ExtractionRule::phrase(Education, r"i graduated from"),
        ExtractionRule::phrase(Education, r"i(?:'m| am) a student at"),
        ExtractionRule::phrase(
            Education,
            r"i have an? (?:degree|bachelor's|master's|phd|diploma) in",
        ),
        ExtractionRule::phrase(Education, r"my major is"),
        ExtractionRule::phrase(Education, r"i went to (?:school|college|university) (?:at|in)"),
        // family
        ExtractionRule::phrase(Family, r"i(?:'m| am) married to"),
        ExtractionRule::custom(
            Family,
            r"\bi have ((?:an?|one|two|three|four|five|\d+) (?:kids?|children|sons?|daughters?|brothers?|sisters?|siblings?|grandchildren|dogs?|cats?|pets?))\b",
        ),
        ExtractionRule::custom(
            Family,
            &format!(
                r"\b(my (?:wife|husband|partner|son|daughter|mother|father|mom|dad|brother|sister|dog|cat)(?:'s name)? is [^.,!?;]+?){}",
                TAIL
            ),
        ),
        // hobby
        ExtractionRule::phrase(Hobby, r"my hobb(?:y is|ies are|ies include)"),
        ExtractionRule::phrase(Hobby, r"i enjoy"),
        ExtractionRule::phrase(
            Hobby,
            r"in my (?:free|spare) time,? i(?: like to| love to| enjoy)?",
        ),
        ExtractionRule::phrase(Hobby, r"i(?:'m| am) (?:really )?into"),
        ExtractionRule::phrase(Hobby, r"i (?:play|practice|practise)"),
        // goal
        ExtractionRule::phrase(Goal, r"my (?:goal|dream|plan|aim) is to"),
        ExtractionRule::phrase(Goal, r"i (?:want|hope|plan|intend) to"),
        ExtractionRule::phrase(Goal, r"i(?:'m| am) (?:planning|hoping|trying) to"),
        ExtractionRule::phrase(Goal, r"i(?:'d| would) (?:like|love) to"),
        // health
        ExtractionRule::phrase(Health, r"i(?:'m| am) allergic to"),
        ExtractionRule::phrase(Health, r"i have an? (?:allergy|intolerance) to"),
        ExtractionRule::custom(
            Health,
            r"\bi(?:'m| am) (vegetarian|vegan|pescatarian|diabetic|lactose intolerant|gluten[- ]free|celiac)\b",
        ),
        ExtractionRule::phrase(
            Health,
            r"i (?:suffer from|have been diagnosed with|was diagnosed with)",
        ),
        ExtractionRule::custom(
            Health,
            r"\bi have (asthma|diabetes|arthritis|migraines|anxiety|adhd|celiac disease|high blood pressure)\b",
        ),
        // tech
        ExtractionRule::phrase(Tech, r"i (?:code|program|develop|write code) (?:in|with|using)"),
        ExtractionRule::phrase(
            Tech,
            r"my (?:favou?rite |preferred |main )?(?:programming )?language is",
        ),
        ExtractionRule::custom(
            Tech,
            r"\bi use ([^.,!?;]+?) for (?:coding|programming|development|my projects)\b",
        ),
        ExtractionRule::phrase(Tech, r"my (?:tech )?stack (?:is|includes)"),
    ]
});

/// The built-in rule table.
pub fn default_rules() -> &'static [ExtractionRule] {
    &DEFAULT_RULES
}

/// Validator used for a category.
pub fn validator_for(category: Category) -> fn(&str) -> bool {
    match category {
        Category::Identity => validate_identity,
        Category::Location => validate_location,
        Category::Work => validate_work,
        _ => validate_candidate,
    }
}

/// Checks shared by every category: length bounds and at least one token
/// outside the stop-word list.
pub fn validate_candidate(candidate: &str) -> bool {
    let len = candidate.chars().count();
    if !(MIN_CANDIDATE_CHARS..=MAX_CANDIDATE_CHARS).contains(&len) {
        return false;
    }
    candidate.split_whitespace().any(|token| {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
        !token.is_empty() && !is_stop_word(token)
    })
}

/// Names: letters only, at most four words.
pub fn validate_identity(candidate: &str) -> bool {
    validate_candidate(candidate)
        && candidate
            .chars()
            .all(|c| c.is_alphabetic() || c.is_whitespace())
        && candidate.split_whitespace().count() <= 4
}

/// Places: at most ten words and not a placeholder.
pub fn validate_location(candidate: &str) -> bool {
    validate_candidate(candidate)
        && candidate.split_whitespace().count() <= 10
        && !LOCATION_PLACEHOLDERS.contains(&candidate)
}

/// Jobs: at most fifteen words.
pub fn validate_work(candidate: &str) -> bool {
    validate_candidate(candidate) && candidate.split_whitespace().count() <= 15
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_rule_has_one_capture_group() {
        for rule in default_rules() {
            // captures_len counts the implicit whole-match group
            assert_eq!(rule.pattern.captures_len(), 2, "{:?}", rule);
        }
    }

    #[test]
    fn test_rules_are_grouped_in_category_order() {
        let order: Vec<Category> = Category::iter().collect();
        let positions: Vec<usize> = default_rules()
            .iter()
            .map(|r| order.iter().position(|c| *c == r.category).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        assert!(!default_rules().iter().any(|r| r.category.is_general()));
    }

    #[test]
    fn test_every_specific_category_has_rules() {
        for category in Category::iter().filter(|c| !c.is_general()) {
            assert!(
                default_rules().iter().any(|r| r.category == category),
                "no rule for {}",
                category
            );
        }
    }

    #[test]
    fn test_validate_candidate() {
        assert!(validate_candidate("boston"));
        assert!(!validate_candidate("x"));
        assert!(!validate_candidate(&"a".repeat(201)));
        assert!(!validate_candidate("the"));
        assert!(!validate_candidate("it is what it is"));
    }

    #[test]
    fn test_validate_identity() {
        assert!(validate_identity("alice"));
        assert!(validate_identity("mary jane watson"));
        assert!(!validate_identity("r2d2"));
        assert!(!validate_identity("one two three four five"));
    }

    #[test]
    fn test_validate_location() {
        assert!(validate_location("new york city"));
        assert!(!validate_location("here"));
        assert!(!validate_location("somewhere"));
        assert!(!validate_location("a b c d e f g h i j k"));
    }

    #[test]
    fn test_validate_work() {
        assert!(validate_work("software engineer"));
        let long = vec!["word"; 16].join(" ");
        assert!(!validate_work(&long));
    }

    #[test]
    fn test_location_rule_captures_city() {
        let rule = default_rules()
            .iter()
            .find(|r| r.category == Category::Location)
            .unwrap();
        let caps = rule.pattern.captures("i live in boston. it is cold").unwrap();
        assert_eq!(&caps[1], "boston");
    }

    #[test]
    fn test_work_rule_skips_article() {
        let rule = default_rules()
            .iter()
            .find(|r| r.category == Category::Work)
            .unwrap();
        let caps = rule.pattern.captures("i work as a nurse").unwrap();
        assert_eq!(&caps[1], "nurse");
        let caps = rule.pattern.captures("i work at apple").unwrap();
        assert_eq!(&caps[1], "apple");
    }
}
