//! Category types for memory classification.
//!
//! The category set is closed: extraction rules, validation and the
//! general-content classifier are all keyed by these variants.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Memory category.
///
/// Categories serialize to snake_case for storage compatibility.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Name and how the user wants to be addressed.
    Identity,
    /// Where the user lives or comes from.
    Location,
    /// Likes, dislikes and favourites.
    Preference,
    /// Job, employer, profession.
    Work,
    /// Schools, degrees, fields of study.
    Education,
    /// Partners, children, relatives, pets.
    Family,
    /// Pastimes and activities.
    Hobby,
    /// Plans and aspirations.
    Goal,
    /// Allergies, diets, conditions.
    Health,
    /// Languages, tools and stacks.
    Tech,
    /// Catch-all for unclassified content.
    General,
}

impl Category {
    /// Returns all category names as static strings, in declaration order.
    pub fn all_names() -> Vec<&'static str> {
        Self::iter().map(|c| c.into()).collect()
    }

    /// Name as a static string.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Whether this is the catch-all category.
    pub fn is_general(&self) -> bool {
        matches!(self, Category::General)
    }
}
