//! Clue components: the three deduction categories and the clue record.

use serde::{Deserialize, Serialize};

/// Deduction category. Each category holds at most one clue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClueCategory {
    Mask,
    Location,
    Behavior,
}

impl ClueCategory {
    pub const ALL: [ClueCategory; 3] = [
        ClueCategory::Mask,
        ClueCategory::Location,
        ClueCategory::Behavior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClueCategory::Mask => "mask",
            ClueCategory::Location => "location",
            ClueCategory::Behavior => "behavior",
        }
    }
}

impl std::fmt::Display for ClueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of evidence about the target.
///
/// Matching compares `match_value` only; `description` is narrative text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub category: ClueCategory,
    pub description: String,
    pub match_value: String,
}

impl Clue {
    pub fn new(
        category: ClueCategory,
        description: impl Into<String>,
        match_value: impl Into<String>,
    ) -> Self {
        Self {
            category,
            description: description.into(),
            match_value: match_value.into(),
        }
    }

    pub fn mask(match_value: impl Into<String>) -> Self {
        let value = match_value.into();
        Self::new(ClueCategory::Mask, format!("The one you seek wears {value}"), value)
    }

    pub fn location(match_value: impl Into<String>) -> Self {
        let value = match_value.into();
        Self::new(ClueCategory::Location, format!("Your target frequents the {value}"), value)
    }

    pub fn behavior(match_value: impl Into<String>) -> Self {
        let value = match_value.into();
        Self::new(ClueCategory::Behavior, format!("The one you hunt is {value}"), value)
    }
}
