//! Category filter value.
//!
//! The filter is persisted as a bare string: `"all"` or a category name.

use crate::model::quote::Quote;
use std::fmt::{Display, Formatter};

/// Wire value of the "no restriction" filter.
pub const ALL_CATEGORIES: &str = "all";

/// Selected category restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Parses a stored or user-supplied filter value.
    ///
    /// `"all"` and blank input map to `All`; anything else is a category
    /// name, compared case-sensitively.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Category(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Category(name) => name.as_str(),
        }
    }

    /// Returns whether `quote` passes this filter.
    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Category(name) => quote.category == *name,
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
