//! Quote domain model.
//!
//! # Responsibility
//! - Define the `{text, category}` record shared by store, codec and sync.
//! - Validate hand-entered quotes before they reach the sequence.
//!
//! # Invariants
//! - Quotes built through `Quote::new` have non-empty, trimmed fields.
//! - Imported quotes are kept verbatim, including unknown JSON fields and
//!   non-string `text`/`category` values.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Category assigned to quotes pulled from the remote endpoint.
pub const SERVER_CATEGORY: &str = "Server";

const TEXT_KEY: &str = "text";
const CATEGORY_KEY: &str = "category";

/// One quote record.
///
/// Any JSON object deserializes into a quote. A missing or non-string
/// `text`/`category` reads as an empty string; a non-string value is kept
/// in `extra` under its own key and written back in place on serialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub category: String,
    /// Extra fields carried by imported records, written back on export.
    pub extra: Map<String, Value>,
}

impl Serialize for Quote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in [(TEXT_KEY, &self.text), (CATEGORY_KEY, &self.category)] {
            match self.extra.get(key) {
                Some(raw) => map.serialize_entry(key, raw)?,
                None => map.serialize_entry(key, value)?,
            }
        }
        for (key, value) in &self.extra {
            if key != TEXT_KEY && key != CATEGORY_KEY {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Quote {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut extra = Map::deserialize(deserializer)?;
        let text = take_string_field(&mut extra, TEXT_KEY);
        let category = take_string_field(&mut extra, CATEGORY_KEY);
        Ok(Self {
            text,
            category,
            extra,
        })
    }
}

fn take_string_field(fields: &mut Map<String, Value>, key: &str) -> String {
    match fields.remove(key) {
        Some(Value::String(value)) => value,
        Some(raw) => {
            fields.insert(key.to_string(), raw);
            String::new()
        }
        None => String::new(),
    }
}

/// Validation failures for hand-entered quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteValidationError {
    EmptyText,
    EmptyCategory,
}

impl Display for QuoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "quote text must not be empty"),
            Self::EmptyCategory => write!(f, "quote category must not be empty"),
        }
    }
}

impl Error for QuoteValidationError {}

impl Quote {
    /// Creates a validated quote from user input.
    ///
    /// Both fields are trimmed; text is checked before category.
    pub fn new(
        text: impl AsRef<str>,
        category: impl AsRef<str>,
    ) -> Result<Self, QuoteValidationError> {
        let text = text.as_ref().trim();
        let category = category.as_ref().trim();
        if text.is_empty() {
            return Err(QuoteValidationError::EmptyText);
        }
        if category.is_empty() {
            return Err(QuoteValidationError::EmptyCategory);
        }
        Ok(Self::unchecked(text, category))
    }

    /// Builds a quote without validation.
    ///
    /// Used for seed data and remote records, where the shape is fixed.
    pub fn unchecked(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            extra: Map::new(),
        }
    }

    /// Builds the quote synthesized from a remote resource title.
    pub fn from_remote_title(title: impl Into<String>) -> Self {
        Self::unchecked(title, SERVER_CATEGORY)
    }

    /// Display form used by front ends: `"text" (category)`.
    pub fn display_line(&self) -> String {
        format!("\"{}\" ({})", self.text, self.category)
    }
}

/// Returns the sequence used when storage holds no quotes.
pub fn seed_quotes() -> Vec<Quote> {
    vec![
        Quote::unchecked(
            "The best way to get started is to quit talking and begin doing.",
            "Motivation",
        ),
        Quote::unchecked(
            "Life is what happens when you're busy making other plans.",
            "Life",
        ),
        Quote::unchecked(
            "Your time is limited, so don’t waste it living someone else’s life.",
            "Inspiration",
        ),
    ]
}
