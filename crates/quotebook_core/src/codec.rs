//! JSON import/export for quote sequences.
//!
//! # Responsibility
//! - Render the full sequence as pretty-printed JSON for export files.
//! - Parse uploaded JSON, checking only the top-level shape.
//!
//! # Invariants
//! - Import either yields every record or fails without yielding any.
//! - Elements must be JSON objects; their fields are not validated.

use crate::model::quote::Quote;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default file name for exported quote books.
pub const EXPORT_FILE_NAME: &str = "quotes.json";

/// Import/export format failures.
#[derive(Debug)]
pub enum CodecError {
    InvalidJson(serde_json::Error),
    NotAnArray { found: &'static str },
    NotARecord { index: usize, found: &'static str },
    Encode(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(err) => write!(f, "invalid JSON: {err}"),
            Self::NotAnArray { found } => {
                write!(f, "expected a JSON array of quotes, found {found}")
            }
            Self::NotARecord { index, found } => {
                write!(f, "element {index} must be an object, found {found}")
            }
            Self::Encode(err) => write!(f, "failed to encode quotes: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(err) | Self::Encode(err) => Some(err),
            Self::NotAnArray { .. } | Self::NotARecord { .. } => None,
        }
    }
}

/// Renders `quotes` as a pretty-printed JSON array.
pub fn export_blob(quotes: &[Quote]) -> Result<String, CodecError> {
    serde_json::to_string_pretty(quotes).map_err(CodecError::Encode)
}

/// Parses an uploaded JSON document into quote records.
///
/// Every object is accepted; see [`Quote`] for how missing or non-string
/// fields are carried.
///
/// # Errors
/// - `InvalidJson` when `text` is not JSON.
/// - `NotAnArray` when the top level is not an array.
/// - `NotARecord` when an element is not an object.
pub fn parse_import(text: &str) -> Result<Vec<Quote>, CodecError> {
    let value: Value = serde_json::from_str(text).map_err(CodecError::InvalidJson)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(CodecError::NotAnArray {
                found: kind_name(&other),
            })
        }
    };

    if let Some((index, item)) = items.iter().enumerate().find(|(_, v)| !v.is_object()) {
        return Err(CodecError::NotARecord {
            index,
            found: kind_name(item),
        });
    }

    items
        .into_iter()
        .map(|item| serde_json::from_value::<Quote>(item).map_err(CodecError::InvalidJson))
        .collect()
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{export_blob, parse_import, CodecError};
    use crate::model::quote::Quote;

    #[test]
    fn export_is_pretty_printed() {
        let blob = export_blob(&[Quote::unchecked("a", "X")]).unwrap();
        assert!(blob.contains('\n'));
        assert!(blob.contains("\"text\": \"a\""));
    }

    #[test]
    fn import_rejects_object_top_level() {
        let err = parse_import("{}").unwrap_err();
        assert!(matches!(err, CodecError::NotAnArray { found: "object" }));
    }

    #[test]
    fn import_rejects_non_record_elements() {
        let err = parse_import(r#"[{"text":"a","category":"X"}, 3]"#).unwrap_err();
        assert!(matches!(
            err,
            CodecError::NotARecord {
                index: 1,
                found: "number"
            }
        ));
    }

    #[test]
    fn import_accepts_records_with_non_string_fields() {
        let quotes = parse_import(r#"[{"text":42,"category":null}]"#).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].extra["text"], 42);
        assert!(quotes[0].extra["category"].is_null());
    }

    #[test]
    fn import_rejects_malformed_json() {
        assert!(matches!(
            parse_import("[{").unwrap_err(),
            CodecError::InvalidJson(_)
        ));
    }

    #[test]
    fn import_keeps_records_lacking_fields_and_extra_fields() {
        let quotes = parse_import(r#"[{}, {"text":"t","category":"C","author":"anon"}]"#).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].text, "");
        assert_eq!(quotes[0].category, "");
        assert_eq!(quotes[1].extra["author"], "anon");

        let blob = export_blob(&quotes).unwrap();
        assert!(blob.contains("\"author\": \"anon\""));
    }
}
