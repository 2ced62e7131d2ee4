//! Typed field values decoded from legacy tables.

use chrono::NaiveDate;
use serde::Serialize;

/// One decoded field value.
///
/// Textual values are always stored trimmed; the decoder is responsible for
/// stripping whitespace before constructing a `Text` variant. Non-textual
/// values pass through in their native representation. Values only ever flow
/// one way, into stored JSON documents; stored documents are read back as
/// plain JSON, not as `FieldValue`s.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Trimmed character data.
    Text(String),
    /// Numeric data (dBase stores all numerics as decimal text).
    Number(f64),
    /// Calendar date without a time component.
    Date(NaiveDate),
    /// Logical flag.
    Bool(bool),
    /// Blank or unparseable-but-blank field.
    Null,
}

impl FieldValue {
    /// Returns true for the `Null` variant.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the inner text, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Render the value as a primary-key component.
    ///
    /// Returns `None` for `Null`: a blank field cannot contribute to a
    /// storage key. Whole numbers render without a fractional part so that
    /// numeric legacy codes produce stable keys (`42` rather than `42.0`).
    pub fn as_key_component(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{n}"))
                }
            }
            Self::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Self::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            Self::Null => None,
        }
    }

    /// Convert into the JSON representation used by the document store.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Number(n) => serde_json::json!(n),
            Self::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Null => serde_json::Value::Null,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.trim().to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_component_rendering() {
        assert_eq!(
            FieldValue::Text("A-01".into()).as_key_component().unwrap(),
            "A-01"
        );
        assert_eq!(FieldValue::Number(42.0).as_key_component().unwrap(), "42");
        assert_eq!(FieldValue::Number(1.5).as_key_component().unwrap(), "1.5");
        assert_eq!(
            FieldValue::Date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
                .as_key_component()
                .unwrap(),
            "2025-03-01"
        );
        assert!(FieldValue::Null.as_key_component().is_none());
    }

    #[test]
    fn serialized_form_matches_to_json() {
        let values = [
            FieldValue::Text("A-01".into()),
            FieldValue::Number(1.5),
            FieldValue::Date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
            FieldValue::Bool(true),
            FieldValue::Null,
        ];
        for value in values {
            assert_eq!(serde_json::to_value(&value).unwrap(), value.to_json());
        }
    }

    #[test]
    fn text_from_str_is_trimmed() {
        assert_eq!(FieldValue::from("  ABC  "), FieldValue::Text("ABC".into()));
    }
}
