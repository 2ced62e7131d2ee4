//! Core DBF types: field metadata and decoded values.

use chrono::NaiveDate;

use crate::error::{DbfError, Result};

/// Declared type of a DBF field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `C`: character data in the table's code page.
    Character,
    /// `N`: numeric, stored as right-justified decimal text.
    Numeric,
    /// `F`: floating point, stored as decimal text.
    Float,
    /// `D`: date, stored as `YYYYMMDD` text.
    Date,
    /// `L`: logical flag (`T`/`F`/`Y`/`N`/`?`).
    Logical,
    /// `M`: memo pointer; decoded as trimmed text.
    Memo,
}

impl FieldType {
    /// Decode the type tag byte from a field descriptor.
    pub fn from_tag(tag: u8, field: &str) -> Result<Self> {
        match tag {
            b'C' => Ok(Self::Character),
            b'N' => Ok(Self::Numeric),
            b'F' => Ok(Self::Float),
            b'D' => Ok(Self::Date),
            b'L' => Ok(Self::Logical),
            b'M' => Ok(Self::Memo),
            _ => Err(DbfError::UnsupportedFieldType {
                tag,
                field: field.to_string(),
            }),
        }
    }

    /// Whether values of this type are textual (and therefore trimmed).
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Character | Self::Memo)
    }
}

/// Metadata for one field, parsed from its 32-byte descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfField {
    /// Field name, lowercased.
    pub name: String,
    /// Declared type.
    pub field_type: FieldType,
    /// Fixed byte width within each record.
    pub length: usize,
    /// Decimal places for numeric fields.
    pub decimals: u8,
}

/// One decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum DbfValue {
    /// Trimmed character data.
    Character(String),
    /// Decoded numeric value.
    Numeric(f64),
    /// Decoded date.
    Date(NaiveDate),
    /// Decoded logical flag.
    Logical(bool),
    /// Blank field.
    Null,
}

impl DbfValue {
    /// Returns true for the `Null` variant.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_decoding() {
        assert_eq!(FieldType::from_tag(b'C', "city").unwrap(), FieldType::Character);
        assert_eq!(FieldType::from_tag(b'N', "qty").unwrap(), FieldType::Numeric);
        assert!(matches!(
            FieldType::from_tag(b'G', "blob"),
            Err(DbfError::UnsupportedFieldType { tag: b'G', .. })
        ));
    }

    #[test]
    fn textual_types() {
        assert!(FieldType::Character.is_textual());
        assert!(FieldType::Memo.is_textual());
        assert!(!FieldType::Date.is_textual());
    }
}
