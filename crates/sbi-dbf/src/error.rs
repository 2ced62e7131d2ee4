//! Error types for DBF file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading DBF files.
#[derive(Debug, Error)]
pub enum DbfError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Malformed table header.
    #[error("invalid DBF header: {message}")]
    InvalidHeader { message: String },

    /// A field descriptor carries an unknown type tag.
    #[error("unsupported field type tag 0x{tag:02X} for field '{field}'")]
    UnsupportedFieldType { tag: u8, field: String },

    /// The record stream ended mid-record.
    #[error("truncated record at index {index}")]
    TruncatedRecord { index: usize },

    /// A numeric field holds non-numeric text.
    #[error("invalid numeric value '{value}' in field '{field}'")]
    InvalidNumeric { field: String, value: String },

    /// A date field holds a malformed date.
    #[error("invalid date value '{value}' in field '{field}'")]
    InvalidDate { field: String, value: String },

    /// Requested code page is not supported.
    #[error("unsupported code page: {label}")]
    UnsupportedCodePage { label: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbfError {
    /// Create an InvalidHeader error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an InvalidNumeric error.
    pub fn invalid_numeric(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumeric {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an InvalidDate error.
    pub fn invalid_date(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidDate {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result type alias for DBF operations.
pub type Result<T> = std::result::Result<T, DbfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DbfError::invalid_header("descriptor terminator missing");
        assert_eq!(
            format!("{err}"),
            "invalid DBF header: descriptor terminator missing"
        );

        let err = DbfError::invalid_numeric("qty", "12x");
        assert_eq!(format!("{err}"), "invalid numeric value '12x' in field 'qty'");
    }
}
