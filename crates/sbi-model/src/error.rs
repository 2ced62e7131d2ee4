//! Error types for the Storefront-BI data model.

use thiserror::Error;

/// Errors raised while constructing or resolving model types.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No descriptor is registered for a record-kind.
    #[error("no kind descriptor registered for '{kind}'")]
    UnknownKind { kind: String },

    /// No record-kind is mapped to a legacy deletion type code.
    #[error("no record-kind mapped to legacy type code '{code}'")]
    UnknownTypeCode { code: String },

    /// A descriptor was registered twice for the same kind.
    #[error("duplicate kind descriptor for '{kind}'")]
    DuplicateKind { kind: String },

    /// A descriptor carries an empty or unusable key expression.
    #[error("kind '{kind}' has an invalid key expression '{key_expr}'")]
    InvalidKeyExpr { kind: String, key_expr: String },

    /// A key field named by the descriptor is absent (or null) in the row.
    #[error("row of kind '{kind}' is missing key field '{field}'")]
    MissingKeyField { kind: String, field: String },

    /// A deletion row does not carry the legacy type code field.
    #[error("deletion row is missing the '{field}' field")]
    MissingTypeCode { field: &'static str },

    /// JSON (de)serialization failure for a model type.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    /// Create an UnknownKind error.
    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownKind { kind: kind.into() }
    }

    /// Create an UnknownTypeCode error.
    pub fn unknown_type_code(code: impl Into<String>) -> Self {
        Self::UnknownTypeCode { code: code.into() }
    }

    /// Create a MissingKeyField error.
    pub fn missing_key_field(kind: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingKeyField {
            kind: kind.into(),
            field: field.into(),
        }
    }
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
