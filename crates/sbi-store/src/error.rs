//! Error types for document store operations.

use thiserror::Error;

/// Errors raised by a document store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Update of a document that does not exist.
    #[error("document not found: {kind}/{name}")]
    NotFound { kind: String, name: String },

    /// Insert over an existing key.
    #[error("document already exists: {kind}/{name}")]
    Duplicate { kind: String, name: String },

    /// A document that is not a JSON object.
    #[error("document {kind}/{name} is not a JSON object")]
    NotAnObject { kind: String, name: String },

    /// Snapshot (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure.
    #[error("store backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    /// Create a NotFound error.
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a Duplicate error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a Backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
