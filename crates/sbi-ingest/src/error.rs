//! Error types for the intake pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised during intake.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The named packet has no document in the store.
    #[error("data packet not found: {name}")]
    PacketNotFound { name: String },

    /// The packet's backing archive could not be opened or extracted.
    #[error("cannot read archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// An archive entry would escape the extraction directory.
    #[error("archive entry has an unsafe path: {entry}")]
    UnsafeEntryPath { entry: String },

    /// Model-level failure (missing descriptor, missing key field, ...).
    #[error(transparent)]
    Model(#[from] sbi_model::ModelError),

    /// Table decode failure.
    #[error(transparent)]
    Dbf(#[from] sbi_dbf::DbfError),

    /// Document store failure.
    #[error(transparent)]
    Store(#[from] sbi_store::StoreError),

    /// Stored document that does not deserialize into its model type.
    #[error("malformed {kind} document '{name}': {source}")]
    MalformedDocument {
        kind: &'static str,
        name: String,
        source: serde_json::Error,
    },

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Create an Archive error.
    pub fn archive(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for intake operations.
pub type Result<T> = std::result::Result<T, IngestError>;
