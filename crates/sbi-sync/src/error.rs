//! Sync error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A catalog file exists but does not parse as the expected shape.
    #[error("malformed catalog file {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A stored artifact document does not deserialize into its model type.
    #[error("malformed {kind} document {name:?}: {source}")]
    MalformedDocument {
        kind: &'static str,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] sbi_store::StoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub(crate) fn catalog(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Catalog {
            path: path.into(),
            source,
        }
    }
}
