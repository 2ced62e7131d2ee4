//! Document store capability for Storefront-BI.
//!
//! The intake pipeline and the content sync engine treat persistence as a
//! narrow capability interface: documents are JSON objects keyed by
//! `(kind, name)`, with filtered deletion, counting, and ordered listing.
//! [`MemoryStore`] is the reference implementation, backing tests and the
//! CLI's file-snapshot state; production deployments can plug a database
//! behind the same trait.

pub mod error;
pub mod filter;
pub mod memory;

pub use error::{Result, StoreError};
pub use filter::{Filter, OrderBy};
pub use memory::MemoryStore;

use serde_json::Value;

/// A document-oriented store keyed by record-kind and name.
///
/// Mutations accumulate in a working state until [`DocumentStore::commit`];
/// [`DocumentStore::rollback`] discards everything since the last commit.
/// The intake pipeline commits after every table so a crash never forces a
/// whole-archive replay; the sync engine commits exactly once, at the end.
pub trait DocumentStore: Send + Sync {
    /// Whether a document exists.
    fn exists(&self, kind: &str, name: &str) -> Result<bool>;

    /// Fetch a document, if present.
    fn get(&self, kind: &str, name: &str) -> Result<Option<Value>>;

    /// Insert a new document. Fails if the key is already taken.
    fn insert(&self, kind: &str, name: &str, doc: Value) -> Result<()>;

    /// Replace an existing document. Fails if the key is absent.
    fn update(&self, kind: &str, name: &str, doc: Value) -> Result<()>;

    /// Delete a document. Returns false (not an error) when it was absent.
    fn delete(&self, kind: &str, name: &str) -> Result<bool>;

    /// Delete every document of a kind matching the filter; returns the
    /// number removed.
    fn delete_where(&self, kind: &str, filter: &Filter) -> Result<usize>;

    /// Count documents of a kind matching the filter.
    fn count(&self, kind: &str, filter: &Filter) -> Result<usize>;

    /// List matching documents, optionally ordered by a field.
    fn list(&self, kind: &str, filter: &Filter, order: Option<&OrderBy>) -> Result<Vec<Value>>;

    /// Make all working-state mutations durable.
    fn commit(&self) -> Result<()>;

    /// Discard all mutations since the last commit.
    fn rollback(&self) -> Result<()>;
}
