//! Record reconciliation: upsert and delete against the document store.

use sbi_model::{
    CanonicalRecord, DELETION_KIND, DescriptorSet, ModelError, TYPE_CODE_FIELD, TypedRow,
};
use sbi_store::DocumentStore;

use crate::error::Result;
use crate::resolve::resolve_key;

/// What the reconciler did with a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new record was created.
    Inserted,
    /// An existing record was merged with the row's fields.
    Updated,
    /// A record named by a deletion-marker row was removed.
    Deleted,
    /// A deletion-marker row named a record that does not exist.
    DeleteSkipped,
}

/// Reconciles decoded rows against the document store.
///
/// Holds the per-run descriptor snapshot by reference; no ambient state.
pub struct Reconciler<'a> {
    store: &'a dyn DocumentStore,
    descriptors: &'a DescriptorSet,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn DocumentStore, descriptors: &'a DescriptorSet) -> Self {
        Self { store, descriptors }
    }

    /// Route a row to upsert or removal.
    ///
    /// Rows of the deletion-marker kind name a record to remove; everything
    /// else is reconciled in place.
    pub fn apply(&self, row: &TypedRow) -> Result<Outcome> {
        if row.kind() == DELETION_KIND {
            self.remove(row)
        } else {
            self.reconcile(row)
        }
    }

    /// Insert the row as a new record, or merge it onto the existing one.
    ///
    /// Row fields win on merge; the last row processed for a key determines
    /// the stored values.
    pub fn reconcile(&self, row: &TypedRow) -> Result<Outcome> {
        let key = resolve_key(row, self.descriptors)?;
        match self.store.get(row.kind(), &key)? {
            Some(existing) => {
                let mut record = CanonicalRecord::from_document(row.kind(), &key, &existing);
                record.merge_row(row);
                self.store.update(row.kind(), &key, record.to_document())?;
                Ok(Outcome::Updated)
            }
            None => {
                let record = CanonicalRecord::from_row(row, &key);
                self.store.insert(row.kind(), &key, record.to_document())?;
                Ok(Outcome::Inserted)
            }
        }
    }

    /// Remove the record named by a deletion-marker row.
    ///
    /// The row's legacy type code selects the target kind; the key is then
    /// resolved with that kind's own descriptor. Removing a record that is
    /// already gone is a no-op.
    pub fn remove(&self, row: &TypedRow) -> Result<Outcome> {
        let code = row
            .get(TYPE_CODE_FIELD)
            .and_then(|value| value.as_key_component())
            .ok_or(ModelError::MissingTypeCode {
                field: TYPE_CODE_FIELD,
            })?;
        let kind = self.descriptors.kind_for_type_code(&code)?.to_string();
        let target = row.rekinded(&kind);
        let key = resolve_key(&target, self.descriptors)?;
        if self.store.delete(&kind, &key)? {
            Ok(Outcome::Deleted)
        } else {
            tracing::debug!(%kind, %key, "deletion marker for a record that does not exist");
            Ok(Outcome::DeleteSkipped)
        }
    }
}
