//! Loading the descriptor snapshot from the document store.

use sbi_model::{DescriptorSet, KindDescriptor};
use sbi_store::{DocumentStore, Filter, OrderBy};

use crate::error::{IngestError, Result};

/// Record-kind under which descriptors are stored.
pub const DESCRIPTOR_KIND: &str = "kind_descriptor";

/// Load all configured descriptors into an immutable per-run snapshot.
///
/// The snapshot is passed by reference to the resolver and reconciler for
/// the whole run; descriptor edits made mid-import are deliberately not
/// observed.
pub fn load_descriptor_set(store: &dyn DocumentStore) -> Result<DescriptorSet> {
    let docs = store.list(
        DESCRIPTOR_KIND,
        &Filter::All,
        Some(&OrderBy::asc("import_order")),
    )?;
    let mut descriptors = Vec::with_capacity(docs.len());
    for doc in docs {
        let name = doc
            .get("name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();
        let descriptor: KindDescriptor =
            serde_json::from_value(doc).map_err(|source| IngestError::MalformedDocument {
                kind: DESCRIPTOR_KIND,
                name,
                source,
            })?;
        descriptors.push(descriptor);
    }
    Ok(DescriptorSet::from_descriptors(descriptors)?)
}

/// Store descriptors as documents, replacing any existing configuration.
///
/// Used at deployment time to install the fixture set a site ships with.
pub fn seed_descriptors(store: &dyn DocumentStore, descriptors: &[KindDescriptor]) -> Result<()> {
    store.delete_where(DESCRIPTOR_KIND, &Filter::All)?;
    for descriptor in descriptors {
        let mut doc = serde_json::to_value(descriptor)?;
        if let Some(map) = doc.as_object_mut() {
            map.insert(
                "name".to_string(),
                serde_json::Value::String(descriptor.kind.clone()),
            );
        }
        store.insert(DESCRIPTOR_KIND, &descriptor.kind, doc)?;
    }
    store.commit()?;
    Ok(())
}
