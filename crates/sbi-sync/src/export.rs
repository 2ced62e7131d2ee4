//! Catalog export: write this deployment's default content for others.

use std::path::Path;

use sbi_model::{
    CHART_KIND, Chart, DASHBOARD_KIND, Dashboard, QUERY_KIND, Query, WORKBOOK_KIND, Workbook,
    stable_id_from_title,
};
use sbi_store::{DocumentStore, Filter, OrderBy};
use serde::de::DeserializeOwned;

use crate::catalog::ContentCatalog;
use crate::error::{Result, SyncError};

/// Counters for one export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub workbooks: usize,
    pub queries: usize,
    pub charts: usize,
    pub dashboards: usize,
}

/// Export every default workbook and its dependents as a catalog directory.
///
/// Workbooks without a stable id get one derived from their title, and the
/// derivation is persisted so repeated exports stay consistent. With no
/// default workbooks nothing is written and `None` is returned.
pub fn export_catalog(store: &dyn DocumentStore, dir: &Path) -> Result<Option<ExportReport>> {
    let docs = store.list(
        WORKBOOK_KIND,
        &Filter::eq("is_default", true),
        Some(&OrderBy::asc("name")),
    )?;
    if docs.is_empty() {
        tracing::info!("no default workbooks, nothing to export");
        return Ok(None);
    }

    let mut workbooks = Vec::with_capacity(docs.len());
    for doc in docs {
        let mut workbook: Workbook = deserialize(WORKBOOK_KIND, doc)?;
        if workbook.stable_id.is_none() {
            workbook.stable_id = Some(stable_id_from_title(&workbook.title));
            store.update(
                WORKBOOK_KIND,
                &workbook.name,
                serde_json::to_value(&workbook)?,
            )?;
            tracing::info!(
                workbook = %workbook.name,
                stable_id = workbook.stable_id.as_deref().unwrap_or_default(),
                "stable id derived and persisted"
            );
        }
        workbooks.push(workbook);
    }
    store.commit()?;

    let names: Vec<&str> = workbooks.iter().map(|w| w.name.as_str()).collect();
    let catalog = ContentCatalog {
        queries: dependents_of::<Query>(store, QUERY_KIND, &names)?,
        charts: dependents_of::<Chart>(store, CHART_KIND, &names)?,
        dashboards: dependents_of::<Dashboard>(store, DASHBOARD_KIND, &names)?,
        workbooks,
    };
    catalog.write(dir)?;

    let report = ExportReport {
        workbooks: catalog.workbooks.len(),
        queries: catalog.queries.len(),
        charts: catalog.charts.len(),
        dashboards: catalog.dashboards.len(),
    };
    tracing::info!(
        workbooks = report.workbooks,
        queries = report.queries,
        charts = report.charts,
        dashboards = report.dashboards,
        dir = %dir.display(),
        "catalog exported"
    );
    Ok(Some(report))
}

fn dependents_of<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    kind: &'static str,
    workbooks: &[&str],
) -> Result<Vec<T>> {
    let filter = Filter::is_in("workbook", workbooks.iter().map(|w| (*w).into()).collect());
    let docs = store.list(kind, &filter, Some(&OrderBy::asc("name")))?;
    docs.into_iter()
        .map(|doc| deserialize(kind, doc))
        .collect()
}

fn deserialize<T: DeserializeOwned>(kind: &'static str, doc: serde_json::Value) -> Result<T> {
    let name = doc
        .get("name")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<unnamed>")
        .to_string();
    serde_json::from_value(doc).map_err(|source| SyncError::MalformedDocument { kind, name, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbi_store::MemoryStore;
    use serde_json::json;

    #[test]
    fn export_without_defaults_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        assert_eq!(export_catalog(&store, dir.path()).unwrap(), None);
        assert!(!dir.path().join(crate::catalog::WORKBOOK_FILE).exists());
    }

    #[test]
    fn export_derives_and_persists_missing_stable_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        store
            .insert(
                WORKBOOK_KIND,
                "wb-001",
                json!({"name": "wb-001", "title": "_Accounts", "is_default": true}),
            )
            .unwrap();
        store
            .insert(
                QUERY_KIND,
                "q-1",
                json!({"name": "q-1", "title": "Revenue", "workbook": "wb-001"}),
            )
            .unwrap();
        // Not a default: excluded from the catalog.
        store
            .insert(
                WORKBOOK_KIND,
                "wb-mine",
                json!({"name": "wb-mine", "title": "Mine", "is_default": false}),
            )
            .unwrap();
        store.commit().unwrap();

        let report = export_catalog(&store, dir.path()).unwrap().unwrap();
        assert_eq!(report.workbooks, 1);
        assert_eq!(report.queries, 1);

        let stored = store.get(WORKBOOK_KIND, "wb-001").unwrap().unwrap();
        assert_eq!(stored["stable_id"], "vir-accounts");

        let catalog = ContentCatalog::load(dir.path()).unwrap();
        assert_eq!(catalog.workbooks.len(), 1);
        assert_eq!(catalog.workbooks[0].stable_id.as_deref(), Some("vir-accounts"));
        assert_eq!(catalog.queries[0].name, "q-1");
    }
}
