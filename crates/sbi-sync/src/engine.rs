//! The sync engine: reconcile local default content against a catalog.
//!
//! Matching is by stable id, never by local name. Roots absent from the
//! catalog are stale and removed dependents-first; roots the catalog adds
//! are created with fresh local names; dependents are always replaced
//! wholesale, their workbook references translated from the exporting
//! deployment's local-scoped ids to this deployment's names.

use std::collections::BTreeMap;

use sbi_model::{
    CHART_KIND, DASHBOARD_KIND, DependentArtifact, QUERY_KIND, RefId, WORKBOOK_KIND, Workbook,
    stable_id_from_title,
};
use sbi_store::{DocumentStore, Filter};

use crate::catalog::ContentCatalog;
use crate::error::{Result, SyncError};

/// Kinds whose records hang off a workbook, in replacement order.
pub const DEPENDENT_KINDS: [&str; 3] = [QUERY_KIND, CHART_KIND, DASHBOARD_KIND];

/// Counters for one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub roots_created: usize,
    pub roots_removed: usize,
    pub dependents_removed: usize,
    pub dependents_imported: usize,
    /// Dependents whose workbook reference matched nothing locally.
    pub dependents_skipped: usize,
}

/// Grants read access on synced default content.
///
/// Grants are best-effort and explicitly non-transactional: a failed grant
/// is logged and never rolls the sync back.
pub trait AccessControl {
    fn grant_public_read(&self, workbook: &Workbook) -> Result<()>;
}

/// Access control for deployments without a sharing layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAccess;

impl AccessControl for NoopAccess {
    fn grant_public_read(&self, _workbook: &Workbook) -> Result<()> {
        Ok(())
    }
}

/// Reconciles the local artifact set against one catalog.
pub struct ContentSync<'a> {
    store: &'a dyn DocumentStore,
    access: &'a dyn AccessControl,
}

impl<'a> ContentSync<'a> {
    pub fn new(store: &'a dyn DocumentStore, access: &'a dyn AccessControl) -> Self {
        Self { store, access }
    }

    /// Run one full sync. Commits on success; a catalog without workbooks
    /// is a no-op and commits nothing.
    pub fn sync(&self, catalog: &ContentCatalog) -> Result<SyncReport> {
        if catalog.workbooks.is_empty() {
            tracing::info!("catalog has no workbooks, nothing to sync");
            return Ok(SyncReport::default());
        }
        match self.run(catalog) {
            Ok(report) => {
                self.store.commit()?;
                tracing::info!(
                    created = report.roots_created,
                    removed = report.roots_removed,
                    imported = report.dependents_imported,
                    skipped = report.dependents_skipped,
                    "content sync complete"
                );
                Ok(report)
            }
            Err(error) => {
                if let Err(rollback) = self.store.rollback() {
                    tracing::error!(%rollback, "rollback after failed sync also failed");
                }
                Err(error)
            }
        }
    }

    fn run(&self, catalog: &ContentCatalog) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        // Stable id -> local name for every default root currently stored.
        let mut local = self.local_defaults()?;
        let incoming: Vec<(String, &Workbook)> = catalog
            .workbooks
            .iter()
            .map(|w| (effective_stable_id(w), w))
            .collect();

        self.remove_stale_roots(&incoming, &mut local, &mut report)?;
        self.create_missing_roots(&incoming, &mut local, &mut report)?;

        // External local-scoped id -> this deployment's workbook name.
        let mut lookup = BTreeMap::new();
        for (stable_id, workbook) in &incoming {
            let Some(local_name) = local.get(stable_id) else {
                continue;
            };
            lookup.insert(workbook.name.clone(), local_name.clone());
            self.grant_access(local_name)?;
        }

        for local_name in lookup.values() {
            for kind in DEPENDENT_KINDS {
                report.dependents_removed +=
                    self.store.delete_where(kind, &Filter::eq("workbook", local_name.as_str()))?;
            }
        }

        self.import_dependents(&catalog.queries, &lookup, &mut report)?;
        self.import_dependents(&catalog.charts, &lookup, &mut report)?;
        self.import_dependents(&catalog.dashboards, &lookup, &mut report)?;
        Ok(report)
    }

    fn local_defaults(&self) -> Result<BTreeMap<String, String>> {
        let docs = self
            .store
            .list(WORKBOOK_KIND, &Filter::eq("is_default", true), None)?;
        let mut by_stable_id = BTreeMap::new();
        for doc in docs {
            let workbook = deserialize_workbook(doc)?;
            by_stable_id.insert(effective_stable_id(&workbook), workbook.name);
        }
        Ok(by_stable_id)
    }

    /// Remove default roots the catalog no longer ships, dependents first
    /// so no record is ever left pointing at a deleted workbook.
    fn remove_stale_roots(
        &self,
        incoming: &[(String, &Workbook)],
        local: &mut BTreeMap<String, String>,
        report: &mut SyncReport,
    ) -> Result<()> {
        let stale: Vec<String> = local
            .keys()
            .filter(|stable_id| !incoming.iter().any(|(id, _)| id == *stable_id))
            .cloned()
            .collect();
        for stable_id in stale {
            let Some(name) = local.remove(&stable_id) else {
                continue;
            };
            for kind in DEPENDENT_KINDS {
                report.dependents_removed +=
                    self.store.delete_where(kind, &Filter::eq("workbook", name.as_str()))?;
            }
            self.store.delete(WORKBOOK_KIND, &name)?;
            report.roots_removed += 1;
            tracing::info!(%stable_id, workbook = %name, "stale default workbook removed");
        }
        Ok(())
    }

    fn create_missing_roots(
        &self,
        incoming: &[(String, &Workbook)],
        local: &mut BTreeMap<String, String>,
        report: &mut SyncReport,
    ) -> Result<()> {
        for (stable_id, workbook) in incoming {
            if local.contains_key(stable_id) {
                continue;
            }
            let created = Workbook {
                name: new_local_name(),
                title: workbook.title.clone(),
                stable_id: Some(stable_id.clone()),
                is_default: true,
                extra: workbook.extra.clone(),
            };
            self.store
                .insert(WORKBOOK_KIND, &created.name, serde_json::to_value(&created)?)?;
            tracing::info!(%stable_id, workbook = %created.name, "default workbook created");
            local.insert(stable_id.clone(), created.name);
            report.roots_created += 1;
        }
        Ok(())
    }

    fn grant_access(&self, local_name: &str) -> Result<()> {
        let Some(doc) = self.store.get(WORKBOOK_KIND, local_name)? else {
            return Ok(());
        };
        let workbook = deserialize_workbook(doc)?;
        if let Err(error) = self.access.grant_public_read(&workbook) {
            tracing::warn!(workbook = local_name, %error, "public read grant failed");
        }
        Ok(())
    }

    fn import_dependents<T: DependentArtifact + Clone>(
        &self,
        items: &[T],
        lookup: &BTreeMap<String, String>,
        report: &mut SyncReport,
    ) -> Result<()> {
        for item in items {
            let external = item.workbook_ref().canonical();
            let Some(local_name) = lookup.get(&external) else {
                tracing::warn!(
                    kind = T::KIND,
                    name = item.name(),
                    workbook = %external,
                    "dependent references an unknown workbook, skipped"
                );
                report.dependents_skipped += 1;
                continue;
            };
            let mut item = item.clone();
            item.set_workbook_ref(RefId::from(local_name.as_str()));
            let doc = serde_json::to_value(&item)?;
            // Strictly insert: dependents of matched roots were deleted
            // above, so a name collision here is user-authored content and
            // must stay intact.
            match self.store.insert(T::KIND, item.name(), doc) {
                Ok(()) => report.dependents_imported += 1,
                Err(error) => {
                    // Per-document storage trouble never aborts the run.
                    tracing::warn!(kind = T::KIND, name = item.name(), %error, "import failed");
                    report.dependents_skipped += 1;
                }
            }
        }
        Ok(())
    }
}

/// The stable id a workbook syncs under, derived when not yet persisted.
fn effective_stable_id(workbook: &Workbook) -> String {
    workbook
        .stable_id
        .clone()
        .unwrap_or_else(|| stable_id_from_title(&workbook.title))
}

fn new_local_name() -> String {
    format!("wb-{}", uuid::Uuid::new_v4().simple())
}

fn deserialize_workbook(doc: serde_json::Value) -> Result<Workbook> {
    let name = doc
        .get("name")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<unnamed>")
        .to_string();
    serde_json::from_value(doc).map_err(|source| SyncError::MalformedDocument {
        kind: WORKBOOK_KIND,
        name,
        source,
    })
}
