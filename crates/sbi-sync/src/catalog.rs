//! Catalog files: the on-disk exchange format between deployments.
//!
//! A catalog directory holds one JSON array per artifact kind. Workbook
//! references inside the dependent files are local-scoped ids of the
//! *exporting* deployment; the engine translates them during import.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sbi_model::{Chart, Dashboard, Query, Workbook};

use crate::error::{Result, SyncError};

pub const WORKBOOK_FILE: &str = "workbook.json";
pub const QUERY_FILE: &str = "query.json";
pub const CHART_FILE: &str = "chart.json";
pub const DASHBOARD_FILE: &str = "dashboard.json";

/// One deployment's exported default content.
#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    pub workbooks: Vec<Workbook>,
    pub queries: Vec<Query>,
    pub charts: Vec<Chart>,
    pub dashboards: Vec<Dashboard>,
}

impl ContentCatalog {
    /// Load a catalog directory. Missing files read as empty lists: a
    /// catalog that ships only workbooks is valid.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            workbooks: load_file(&dir.join(WORKBOOK_FILE))?,
            queries: load_file(&dir.join(QUERY_FILE))?,
            charts: load_file(&dir.join(CHART_FILE))?,
            dashboards: load_file(&dir.join(DASHBOARD_FILE))?,
        })
    }

    /// Write the catalog into a directory, creating it if needed.
    pub fn write(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        write_file(&dir.join(WORKBOOK_FILE), &self.workbooks)?;
        write_file(&dir.join(QUERY_FILE), &self.queries)?;
        write_file(&dir.join(CHART_FILE), &self.charts)?;
        write_file(&dir.join(DASHBOARD_FILE), &self.dashboards)?;
        Ok(())
    }
}

fn load_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes).map_err(|source| SyncError::catalog(path, source))
}

fn write_file<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let json = serde_json::to_vec_pretty(items)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbi_model::RefId;

    #[test]
    fn missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ContentCatalog::load(dir.path()).unwrap();
        assert!(catalog.workbooks.is_empty());
        assert!(catalog.queries.is_empty());
    }

    #[test]
    fn write_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut workbook = Workbook::new("77", "_Accounts");
        workbook.promote_default();
        let catalog = ContentCatalog {
            workbooks: vec![workbook],
            queries: vec![serde_json::from_value(serde_json::json!({
                "name": "q-1", "title": "Revenue", "workbook": 77
            }))
            .unwrap()],
            ..ContentCatalog::default()
        };
        catalog.write(dir.path()).unwrap();

        let loaded = ContentCatalog::load(dir.path()).unwrap();
        assert_eq!(loaded.workbooks[0].stable_id.as_deref(), Some("vir-accounts"));
        assert_eq!(loaded.queries[0].workbook, RefId::from(77));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(WORKBOOK_FILE), b"{not json").unwrap();
        assert!(matches!(
            ContentCatalog::load(dir.path()),
            Err(SyncError::Catalog { .. })
        ));
    }
}
