//! Command implementations over a snapshot-backed store.
//!
//! Each command loads the store snapshot from the data directory, runs the
//! operation, and writes the snapshot back on success. Committed state only
//! ever reaches disk; a failed command leaves the snapshot untouched.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use sbi_dbf::CodePage;
use sbi_ingest::{
    ImportReport, IntakeConfig, NullDispatcher, SweepReport, create_packet, import_new_packets,
    import_packet, seed_descriptors, sweep,
};
use sbi_model::KindDescriptor;
use sbi_store::MemoryStore;
use sbi_sync::{ContentCatalog, ContentSync, ExportReport, NoopAccess, export_catalog};

use crate::cli::{ExportArgs, ImportArgs, IntakeArgs, SeedArgs, SweepArgs, SyncArgs};

const SNAPSHOT_FILE: &str = "store.json";

fn snapshot_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SNAPSHOT_FILE)
}

fn open_store(data_dir: &Path) -> Result<MemoryStore> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("create data directory {}", data_dir.display()))?;
    MemoryStore::from_snapshot(&snapshot_path(data_dir)).context("load store snapshot")
}

fn save_store(store: &MemoryStore, data_dir: &Path) -> Result<()> {
    store
        .write_snapshot(&snapshot_path(data_dir))
        .context("write store snapshot")
}

fn intake_config(data_dir: &Path, code_page: Option<&str>) -> Result<IntakeConfig> {
    let mut config = IntakeConfig::new(data_dir);
    if let Some(label) = code_page {
        config.code_page =
            CodePage::for_label(label).with_context(|| format!("code page {label:?}"))?;
    }
    Ok(config)
}

pub fn run_intake(data_dir: &Path, args: &IntakeArgs) -> Result<Vec<ImportReport>> {
    let store = open_store(data_dir)?;
    let config = intake_config(data_dir, args.code_page.as_deref())?;

    let name = args
        .archive
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("archive path {} has no file name", args.archive.display()))?
        .to_string();
    let target = config.archive_path(&name);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(&args.archive, &target)
        .with_context(|| format!("copy archive into {}", target.display()))?;

    create_packet(&store, &NullDispatcher, &name, Utc::now())
        .with_context(|| format!("register packet {name}"))?;

    let reports = if args.no_import {
        Vec::new()
    } else {
        vec![import_packet(&store, &config, &name).with_context(|| format!("import {name}"))?]
    };
    save_store(&store, data_dir)?;
    Ok(reports)
}

pub fn run_import(data_dir: &Path, args: &ImportArgs) -> Result<Vec<ImportReport>> {
    let store = open_store(data_dir)?;
    let config = intake_config(data_dir, args.code_page.as_deref())?;

    let reports = match &args.packet {
        Some(name) => {
            vec![import_packet(&store, &config, name).with_context(|| format!("import {name}"))?]
        }
        None => import_new_packets(&store, &config).context("import pending packets")?,
    };
    save_store(&store, data_dir)?;
    Ok(reports)
}

pub fn run_sweep(data_dir: &Path, args: &SweepArgs) -> Result<SweepReport> {
    let store = open_store(data_dir)?;
    let mut config = intake_config(data_dir, None)?;
    if let Some(days) = args.retention_days {
        config.retention_days = days;
    }
    let report = sweep(&store, &config, Utc::now()).context("sweep expired packets")?;
    save_store(&store, data_dir)?;
    Ok(report)
}

pub fn run_sync(data_dir: &Path, args: &SyncArgs) -> Result<sbi_sync::SyncReport> {
    let store = open_store(data_dir)?;
    let catalog = ContentCatalog::load(&args.catalog_dir)
        .with_context(|| format!("load catalog {}", args.catalog_dir.display()))?;
    let report = ContentSync::new(&store, &NoopAccess)
        .sync(&catalog)
        .context("sync default content")?;
    save_store(&store, data_dir)?;
    Ok(report)
}

pub fn run_export(data_dir: &Path, args: &ExportArgs) -> Result<Option<ExportReport>> {
    let store = open_store(data_dir)?;
    let report = export_catalog(&store, &args.catalog_dir)
        .with_context(|| format!("export catalog to {}", args.catalog_dir.display()))?;
    // Export can persist derived stable ids.
    save_store(&store, data_dir)?;
    Ok(report)
}

pub fn run_seed(data_dir: &Path, args: &SeedArgs) -> Result<usize> {
    let store = open_store(data_dir)?;
    let bytes = std::fs::read(&args.descriptors)
        .with_context(|| format!("read {}", args.descriptors.display()))?;
    let descriptors: Vec<KindDescriptor> =
        serde_json::from_slice(&bytes).context("parse descriptors")?;
    seed_descriptors(&store, &descriptors).context("install descriptors")?;
    save_store(&store, data_dir)?;
    Ok(descriptors.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbi_ingest::{DESCRIPTOR_KIND, load_descriptor_set};
    use sbi_store::{DocumentStore, Filter};

    #[test]
    fn seed_then_reload_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("descriptors.json");
        std::fs::write(
            &file,
            serde_json::to_vec(&[
                KindDescriptor::new("store", "kod"),
                KindDescriptor::new("sales", "kod,day"),
            ])
            .unwrap(),
        )
        .unwrap();

        let data_dir = dir.path().join("data");
        let seeded = run_seed(&data_dir, &SeedArgs { descriptors: file }).unwrap();
        assert_eq!(seeded, 2);

        // A second command run sees the persisted state.
        let store = open_store(&data_dir).unwrap();
        assert_eq!(store.count(DESCRIPTOR_KIND, &Filter::All).unwrap(), 2);
        assert_eq!(load_descriptor_set(&store).unwrap().len(), 2);
    }

    #[test]
    fn unknown_code_page_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(intake_config(dir.path(), Some("cp852")).is_err());
        assert!(intake_config(dir.path(), Some("cp1250")).is_ok());
    }
}
