//! Archive intake pipeline.
//!
//! Per-packet flow: `received → extracting → importing → completed`.
//! Individual table failures are logged and skipped; only failing to open
//! the archive itself aborts the run. The store is committed after every
//! table, so a crash mid-archive resumes without replaying finished kinds
//! (at the cost of re-importing the interrupted one).

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sbi_dbf::{CodePage, DbfReader};
use sbi_model::{DataPacket, KindDescriptor, PACKET_KIND};
use sbi_store::DocumentStore;

use crate::convert::row_from_record;
use crate::descriptors::load_descriptor_set;
use crate::error::{IngestError, Result};
use crate::jobs::{Job, JobDispatcher};
use crate::reconcile::{Outcome, Reconciler};

/// Filesystem and decoding configuration for the intake pipeline.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Root directory holding `packets/` (archives) and `extracted/`.
    pub data_dir: PathBuf,
    /// Code page of the legacy tables.
    pub code_page: CodePage,
    /// Retention window for the sweeper, in days.
    pub retention_days: i64,
}

impl IntakeConfig {
    /// Configuration rooted at a data directory, with the source system's
    /// defaults (windows-1250, 30-day retention).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            code_page: CodePage::WINDOWS_1250,
            retention_days: 30,
        }
    }

    /// Path of a packet's backing archive file.
    pub fn archive_path(&self, packet: &str) -> PathBuf {
        self.data_dir.join("packets").join(packet)
    }

    /// Deterministic extraction directory for a packet.
    pub fn extract_dir(&self, packet: &str) -> PathBuf {
        let stem = Path::new(packet)
            .file_stem()
            .map_or_else(|| packet.to_string(), |s| s.to_string_lossy().into_owned());
        self.data_dir.join("extracted").join(stem)
    }
}

/// Per-kind reconciliation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindStats {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Rows skipped after a key-resolution or storage failure.
    pub skipped: usize,
}

impl KindStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Inserted => self.inserted += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Deleted => self.deleted += 1,
            Outcome::DeleteSkipped => self.skipped += 1,
        }
    }
}

/// Result of one packet import.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub packet: String,
    /// Already marked processed; nothing was done.
    pub already_processed: bool,
    /// Per-kind counters, in import order.
    pub kinds: Vec<(String, KindStats)>,
    /// Kinds whose table was missing or failed to decode.
    pub skipped_tables: Vec<String>,
}

/// Register a newly arrived archive and dispatch its import.
///
/// The packet document is committed before the job is dispatched, so a
/// worker picking the job up immediately sees it. Dispatch is
/// fire-and-forget; the `is_processed` guard in [`import_packet`] makes
/// duplicate deliveries harmless.
pub fn create_packet(
    store: &dyn DocumentStore,
    dispatcher: &dyn JobDispatcher,
    name: &str,
    now: DateTime<Utc>,
) -> Result<DataPacket> {
    let packet = DataPacket::new(name, now);
    store.insert(PACKET_KIND, name, serde_json::to_value(&packet)?)?;
    store.commit()?;
    tracing::info!(packet = name, "data packet registered");
    dispatcher.dispatch(Job::ImportPacket {
        packet: name.to_string(),
    });
    Ok(packet)
}

/// Import one packet: extract its archive and reconcile every configured
/// table.
pub fn import_packet(
    store: &dyn DocumentStore,
    config: &IntakeConfig,
    name: &str,
) -> Result<ImportReport> {
    let doc = store
        .get(PACKET_KIND, name)?
        .ok_or_else(|| IngestError::PacketNotFound {
            name: name.to_string(),
        })?;
    let mut packet: DataPacket =
        serde_json::from_value(doc).map_err(|source| IngestError::MalformedDocument {
            kind: PACKET_KIND,
            name: name.to_string(),
            source,
        })?;

    let mut report = ImportReport {
        packet: name.to_string(),
        ..ImportReport::default()
    };
    if packet.is_processed {
        tracing::info!(packet = name, "packet already processed, skipping");
        report.already_processed = true;
        return Ok(report);
    }

    let archive = config.archive_path(name);
    let extract_dir = config.extract_dir(name);
    tracing::info!(packet = name, dir = %extract_dir.display(), "extracting archive");
    extract_archive(&archive, &extract_dir)?;

    let descriptors = load_descriptor_set(store)?;
    let reconciler = Reconciler::new(store, &descriptors);

    for descriptor in descriptors.enabled_ordered() {
        let table = extract_dir.join(format!("{}.dbf", descriptor.kind));
        if !table.is_file() {
            tracing::debug!(kind = %descriptor.kind, "no table in this packet");
            report.skipped_tables.push(descriptor.kind.clone());
            continue;
        }

        match import_table(store, config, &reconciler, descriptor, &table) {
            Ok(stats) => {
                tracing::info!(
                    kind = %descriptor.kind,
                    inserted = stats.inserted,
                    updated = stats.updated,
                    deleted = stats.deleted,
                    skipped = stats.skipped,
                    "table imported"
                );
                report.kinds.push((descriptor.kind.clone(), stats));
                // Durable per kind: a crash never replays finished tables.
                store.commit()?;
            }
            Err(error) => {
                tracing::warn!(kind = %descriptor.kind, %error, "table skipped");
                store.rollback()?;
                report.skipped_tables.push(descriptor.kind.clone());
            }
        }
    }

    packet.is_processed = true;
    store.update(PACKET_KIND, name, serde_json::to_value(&packet)?)?;
    store.commit()?;
    tracing::info!(packet = name, "packet import complete");
    Ok(report)
}

/// Import every packet not yet marked processed (the periodic intake entry
/// point). One packet's failure is logged and does not stop the others.
pub fn import_new_packets(
    store: &dyn DocumentStore,
    config: &IntakeConfig,
) -> Result<Vec<ImportReport>> {
    let pending = store.list(
        PACKET_KIND,
        &sbi_store::Filter::eq("is_processed", false),
        Some(&sbi_store::OrderBy::asc("created_at")),
    )?;
    let mut reports = Vec::new();
    for doc in pending {
        let Some(name) = doc.get("name").and_then(serde_json::Value::as_str) else {
            continue;
        };
        match import_packet(store, config, name) {
            Ok(report) => reports.push(report),
            Err(error) => {
                tracing::error!(packet = name, %error, "packet import failed");
                store.rollback()?;
            }
        }
    }
    Ok(reports)
}

fn import_table(
    store: &dyn DocumentStore,
    config: &IntakeConfig,
    reconciler: &Reconciler<'_>,
    descriptor: &KindDescriptor,
    table: &Path,
) -> Result<KindStats> {
    if descriptor.replace_all {
        // This kind's export is a full snapshot, not a delta.
        let purged = store.delete_where(&descriptor.kind, &sbi_store::Filter::All)?;
        tracing::debug!(kind = %descriptor.kind, purged, "purged before full reimport");
    }

    let reader = DbfReader::open(table, config.code_page)?;
    let fields = reader.fields().to_vec();

    let mut stats = KindStats::default();
    for record in reader.records() {
        // A corrupt record stream ends the table; the error propagates and
        // the caller rolls the kind back.
        let values = record?;
        let row = row_from_record(&descriptor.kind, &fields, values);
        match reconciler.apply(&row) {
            Ok(outcome) => stats.record(outcome),
            Err(error) => {
                tracing::warn!(kind = %descriptor.kind, %error, "row skipped");
                stats.skipped += 1;
            }
        }
    }
    Ok(stats)
}

/// Extract every entry of a ZIP archive into a directory.
///
/// Entry paths are validated against escaping the target directory.
fn extract_archive(archive: &Path, dest: &Path) -> Result<usize> {
    std::fs::create_dir_all(dest)?;
    let file = File::open(archive).map_err(|e| IngestError::archive(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| IngestError::archive(archive, e))?;

    let mut extracted = 0usize;
    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| IngestError::archive(archive, e))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(IngestError::UnsafeEntryPath {
                entry: entry.name().to_string(),
            });
        };
        let target = dest.join(relative);
        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        std::io::copy(&mut entry, &mut out)?;
        extracted += 1;
    }
    Ok(extracted)
}
