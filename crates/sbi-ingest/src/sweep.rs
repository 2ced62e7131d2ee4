//! Retention sweeping of expired data packets.

use chrono::{DateTime, Duration, Utc};
use sbi_model::{PACKET_KIND, timestamp};
use sbi_store::{DocumentStore, Filter};

use crate::error::Result;
use crate::packet::IntakeConfig;

/// Record-kind of file-storage documents attached to packets.
pub const FILE_KIND: &str = "file";

/// Counters for one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Packet documents removed.
    pub packets_removed: usize,
    /// File-storage documents removed (attached and orphaned).
    pub files_removed: usize,
}

/// Remove every packet older than the retention window, along with its
/// extraction directory, backing archive, and file-storage documents.
///
/// Files already missing on disk are expected (a previous partial sweep, or
/// manual cleanup) and are only logged. One packet's filesystem trouble
/// never aborts the rest of the sweep.
pub fn sweep(
    store: &dyn DocumentStore,
    config: &IntakeConfig,
    now: DateTime<Utc>,
) -> Result<SweepReport> {
    // Formatted the way packet timestamps serialize, so the lexicographic
    // filter is exact at the boundary.
    let cutoff = timestamp::to_string(&(now - Duration::days(config.retention_days)));
    let expired = store.list(PACKET_KIND, &Filter::lt("created_at", cutoff.clone()), None)?;
    tracing::info!(%cutoff, count = expired.len(), "sweeping expired packets");

    let mut report = SweepReport::default();
    for doc in expired {
        let Some(name) = doc.get("name").and_then(serde_json::Value::as_str) else {
            continue;
        };

        remove_path(&config.extract_dir(name), true);
        remove_path(&config.archive_path(name), false);

        report.files_removed += store.delete_where(FILE_KIND, &Filter::eq("attached_to", name))?;
        if store.delete(PACKET_KIND, name)? {
            report.packets_removed += 1;
        }
        tracing::debug!(packet = name, "expired packet removed");
    }

    report.files_removed += prune_orphaned_files(store)?;
    store.commit()?;
    Ok(report)
}

/// Remove file-storage documents attached to packets that no longer exist.
///
/// Covers attachments that were not tied 1:1 to a packet row and survived
/// an earlier sweep.
fn prune_orphaned_files(store: &dyn DocumentStore) -> Result<usize> {
    let files = store.list(FILE_KIND, &Filter::eq("attached_to_kind", PACKET_KIND), None)?;
    let mut removed = 0usize;
    for doc in files {
        let Some(name) = doc.get("name").and_then(serde_json::Value::as_str) else {
            continue;
        };
        let attached = doc
            .get("attached_to")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        if attached.is_empty() || !store.exists(PACKET_KIND, attached)? {
            store.delete(FILE_KIND, name)?;
            removed += 1;
        }
    }
    if removed > 0 {
        tracing::info!(removed, "pruned orphaned packet files");
    }
    Ok(removed)
}

fn remove_path(path: &std::path::Path, recursive: bool) {
    let result = if recursive {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "already removed");
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cleanup failed, continuing");
        }
    }
}
