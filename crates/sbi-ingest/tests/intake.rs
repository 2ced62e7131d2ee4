//! End-to-end intake: archive on disk through to reconciled records.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use sbi_ingest::{
    FILE_KIND, IntakeConfig, Job, RecordingDispatcher, create_packet, import_packet,
    seed_descriptors, sweep,
};
use sbi_model::{DELETION_KIND, KindDescriptor, PACKET_KIND};
use sbi_store::{DocumentStore, Filter, MemoryStore};
use zip::write::SimpleFileOptions;

/// Build a DBF table in memory: `fields` are (name, type tag, length),
/// `records` are concatenated pre-padded field bytes.
fn build_dbf(fields: &[(&str, u8, u8)], records: &[Vec<u8>]) -> Vec<u8> {
    let header_len = 32 + 32 * fields.len() + 1;
    let record_len: usize = 1 + fields.iter().map(|(_, _, len)| *len as usize).sum::<usize>();

    let mut bytes = vec![0u8; 32];
    bytes[0] = 0x03;
    bytes[4..8].copy_from_slice(&(records.len() as u32).to_le_bytes());
    bytes[8..10].copy_from_slice(&(header_len as u16).to_le_bytes());
    bytes[10..12].copy_from_slice(&(record_len as u16).to_le_bytes());
    bytes[29] = 0xC8;

    for (name, tag, len) in fields {
        let mut descriptor = [0u8; 32];
        descriptor[..name.len()].copy_from_slice(name.as_bytes());
        descriptor[11] = *tag;
        descriptor[16] = *len;
        bytes.extend_from_slice(&descriptor);
    }
    bytes.push(0x0D);

    for body in records {
        bytes.push(b' ');
        assert_eq!(body.len(), record_len - 1, "test record not padded");
        bytes.extend_from_slice(body);
    }
    bytes.push(0x1A);
    bytes
}

fn pad(text: &[u8], len: usize) -> Vec<u8> {
    let mut padded = text.to_vec();
    padded.resize(len, b' ');
    padded
}

fn write_archive(path: &Path, tables: &[(&str, Vec<u8>)]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in tables {
        writer
            .start_file(format!("{name}.dbf"), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

fn descriptors() -> Vec<KindDescriptor> {
    vec![
        KindDescriptor::new("store", "kod")
            .with_order(10)
            .with_type_code("STORE"),
        KindDescriptor::new("sales", "kod,day")
            .with_order(20)
            .with_replace_all(true),
        KindDescriptor::new(DELETION_KIND, "kod").with_order(90),
    ]
}

/// Full pipeline: stores, composite-key sales with an in-packet duplicate,
/// a deletion marker, and a full-snapshot purge.
#[test]
fn import_reconciles_every_configured_table() {
    let dir = tempfile::tempdir().unwrap();
    let config = IntakeConfig::new(dir.path());
    let store = MemoryStore::new();
    seed_descriptors(&store, &descriptors()).unwrap();

    // A stale record from an earlier snapshot; sales is replace_all.
    store
        .insert("sales", "Z-99/2020-01-01", serde_json::json!({"name": "Z-99/2020-01-01"}))
        .unwrap();
    store.commit().unwrap();

    let store_table = build_dbf(
        &[("KOD", b'C', 4), ("CITY", b'C', 8)],
        &[
            [pad(b"A-01", 4), pad(b"Pecs", 8)].concat(),
            [pad(b"B-02", 4), pad(b"Gyor", 8)].concat(),
            [pad(b"C-03", 4), pad(b"Eger", 8)].concat(),
        ],
    );
    // Two rows share the key (A-01, 2025-03-01); the later one wins.
    let sales_table = build_dbf(
        &[("KOD", b'C', 4), ("DAY", b'D', 8), ("QTY", b'N', 6)],
        &[
            [pad(b"A-01", 4), b"20250301".to_vec(), pad(b"     5", 6)].concat(),
            [pad(b"A-01", 4), b"20250301".to_vec(), pad(b"     7", 6)].concat(),
            [pad(b"B-02", 4), b"20250302".to_vec(), pad(b"     3", 6)].concat(),
        ],
    );
    let deleted_table = build_dbf(
        &[("REC_TYPE", b'C', 8), ("KOD", b'C', 4)],
        &[[pad(b"STORE", 8), pad(b"C-03", 4)].concat()],
    );

    write_archive(
        &config.archive_path("export-2025-03.zip"),
        &[
            ("store", store_table),
            ("sales", sales_table),
            ("deleted", deleted_table),
        ],
    );

    let dispatcher = RecordingDispatcher::new();
    create_packet(&store, &dispatcher, "export-2025-03.zip", Utc::now()).unwrap();
    assert_eq!(
        dispatcher.jobs(),
        vec![Job::ImportPacket { packet: "export-2025-03.zip".into() }]
    );

    let report = import_packet(&store, &config, "export-2025-03.zip").unwrap();
    assert!(!report.already_processed);
    assert!(report.skipped_tables.is_empty());

    // Stores: three imported, one removed again by the deletion marker.
    assert_eq!(store.count("store", &Filter::All).unwrap(), 2);
    assert!(!store.exists("store", "C-03").unwrap());
    let doc = store.get("store", "A-01").unwrap().unwrap();
    assert_eq!(doc["city"], "Pecs");

    // Sales: stale snapshot purged, duplicate key collapsed, last row wins.
    assert_eq!(store.count("sales", &Filter::All).unwrap(), 2);
    assert!(!store.exists("sales", "Z-99/2020-01-01").unwrap());
    let doc = store.get("sales", "A-01/2025-03-01").unwrap().unwrap();
    assert_eq!(doc["qty"], 7.0);

    let stats: std::collections::BTreeMap<_, _> = report.kinds.iter().cloned().collect();
    assert_eq!(stats["store"].inserted, 3);
    assert_eq!(stats["sales"].inserted, 2);
    assert_eq!(stats["sales"].updated, 1);
    assert_eq!(stats[DELETION_KIND].deleted, 1);
}

#[test]
fn processed_packets_are_not_imported_twice() {
    let dir = tempfile::tempdir().unwrap();
    let config = IntakeConfig::new(dir.path());
    let store = MemoryStore::new();
    seed_descriptors(&store, &descriptors()).unwrap();

    let table = build_dbf(
        &[("KOD", b'C', 4), ("CITY", b'C', 8)],
        &[[pad(b"A-01", 4), pad(b"Pecs", 8)].concat()],
    );
    write_archive(&config.archive_path("once.zip"), &[("store", table)]);

    create_packet(&store, &RecordingDispatcher::new(), "once.zip", Utc::now()).unwrap();
    let first = import_packet(&store, &config, "once.zip").unwrap();
    assert!(!first.already_processed);

    let second = import_packet(&store, &config, "once.zip").unwrap();
    assert!(second.already_processed);
    assert!(second.kinds.is_empty());
    assert_eq!(store.count("store", &Filter::All).unwrap(), 1);
}

/// A packet missing some configured tables imports the ones it has.
#[test]
fn missing_tables_are_reported_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let config = IntakeConfig::new(dir.path());
    let store = MemoryStore::new();
    seed_descriptors(&store, &descriptors()).unwrap();

    let table = build_dbf(
        &[("KOD", b'C', 4), ("CITY", b'C', 8)],
        &[[pad(b"A-01", 4), pad(b"Pecs", 8)].concat()],
    );
    write_archive(&config.archive_path("stores-only.zip"), &[("store", table)]);

    create_packet(&store, &RecordingDispatcher::new(), "stores-only.zip", Utc::now()).unwrap();
    let report = import_packet(&store, &config, "stores-only.zip").unwrap();

    assert_eq!(report.kinds.len(), 1);
    assert!(report.skipped_tables.contains(&"sales".to_string()));
    assert!(report.skipped_tables.contains(&DELETION_KIND.to_string()));
}

/// A table that fails to decode is rolled back; the others still land.
#[test]
fn corrupt_table_does_not_poison_the_packet() {
    let dir = tempfile::tempdir().unwrap();
    let config = IntakeConfig::new(dir.path());
    let store = MemoryStore::new();
    seed_descriptors(&store, &descriptors()).unwrap();

    let good = build_dbf(
        &[("KOD", b'C', 4), ("CITY", b'C', 8)],
        &[[pad(b"A-01", 4), pad(b"Pecs", 8)].concat()],
    );
    write_archive(
        &config.archive_path("half.zip"),
        &[("store", good), ("sales", b"not a dbf table".to_vec())],
    );

    create_packet(&store, &RecordingDispatcher::new(), "half.zip", Utc::now()).unwrap();
    let report = import_packet(&store, &config, "half.zip").unwrap();

    assert_eq!(store.count("store", &Filter::All).unwrap(), 1);
    assert!(report.skipped_tables.contains(&"sales".to_string()));

    // The packet is still marked processed so it is not retried forever.
    let doc = store.get(PACKET_KIND, "half.zip").unwrap().unwrap();
    assert_eq!(doc["is_processed"], true);
}

/// Imported packets expire: the sweeper removes documents and disk state.
#[test]
fn sweep_after_import_removes_all_packet_state() {
    let dir = tempfile::tempdir().unwrap();
    let config = IntakeConfig::new(dir.path());
    let store = MemoryStore::new();
    seed_descriptors(&store, &descriptors()).unwrap();

    let table = build_dbf(
        &[("KOD", b'C', 4), ("CITY", b'C', 8)],
        &[[pad(b"A-01", 4), pad(b"Pecs", 8)].concat()],
    );
    write_archive(&config.archive_path("aged.zip"), &[("store", table)]);

    let registered_at = Utc::now() - chrono::Duration::days(45);
    create_packet(&store, &RecordingDispatcher::new(), "aged.zip", registered_at).unwrap();
    import_packet(&store, &config, "aged.zip").unwrap();
    store
        .insert(
            FILE_KIND,
            "aged-attachment",
            serde_json::json!({
                "name": "aged-attachment",
                "attached_to": "aged.zip",
                "attached_to_kind": PACKET_KIND,
            }),
        )
        .unwrap();

    let report = sweep(&store, &config, Utc::now()).unwrap();
    assert_eq!(report.packets_removed, 1);
    assert_eq!(report.files_removed, 1);
    assert!(!store.exists(PACKET_KIND, "aged.zip").unwrap());
    assert!(!config.archive_path("aged.zip").exists());
    assert!(!config.extract_dir("aged.zip").exists());

    // The imported records themselves are kept.
    assert!(store.exists("store", "A-01").unwrap());
}
