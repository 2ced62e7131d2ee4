//! Integration tests reading hand-built DBF tables.

use chrono::NaiveDate;
use sbi_dbf::header::{EOF_MARKER, FIELD_TERMINATOR};
use sbi_dbf::{CodePage, DbfError, DbfReader, DbfValue, FieldType};

/// Build a DBF table in memory.
///
/// `fields` are (name, type tag, length); `records` are (deleted, field
/// values as raw bytes, concatenated in order and already padded).
fn build_dbf(fields: &[(&str, u8, u8)], records: &[(bool, Vec<u8>)]) -> Vec<u8> {
    let header_len = 32 + 32 * fields.len() + 1;
    let record_len: usize = 1 + fields.iter().map(|(_, _, len)| *len as usize).sum::<usize>();

    let mut bytes = vec![0u8; 32];
    bytes[0] = 0x03;
    bytes[1] = 25;
    bytes[2] = 3;
    bytes[3] = 1;
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
    bytes.push(FIELD_TERMINATOR);

    for (deleted, body) in records {
        bytes.push(if *deleted { b'*' } else { b' ' });
        assert_eq!(body.len(), record_len - 1, "test record not padded");
        bytes.extend_from_slice(body);
    }
    bytes.push(EOF_MARKER);
    bytes
}

fn pad(text: &[u8], len: usize) -> Vec<u8> {
    let mut padded = text.to_vec();
    padded.resize(len, b' ');
    padded
}

#[test]
fn reads_typed_records() {
    let fields = [
        ("KOD", b'C', 6u8),
        ("QTY", b'N', 8u8),
        ("DAY", b'D', 8u8),
        ("ACTIVE", b'L', 1u8),
    ];
    let mut row = pad(b"A-01", 6);
    row.extend_from_slice(b"   12.50");
    row.extend_from_slice(b"20250301");
    row.push(b'T');

    let data = build_dbf(&fields, &[(false, row)]);
    let reader = DbfReader::new(data.as_slice(), CodePage::WINDOWS_1250).unwrap();
    assert_eq!(reader.record_count(), 1);
    assert_eq!(
        reader.field_names().collect::<Vec<_>>(),
        vec!["kod", "qty", "day", "active"]
    );
    assert_eq!(reader.fields()[1].field_type, FieldType::Numeric);

    let records: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0][0], DbfValue::Character("A-01".into()));
    assert_eq!(records[0][1], DbfValue::Numeric(12.5));
    assert_eq!(
        records[0][2],
        DbfValue::Date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
    );
    assert_eq!(records[0][3], DbfValue::Logical(true));
}

#[test]
fn character_fields_use_the_code_page_and_are_trimmed() {
    // "Győr " in windows-1250; 0xF5 is ő.
    let city = [b'G', b'y', 0xF5, b'r', b' ', b' '];
    let data = build_dbf(&[("CITY", b'C', 6)], &[(false, city.to_vec())]);

    let reader = DbfReader::new(data.as_slice(), CodePage::WINDOWS_1250).unwrap();
    assert_eq!(reader.language_driver(), 0xC8);
    let records: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(records[0][0], DbfValue::Character("Győr".into()));
}

#[test]
fn deleted_records_are_skipped() {
    let data = build_dbf(
        &[("KOD", b'C', 4)],
        &[
            (false, pad(b"A-01", 4)),
            (true, pad(b"GONE", 4)),
            (false, pad(b"B-02", 4)),
        ],
    );
    let reader = DbfReader::new(data.as_slice(), CodePage::WINDOWS_1250).unwrap();
    let records: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0][0], DbfValue::Character("A-01".into()));
    assert_eq!(records[1][0], DbfValue::Character("B-02".into()));
}

#[test]
fn truncated_stream_errors_and_fuses() {
    let mut data = build_dbf(&[("KOD", b'C', 4)], &[(false, pad(b"A-01", 4))]);
    // Chop the EOF marker and half the record.
    data.truncate(data.len() - 4);

    let reader = DbfReader::new(data.as_slice(), CodePage::WINDOWS_1250).unwrap();
    let mut records = reader.records();
    assert!(matches!(
        records.next(),
        Some(Err(DbfError::TruncatedRecord { .. }))
    ));
    assert!(records.next().is_none());
}

#[test]
fn malformed_header_is_rejected() {
    let result = DbfReader::new(&b"not a dbf"[..], CodePage::WINDOWS_1250);
    assert!(matches!(result, Err(DbfError::InvalidHeader { .. })));
}

#[test]
fn open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = DbfReader::open(&dir.path().join("absent.dbf"), CodePage::WINDOWS_1250);
    assert!(matches!(result, Err(DbfError::FileNotFound { .. })));
}
