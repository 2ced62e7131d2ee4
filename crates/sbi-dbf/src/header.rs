//! DBF header and field descriptor parsing.
//!
//! Layout (dBase III/IV):
//!
//! ```text
//! offset  size  content
//! 0       1     version tag
//! 1       3     last update (YY MM DD)
//! 4       4     record count (u32 LE)
//! 8       2     header length (u16 LE), includes descriptors + terminator
//! 10      2     record length (u16 LE), includes the deletion flag byte
//! 29      1     language driver id
//! 32      32*n  field descriptors, terminated by 0x0D
//! ```

use crate::error::{DbfError, Result};
use crate::types::{DbfField, FieldType};

/// Size of the fixed table header.
pub const TABLE_HEADER_LEN: usize = 32;

/// Size of one field descriptor.
pub const FIELD_DESCRIPTOR_LEN: usize = 32;

/// Terminator byte after the last field descriptor.
pub const FIELD_TERMINATOR: u8 = 0x0D;

/// End-of-file marker after the last record.
pub const EOF_MARKER: u8 = 0x1A;

/// Record deletion flag values.
pub const RECORD_ACTIVE: u8 = b' ';
pub const RECORD_DELETED: u8 = b'*';

/// Parsed fixed header of a DBF table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    pub record_count: u32,
    pub header_len: usize,
    pub record_len: usize,
    pub language_driver: u8,
}

/// Parse the 32-byte fixed header.
pub fn parse_table_header(bytes: &[u8]) -> Result<TableHeader> {
    if bytes.len() < TABLE_HEADER_LEN {
        return Err(DbfError::invalid_header("file shorter than table header"));
    }
    let record_count = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
    let record_len = u16::from_le_bytes([bytes[10], bytes[11]]) as usize;

    if header_len < TABLE_HEADER_LEN + 1 {
        return Err(DbfError::invalid_header(format!(
            "header length {header_len} too small"
        )));
    }
    // Every record carries at least the deletion flag byte.
    if record_len < 1 {
        return Err(DbfError::invalid_header("record length is zero"));
    }

    Ok(TableHeader {
        record_count,
        header_len,
        record_len,
        language_driver: bytes[29],
    })
}

/// Parse the field descriptor array.
///
/// `bytes` must span from the end of the fixed header to the end of the
/// declared header area. Validates that descriptor widths sum to the
/// declared record length.
pub fn parse_field_descriptors(bytes: &[u8], header: &TableHeader) -> Result<Vec<DbfField>> {
    let mut fields = Vec::new();
    let mut offset = 0usize;

    loop {
        if offset >= bytes.len() {
            return Err(DbfError::invalid_header(
                "field descriptor terminator missing",
            ));
        }
        if bytes[offset] == FIELD_TERMINATOR {
            break;
        }
        if offset + FIELD_DESCRIPTOR_LEN > bytes.len() {
            return Err(DbfError::invalid_header("truncated field descriptor"));
        }
        let descriptor = &bytes[offset..offset + FIELD_DESCRIPTOR_LEN];
        fields.push(parse_descriptor(descriptor)?);
        offset += FIELD_DESCRIPTOR_LEN;
    }

    if fields.is_empty() {
        return Err(DbfError::invalid_header("table has no fields"));
    }

    let expected_len: usize = 1 + fields.iter().map(|f| f.length).sum::<usize>();
    if expected_len != header.record_len {
        return Err(DbfError::invalid_header(format!(
            "field widths sum to {expected_len} but record length is {}",
            header.record_len
        )));
    }

    Ok(fields)
}

fn parse_descriptor(descriptor: &[u8]) -> Result<DbfField> {
    let name_bytes = &descriptor[..11];
    let name_end = name_bytes.iter().position(|&b| b == 0).unwrap_or(11);
    let name = std::str::from_utf8(&name_bytes[..name_end])
        .map_err(|_| DbfError::invalid_header("field name is not ASCII"))?
        .trim()
        .to_lowercase();
    if name.is_empty() {
        return Err(DbfError::invalid_header("field with empty name"));
    }
    let field_type = FieldType::from_tag(descriptor[11], &name)?;
    let length = descriptor[16] as usize;
    if length == 0 {
        return Err(DbfError::invalid_header(format!(
            "field '{name}' has zero length"
        )));
    }
    Ok(DbfField {
        name,
        field_type,
        length,
        decimals: descriptor[17],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, tag: u8, length: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        bytes[11] = tag;
        bytes[16] = length;
        bytes
    }

    #[test]
    fn parses_fixed_header() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x03;
        bytes[4..8].copy_from_slice(&7u32.to_le_bytes());
        bytes[8..10].copy_from_slice(&97u16.to_le_bytes());
        bytes[10..12].copy_from_slice(&11u16.to_le_bytes());
        bytes[29] = 0xC8;

        let header = parse_table_header(&bytes).unwrap();
        assert_eq!(header.record_count, 7);
        assert_eq!(header.header_len, 97);
        assert_eq!(header.record_len, 11);
        assert_eq!(header.language_driver, 0xC8);
    }

    #[test]
    fn descriptor_widths_must_match_record_len() {
        let header = TableHeader {
            record_count: 0,
            header_len: 97,
            record_len: 11,
            language_driver: 0,
        };
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&descriptor("KOD", b'C', 10));
        bytes.push(FIELD_TERMINATOR);
        let fields = parse_field_descriptors(&bytes, &header).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "kod");
        assert_eq!(fields[0].length, 10);

        // Record length off by one: 1 flag byte + 10 != 12.
        let bad = TableHeader {
            record_len: 12,
            ..header
        };
        assert!(parse_field_descriptors(&bytes, &bad).is_err());
    }

    #[test]
    fn missing_terminator_is_invalid() {
        let header = TableHeader {
            record_count: 0,
            header_len: 97,
            record_len: 11,
            language_driver: 0,
        };
        let bytes = descriptor("KOD", b'C', 10);
        let result = parse_field_descriptors(&bytes, &header);
        assert!(matches!(result, Err(DbfError::InvalidHeader { .. })));
    }
}
