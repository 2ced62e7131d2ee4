//! DBF file reader.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;

use crate::codepage::CodePage;
use crate::error::{DbfError, Result};
use crate::header::{
    EOF_MARKER, RECORD_DELETED, TABLE_HEADER_LEN, TableHeader, parse_field_descriptors,
    parse_table_header,
};
use crate::types::{DbfField, DbfValue, FieldType};

/// DBF table reader.
///
/// Opening the table parses the header and field descriptors eagerly;
/// records are decoded lazily by the iterator returned from
/// [`DbfReader::records`]. The iterator consumes the reader, so a table can
/// be traversed exactly once.
pub struct DbfReader<R: Read> {
    reader: BufReader<R>,
    header: TableHeader,
    fields: Vec<DbfField>,
    code_page: CodePage,
}

impl DbfReader<File> {
    /// Open a DBF file with the given code page.
    pub fn open(path: &Path, code_page: CodePage) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DbfError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DbfError::Io(e)
            }
        })?;
        Self::new(file, code_page)
    }
}

impl<R: Read> DbfReader<R> {
    /// Read and validate the table header from any byte source.
    pub fn new(inner: R, code_page: CodePage) -> Result<Self> {
        let mut reader = BufReader::new(inner);

        let mut header_bytes = [0u8; TABLE_HEADER_LEN];
        reader
            .read_exact(&mut header_bytes)
            .map_err(|_| DbfError::invalid_header("file shorter than table header"))?;
        let header = parse_table_header(&header_bytes)?;

        let mut descriptor_bytes = vec![0u8; header.header_len - TABLE_HEADER_LEN];
        reader
            .read_exact(&mut descriptor_bytes)
            .map_err(|_| DbfError::invalid_header("file shorter than declared header"))?;
        let fields = parse_field_descriptors(&descriptor_bytes, &header)?;

        Ok(Self {
            reader,
            header,
            fields,
            code_page,
        })
    }

    /// Field metadata in record order.
    pub fn fields(&self) -> &[DbfField] {
        &self.fields
    }

    /// Field names (lowercased) in record order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Declared number of records (including deleted ones).
    pub fn record_count(&self) -> u32 {
        self.header.record_count
    }

    /// Language driver byte from the header.
    pub fn language_driver(&self) -> u8 {
        self.header.language_driver
    }

    /// Consume the reader and iterate over the active records.
    ///
    /// Deleted records are skipped. Each item is the record's values in
    /// field order; pair them with [`DbfReader::fields`] taken beforehand.
    pub fn records(self) -> Records<R> {
        Records {
            reader: self.reader,
            header: self.header,
            fields: self.fields,
            code_page: self.code_page,
            index: 0,
            done: false,
        }
    }
}

/// Lazy iterator over active DBF records.
///
/// Fused on the first error: a corrupt record stream ends the table.
pub struct Records<R: Read> {
    reader: BufReader<R>,
    header: TableHeader,
    fields: Vec<DbfField>,
    code_page: CodePage,
    index: usize,
    done: bool,
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<Vec<DbfValue>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let mut flag = [0u8; 1];
            match self.reader.read(&mut flag) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(DbfError::Io(e)));
                }
            }
            if flag[0] == EOF_MARKER {
                self.done = true;
                return None;
            }

            let mut body = vec![0u8; self.header.record_len - 1];
            if self.reader.read_exact(&mut body).is_err() {
                self.done = true;
                return Some(Err(DbfError::TruncatedRecord { index: self.index }));
            }
            self.index += 1;

            if flag[0] == RECORD_DELETED {
                continue;
            }

            match decode_record(&body, &self.fields, self.code_page) {
                Ok(values) => return Some(Ok(values)),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn decode_record(body: &[u8], fields: &[DbfField], code_page: CodePage) -> Result<Vec<DbfValue>> {
    let mut values = Vec::with_capacity(fields.len());
    let mut offset = 0usize;
    for field in fields {
        let raw = &body[offset..offset + field.length];
        offset += field.length;
        values.push(decode_field(field, raw, code_page)?);
    }
    Ok(values)
}

fn decode_field(field: &DbfField, raw: &[u8], code_page: CodePage) -> Result<DbfValue> {
    if field.field_type.is_textual() {
        let decoded = code_page.decode(raw);
        return Ok(DbfValue::Character(decoded.trim().to_string()));
    }
    // The remaining types are stored as ASCII text.
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim();
    match field.field_type {
        FieldType::Numeric | FieldType::Float => {
            // Overflowed numerics are written as asterisks; treat as blank.
            if trimmed.is_empty() || trimmed.bytes().all(|b| b == b'*') {
                return Ok(DbfValue::Null);
            }
            trimmed
                .parse::<f64>()
                .map(DbfValue::Numeric)
                .map_err(|_| DbfError::invalid_numeric(&field.name, trimmed))
        }
        FieldType::Date => {
            if trimmed.is_empty() {
                return Ok(DbfValue::Null);
            }
            NaiveDate::parse_from_str(trimmed, "%Y%m%d")
                .map(DbfValue::Date)
                .map_err(|_| DbfError::invalid_date(&field.name, trimmed))
        }
        FieldType::Logical => Ok(match raw.first() {
            Some(b'T' | b't' | b'Y' | b'y') => DbfValue::Logical(true),
            Some(b'F' | b'f' | b'N' | b'n') => DbfValue::Logical(false),
            _ => DbfValue::Null,
        }),
        FieldType::Character | FieldType::Memo => unreachable!("handled above"),
    }
}

/// Read every active record of a DBF file into memory.
pub fn read_dbf(path: &Path, code_page: CodePage) -> Result<(Vec<DbfField>, Vec<Vec<DbfValue>>)> {
    let reader = DbfReader::open(path, code_page)?;
    let fields = reader.fields().to_vec();
    let records = reader.records().collect::<Result<Vec<_>>>()?;
    Ok((fields, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_decoding() {
        let field = DbfField {
            name: "active".into(),
            field_type: FieldType::Logical,
            length: 1,
            decimals: 0,
        };
        let page = CodePage::WINDOWS_1250;
        assert_eq!(decode_field(&field, b"T", page).unwrap(), DbfValue::Logical(true));
        assert_eq!(decode_field(&field, b"n", page).unwrap(), DbfValue::Logical(false));
        assert_eq!(decode_field(&field, b"?", page).unwrap(), DbfValue::Null);
    }

    #[test]
    fn numeric_blank_and_overflow() {
        let field = DbfField {
            name: "qty".into(),
            field_type: FieldType::Numeric,
            length: 8,
            decimals: 2,
        };
        let page = CodePage::WINDOWS_1250;
        assert_eq!(decode_field(&field, b"   12.50", page).unwrap(), DbfValue::Numeric(12.5));
        assert_eq!(decode_field(&field, b"        ", page).unwrap(), DbfValue::Null);
        assert_eq!(decode_field(&field, b"********", page).unwrap(), DbfValue::Null);
        assert!(decode_field(&field, b"   12x50", page).is_err());
    }

    #[test]
    fn date_decoding() {
        let field = DbfField {
            name: "day".into(),
            field_type: FieldType::Date,
            length: 8,
            decimals: 0,
        };
        let page = CodePage::WINDOWS_1250;
        assert_eq!(
            decode_field(&field, b"20250301", page).unwrap(),
            DbfValue::Date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
        );
        assert_eq!(decode_field(&field, b"        ", page).unwrap(), DbfValue::Null);
        assert!(decode_field(&field, b"20251301", page).is_err());
    }
}
