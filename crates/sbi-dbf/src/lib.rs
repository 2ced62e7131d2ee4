//! dBase (DBF) table file reader.
//!
//! This crate decodes the legacy columnar table format shipped inside
//! point-of-sale export archives: a self-describing header (record count,
//! record length, 32-byte field descriptors) followed by fixed-layout
//! records. Character data is stored in a single-byte code page (Central
//! European Windows-1250 for the supported source system) and decoded via
//! [`CodePage`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use sbi_dbf::{CodePage, DbfReader, DbfValue};
//!
//! let reader = DbfReader::open(Path::new("store.dbf"), CodePage::WINDOWS_1250).unwrap();
//! let fields: Vec<String> = reader.field_names().map(String::from).collect();
//! for record in reader.records() {
//!     let record = record.unwrap();
//!     for (name, value) in fields.iter().zip(&record) {
//!         println!("{name} = {value:?}");
//!     }
//! }
//! ```
//!
//! Rows are produced lazily by a finite, non-restartable iterator; records
//! flagged deleted in the file are skipped. Textual values come back
//! trimmed, numeric/date/logical values in their native representation, and
//! blank fields as [`DbfValue::Null`].

mod codepage;
mod error;
pub mod header;
mod reader;
mod types;

pub use codepage::CodePage;
pub use error::{DbfError, Result};
pub use reader::{DbfReader, Records, read_dbf};
pub use types::{DbfField, DbfValue, FieldType};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
