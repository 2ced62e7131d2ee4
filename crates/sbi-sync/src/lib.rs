//! Default analytics content sync for Storefront-BI.
//!
//! Every deployment ships the same default workbooks, queries, charts and
//! dashboards, but each deployment mints its own local record names. Sync
//! matches roots across deployments by a stable identifier derived from the
//! workbook title, removes defaults the catalog dropped, creates the ones
//! it added, and replaces every dependent record wholesale while rewriting
//! workbook references from the exporting deployment's local ids to this
//! one's names.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod export;

pub use catalog::{CHART_FILE, ContentCatalog, DASHBOARD_FILE, QUERY_FILE, WORKBOOK_FILE};
pub use engine::{AccessControl, ContentSync, DEPENDENT_KINDS, NoopAccess, SyncReport};
pub use error::{Result, SyncError};
pub use export::{ExportReport, export_catalog};
