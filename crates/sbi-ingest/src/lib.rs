//! Legacy export intake for Storefront-BI.
//!
//! One delivered export is a ZIP archive of DBF tables, one per record-kind.
//! The pipeline extracts the archive, decodes each configured table, resolves
//! every row's storage key from its kind descriptor, and reconciles the row
//! against the document store: inserting, merging, or (for deletion-marker
//! rows) removing records. A retention sweeper removes expired packets and
//! their on-disk artifacts.
//!
//! Table-level failures are logged and skipped; only failing to open the
//! archive itself aborts a run. The store is committed after every table so
//! a crash mid-archive never forces a full replay.

pub mod convert;
pub mod descriptors;
pub mod error;
pub mod jobs;
pub mod packet;
pub mod reconcile;
pub mod resolve;
pub mod sweep;

pub use convert::{field_value_from_dbf, row_from_record};
pub use descriptors::{DESCRIPTOR_KIND, load_descriptor_set, seed_descriptors};
pub use error::{IngestError, Result};
pub use jobs::{Job, JobDispatcher, JobWorker, NullDispatcher, QueueDispatcher, RecordingDispatcher};
pub use packet::{ImportReport, IntakeConfig, KindStats, create_packet, import_new_packets, import_packet};
pub use reconcile::{Outcome, Reconciler};
pub use resolve::resolve_key;
pub use sweep::{FILE_KIND, SweepReport, sweep};
