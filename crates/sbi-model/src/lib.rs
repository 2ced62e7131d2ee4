//! Shared data model for Storefront-BI.
//!
//! This crate holds the types that flow between the decoder, the intake
//! pipeline, the document store, and the content sync engine:
//!
//! - [`FieldValue`] and [`TypedRow`]: the generic row container produced at
//!   the decoder boundary.
//! - [`KindDescriptor`] and [`DescriptorSet`]: the legacy-table to
//!   record-kind mapping, including primary-key expressions and import
//!   ordering.
//! - [`CanonicalRecord`]: a stored entity keyed by its resolved primary key.
//! - [`DataPacket`]: one delivered legacy export bundle.
//! - The default artifact set: [`Workbook`] plus the three dependent kinds
//!   ([`Query`], [`Chart`], [`Dashboard`]) unified by the
//!   [`DependentArtifact`] capability.

pub mod artifact;
pub mod descriptor;
pub mod error;
pub mod packet;
pub mod record;
pub mod row;
pub mod value;

pub use artifact::{
    CHART_KIND, Chart, DASHBOARD_KIND, Dashboard, DependentArtifact, QUERY_KIND, Query, RefId,
    WORKBOOK_KIND, Workbook, demote_reserved_title, stable_id_from_title,
};
pub use descriptor::{DELETION_KIND, DescriptorSet, KindDescriptor, TYPE_CODE_FIELD};
pub use error::{ModelError, Result};
pub use packet::{DataPacket, PACKET_KIND, timestamp};
pub use record::CanonicalRecord;
pub use row::TypedRow;
pub use value::FieldValue;
