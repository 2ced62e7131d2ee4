//! Record-kind descriptors: the legacy table to local record-kind mapping.
//!
//! Descriptors are data, not code: deployments configure one document per
//! legacy table. The intake pipeline loads them once per run into a
//! [`DescriptorSet`] snapshot and passes that by reference to the resolver
//! and reconciler, so no component depends on ambient mutable state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Record-kind of deletion-marker rows in a legacy export.
///
/// Rows of this kind do not describe an entity; they name one to delete,
/// via a legacy type code plus the target kind's key fields.
pub const DELETION_KIND: &str = "deleted";

/// Row field holding the legacy type code on deletion-marker rows.
pub const TYPE_CODE_FIELD: &str = "rec_type";

/// Describes one legacy table to record-kind mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindDescriptor {
    /// Record-kind name; also the legacy table file stem (`<kind>.dbf`).
    pub kind: String,
    /// Storage key expression: one field name, or a comma-separated
    /// composite field list.
    pub key_expr: String,
    /// Disabled descriptors are skipped by the intake pipeline.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whole-dataset-replace: the legacy export for this kind is a full
    /// snapshot, so existing records are purged before import.
    #[serde(default)]
    pub replace_all: bool,
    /// Processing sequence; dependency kinds must sort before dependents.
    #[serde(default)]
    pub import_order: i32,
    /// Legacy type code used by deletion-marker rows to name this kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
}

fn default_true() -> bool {
    true
}

impl KindDescriptor {
    /// Construct a minimal enabled descriptor.
    pub fn new(kind: impl Into<String>, key_expr: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key_expr: key_expr.into(),
            enabled: true,
            replace_all: false,
            import_order: 0,
            type_code: None,
        }
    }

    /// Set the import order.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.import_order = order;
        self
    }

    /// Mark the kind as whole-dataset-replace.
    #[must_use]
    pub fn with_replace_all(mut self, replace_all: bool) -> Self {
        self.replace_all = replace_all;
        self
    }

    /// Attach the legacy deletion type code.
    #[must_use]
    pub fn with_type_code(mut self, code: impl Into<String>) -> Self {
        self.type_code = Some(code.into());
        self
    }

    /// Split the key expression into its component field names.
    pub fn key_fields(&self) -> Vec<&str> {
        self.key_expr
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect()
    }
}

/// An immutable snapshot of the configured descriptors for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    by_kind: BTreeMap<String, KindDescriptor>,
    kind_by_type_code: BTreeMap<String, String>,
}

impl DescriptorSet {
    /// Build a set from individual descriptors.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate kind or an empty key expression; a descriptor
    /// that cannot resolve keys would otherwise fail only mid-import.
    pub fn from_descriptors(descriptors: Vec<KindDescriptor>) -> Result<Self> {
        let mut by_kind = BTreeMap::new();
        let mut kind_by_type_code = BTreeMap::new();
        for descriptor in descriptors {
            if descriptor.key_fields().is_empty() {
                return Err(ModelError::InvalidKeyExpr {
                    kind: descriptor.kind.clone(),
                    key_expr: descriptor.key_expr.clone(),
                });
            }
            if let Some(code) = &descriptor.type_code {
                kind_by_type_code.insert(code.clone(), descriptor.kind.clone());
            }
            if by_kind
                .insert(descriptor.kind.clone(), descriptor.clone())
                .is_some()
            {
                return Err(ModelError::DuplicateKind {
                    kind: descriptor.kind,
                });
            }
        }
        Ok(Self {
            by_kind,
            kind_by_type_code,
        })
    }

    /// Look up the descriptor for a record-kind.
    pub fn get(&self, kind: &str) -> Result<&KindDescriptor> {
        self.by_kind
            .get(kind)
            .ok_or_else(|| ModelError::unknown_kind(kind))
    }

    /// Translate a legacy deletion type code into its record-kind.
    pub fn kind_for_type_code(&self, code: &str) -> Result<&str> {
        self.kind_by_type_code
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| ModelError::unknown_type_code(code))
    }

    /// Enabled descriptors in import order (ascending, then kind name).
    pub fn enabled_ordered(&self) -> Vec<&KindDescriptor> {
        let mut descriptors: Vec<&KindDescriptor> =
            self.by_kind.values().filter(|d| d.enabled).collect();
        descriptors.sort_by(|a, b| {
            a.import_order
                .cmp(&b.import_order)
                .then_with(|| a.kind.cmp(&b.kind))
        });
        descriptors
    }

    /// Number of configured descriptors.
    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_fields_split_and_trim() {
        let descriptor = KindDescriptor::new("sales", "code, date");
        assert_eq!(descriptor.key_fields(), vec!["code", "date"]);
    }

    #[test]
    fn enabled_ordered_sorts_by_import_order() {
        let mut second = KindDescriptor::new("sales", "code,date").with_order(20);
        second.replace_all = true;
        let set = DescriptorSet::from_descriptors(vec![
            second,
            KindDescriptor::new("store", "code").with_order(10),
            KindDescriptor {
                enabled: false,
                ..KindDescriptor::new("legacy", "id").with_order(5)
            },
        ])
        .unwrap();
        let kinds: Vec<&str> = set.enabled_ordered().iter().map(|d| d.kind.as_str()).collect();
        assert_eq!(kinds, vec!["store", "sales"]);
    }

    #[test]
    fn duplicate_kind_is_rejected() {
        let result = DescriptorSet::from_descriptors(vec![
            KindDescriptor::new("store", "code"),
            KindDescriptor::new("store", "other"),
        ]);
        assert!(matches!(result, Err(ModelError::DuplicateKind { .. })));
    }

    #[test]
    fn empty_key_expr_is_rejected() {
        let result = DescriptorSet::from_descriptors(vec![KindDescriptor::new("store", " , ")]);
        assert!(matches!(result, Err(ModelError::InvalidKeyExpr { .. })));
    }

    #[test]
    fn type_code_translation() {
        let set = DescriptorSet::from_descriptors(vec![
            KindDescriptor::new("product", "code").with_type_code("TERM"),
        ])
        .unwrap();
        assert_eq!(set.kind_for_type_code("TERM").unwrap(), "product");
        assert!(set.kind_for_type_code("PARTN").is_err());
    }
}
