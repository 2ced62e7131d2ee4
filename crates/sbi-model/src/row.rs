//! The generic row container produced at the decoder boundary.

use std::collections::BTreeMap;

use crate::value::FieldValue;

/// One decoded table row, mapping lowercase field names to typed values.
///
/// Every row carries the record-kind it was decoded for; the intake pipeline
/// injects it when it pairs a table file with its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow {
    kind: String,
    fields: BTreeMap<String, FieldValue>,
}

impl TypedRow {
    /// Create an empty row for a record-kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: BTreeMap::new(),
        }
    }

    /// The record-kind this row belongs to.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Insert a field value. The name is lowercased.
    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_lowercase(), value);
    }

    /// Builder-style variant of [`TypedRow::set`].
    #[must_use]
    pub fn with(mut self, name: &str, value: FieldValue) -> Self {
        self.set(name, value);
        self
    }

    /// Look up a field by (lowercase) name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Copy of this row under another record-kind.
    ///
    /// Deletion-marker rows name their target kind indirectly (via a legacy
    /// type code); the reconciler re-kinds them before key resolution.
    #[must_use]
    pub fn rekinded(&self, kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: self.fields.clone(),
        }
    }

    /// Iterate over the fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields in the row.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_are_lowercased() {
        let mut row = TypedRow::new("store");
        row.set("KOD", FieldValue::Text("A-01".into()));
        assert_eq!(row.get("kod"), Some(&FieldValue::Text("A-01".into())));
        assert!(row.get("KOD").is_none());
    }

    #[test]
    fn fields_iterate_in_name_order() {
        let row = TypedRow::new("store")
            .with("b", FieldValue::Number(2.0))
            .with("a", FieldValue::Number(1.0));
        let names: Vec<&str> = row.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
