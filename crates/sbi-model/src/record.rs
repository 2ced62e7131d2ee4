//! Canonical records: the stored form of reconciled rows.

use serde_json::{Map, Value};

use crate::row::TypedRow;

/// A stored entity of a record-kind, keyed by its resolved primary key.
///
/// The document store persists records as JSON objects; the `name` field
/// holds the resolved key (composite keys are `/`-joined by the resolver).
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub kind: String,
    pub name: String,
    pub fields: Map<String, Value>,
}

impl CanonicalRecord {
    /// Build a record from a decoded row and its resolved key.
    pub fn from_row(row: &TypedRow, name: impl Into<String>) -> Self {
        let mut fields = Map::new();
        for (field, value) in row.fields() {
            fields.insert(field.to_string(), value.to_json());
        }
        Self {
            kind: row.kind().to_string(),
            name: name.into(),
            fields,
        }
    }

    /// Merge another row's fields onto this record. Row fields win.
    pub fn merge_row(&mut self, row: &TypedRow) {
        for (field, value) in row.fields() {
            self.fields.insert(field.to_string(), value.to_json());
        }
    }

    /// Render as the JSON document persisted by the store.
    ///
    /// The `name` is embedded so that filtered listings can see it.
    pub fn to_document(&self) -> Value {
        let mut doc = self.fields.clone();
        doc.insert("name".to_string(), Value::String(self.name.clone()));
        Value::Object(doc)
    }

    /// Rebuild a record from a stored document.
    pub fn from_document(kind: impl Into<String>, name: impl Into<String>, doc: &Value) -> Self {
        let mut fields = doc.as_object().cloned().unwrap_or_default();
        fields.remove("name");
        Self {
            kind: kind.into(),
            name: name.into(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    #[test]
    fn merge_overwrites_with_row_fields() {
        let first = TypedRow::new("store")
            .with("code", FieldValue::Text("A-01".into()))
            .with("city", FieldValue::Text("Pécs".into()));
        let mut record = CanonicalRecord::from_row(&first, "A-01");

        let second = TypedRow::new("store")
            .with("code", FieldValue::Text("A-01".into()))
            .with("city", FieldValue::Text("Győr".into()));
        record.merge_row(&second);

        assert_eq!(record.fields["city"], Value::String("Győr".into()));
        assert_eq!(record.fields["code"], Value::String("A-01".into()));
    }

    #[test]
    fn document_round_trip_keeps_name() {
        let row = TypedRow::new("store").with("code", FieldValue::Text("A-01".into()));
        let record = CanonicalRecord::from_row(&row, "A-01");
        let doc = record.to_document();
        assert_eq!(doc["name"], Value::String("A-01".into()));

        let back = CanonicalRecord::from_document("store", "A-01", &doc);
        assert_eq!(back, record);
    }
}
