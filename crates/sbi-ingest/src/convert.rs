//! Conversion from decoder values to model rows.

use sbi_dbf::{DbfField, DbfValue};
use sbi_model::{FieldValue, TypedRow};

/// Convert one decoded DBF value into its model representation.
pub fn field_value_from_dbf(value: DbfValue) -> FieldValue {
    match value {
        DbfValue::Character(s) => FieldValue::Text(s),
        DbfValue::Numeric(n) => FieldValue::Number(n),
        DbfValue::Date(d) => FieldValue::Date(d),
        DbfValue::Logical(b) => FieldValue::Bool(b),
        DbfValue::Null => FieldValue::Null,
    }
}

/// Build a typed row from one decoded record.
///
/// Field names are already lowercased by the decoder; the record-kind is
/// injected from the descriptor that selected the table.
pub fn row_from_record(kind: &str, fields: &[DbfField], values: Vec<DbfValue>) -> TypedRow {
    let mut row = TypedRow::new(kind);
    for (field, value) in fields.iter().zip(values) {
        row.set(&field.name, field_value_from_dbf(value));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbi_dbf::FieldType;

    #[test]
    fn record_becomes_row_with_kind() {
        let fields = vec![
            DbfField {
                name: "kod".into(),
                field_type: FieldType::Character,
                length: 6,
                decimals: 0,
            },
            DbfField {
                name: "qty".into(),
                field_type: FieldType::Numeric,
                length: 8,
                decimals: 2,
            },
        ];
        let row = row_from_record(
            "sales",
            &fields,
            vec![DbfValue::Character("A-01".into()), DbfValue::Numeric(3.0)],
        );
        assert_eq!(row.kind(), "sales");
        assert_eq!(row.get("kod"), Some(&FieldValue::Text("A-01".into())));
        assert_eq!(row.get("qty"), Some(&FieldValue::Number(3.0)));
    }
}
