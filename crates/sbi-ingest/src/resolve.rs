//! Primary-key resolution.

use sbi_model::{DescriptorSet, ModelError, TypedRow};

use crate::error::Result;

/// Resolve the canonical storage key for a row.
///
/// The row's kind descriptor names the key fields. A composite expression
/// joins the row's values with `/`, trimming any separators left trailing by
/// empty components; a single-field expression uses the value verbatim. A
/// missing descriptor, or a key field that is absent or blank in the row, is
/// an error: the caller decides whether to skip the row or abort (the
/// pipeline skips and logs).
pub fn resolve_key(row: &TypedRow, descriptors: &DescriptorSet) -> Result<String> {
    let descriptor = descriptors.get(row.kind())?;
    let fields = descriptor.key_fields();

    let mut components = Vec::with_capacity(fields.len());
    for field in &fields {
        let component = row
            .get(field)
            .and_then(|value| value.as_key_component())
            .ok_or_else(|| ModelError::missing_key_field(row.kind(), *field))?;
        components.push(component);
    }

    if components.len() == 1 {
        Ok(components.pop().unwrap_or_default())
    } else {
        let mut key = components.join("/");
        while key.ends_with('/') {
            key.pop();
        }
        Ok(key)
    }
}
