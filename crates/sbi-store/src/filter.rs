//! Document filters and ordering for store queries.

use serde_json::Value;

/// A predicate over document fields.
///
/// The capability surface is deliberately small: the pipelines only need
/// equality, membership, and a less-than comparison for retention cutoffs.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Match every document of the kind.
    All,
    /// Field equals a value.
    Eq(String, Value),
    /// Field is one of a set of values.
    In(String, Vec<Value>),
    /// Field is strictly less than a value (string or numeric compare).
    Lt(String, Value),
}

impl Filter {
    /// Equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    /// Membership filter.
    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In(field.into(), values)
    }

    /// Less-than filter.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt(field.into(), value.into())
    }

    /// Whether a document matches this filter.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Self::All => true,
            Self::Eq(field, value) => doc.get(field) == Some(value),
            Self::In(field, values) => doc
                .get(field)
                .is_some_and(|actual| values.iter().any(|v| v == actual)),
            Self::Lt(field, value) => doc
                .get(field)
                .is_some_and(|actual| compare_values(actual, value) == Some(std::cmp::Ordering::Less)),
        }
    }
}

/// Ordering for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub ascending: bool,
}

impl OrderBy {
    /// Ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    /// Descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }
}

/// Compare two JSON scalars.
///
/// Numbers compare numerically, strings lexicographically (which matches
/// chronological order for RFC 3339 timestamps); mixed or non-scalar types
/// do not compare.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
