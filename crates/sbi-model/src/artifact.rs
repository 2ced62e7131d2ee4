//! The default artifact set: workbooks and their dependent records.
//!
//! A workbook's local `name` is regenerated in every environment, so it
//! cannot join records across deployments. The stable identifier ("vir id"),
//! derived deterministically from the human title, is the cross-environment
//! key the sync engine matches on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Record-kinds of the artifact set.
pub const WORKBOOK_KIND: &str = "workbook";
pub const QUERY_KIND: &str = "query";
pub const CHART_KIND: &str = "chart";
pub const DASHBOARD_KIND: &str = "dashboard";

/// Prefix of every derived stable identifier.
pub const STABLE_ID_PREFIX: &str = "vir-";

/// Derive the stable identifier from a workbook title.
///
/// Leading underscores (the reserved default-title schema) are stripped, the
/// remainder lowercased and spaces replaced, so `"_Accounts"` becomes
/// `"vir-accounts"`. The derivation is deterministic: two environments that
/// author the same titled workbook agree on its stable id.
pub fn stable_id_from_title(title: &str) -> String {
    let cleaned = title.trim_start_matches('_').to_lowercase().replace(' ', "_");
    format!("{STABLE_ID_PREFIX}{cleaned}")
}

/// A workbook reference as it appears in catalog files.
///
/// External catalogs identify workbooks by a session-scoped id that may be
/// serialized as an integer or a string; both forms of the same id compare
/// equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefId {
    Int(i64),
    Str(String),
}

impl RefId {
    /// Canonical string form, used as the lookup key during re-linking.
    pub fn canonical(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Str(s) => s.clone(),
        }
    }
}

impl PartialEq for RefId {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for RefId {}

impl std::hash::Hash for RefId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl std::fmt::Display for RefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<i64> for RefId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for RefId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

/// The root artifact of the default set.
///
/// Unknown catalog fields are preserved via the flattened `extra` map so a
/// sync does not strip content authored by newer tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub name: String,
    pub title: String,
    /// Stable cross-environment identifier; required when `is_default`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable_id: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workbook {
    /// Create a workbook with no content.
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            stable_id: None,
            is_default: false,
            extra: Map::new(),
        }
    }

    /// Derive and set the stable id when the title uses the default schema.
    ///
    /// Mirrors the authoring-side flow: a workbook titled with a leading
    /// underscore is promoted to a default artifact with a derived stable
    /// id; other titles are left untouched. Already-set stable ids are
    /// immutable.
    pub fn promote_default(&mut self) {
        if !self.title.starts_with('_') {
            return;
        }
        if self.stable_id.is_none() {
            self.stable_id = Some(stable_id_from_title(&self.title));
        }
        self.is_default = true;
    }
}

/// Demote a workbook saved by an unprivileged author whose title uses the
/// reserved default schema.
///
/// Returns true when the workbook was modified. Privileged callers (the
/// sync engine, the export command) skip this guard.
pub fn demote_reserved_title(workbook: &mut Workbook) -> bool {
    if !workbook.title.starts_with('_') {
        return false;
    }
    workbook.title = workbook.title.trim_start_matches('_').to_string();
    workbook.is_default = false;
    true
}

/// Capability exposed by the three dependent artifact kinds.
///
/// The sync engine treats queries, charts, and dashboards uniformly: it only
/// needs a kind, a name, and get/set access to the workbook reference it
/// rewrites during re-linking.
pub trait DependentArtifact: Serialize + for<'de> Deserialize<'de> {
    /// Record-kind of this dependent.
    const KIND: &'static str;

    /// Local storage identifier, preserved across sync.
    fn name(&self) -> &str;

    /// The workbook this artifact belongs to.
    fn workbook_ref(&self) -> &RefId;

    /// Rewrite the workbook reference to a local storage identifier.
    fn set_workbook_ref(&mut self, reference: RefId);
}

macro_rules! dependent_artifact {
    ($type:ident, $kind:expr) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $type {
            pub name: String,
            #[serde(default)]
            pub title: String,
            pub workbook: RefId,
            #[serde(flatten)]
            pub extra: Map<String, Value>,
        }

        impl DependentArtifact for $type {
            const KIND: &'static str = $kind;

            fn name(&self) -> &str {
                &self.name
            }

            fn workbook_ref(&self) -> &RefId {
                &self.workbook
            }

            fn set_workbook_ref(&mut self, reference: RefId) {
                self.workbook = reference;
            }
        }
    };
}

dependent_artifact!(Query, QUERY_KIND);
dependent_artifact!(Chart, CHART_KIND);
dependent_artifact!(Dashboard, DASHBOARD_KIND);
