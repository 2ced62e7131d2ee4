//! In-memory document store with commit/rollback semantics.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::filter::{Filter, OrderBy, compare_values};
use crate::DocumentStore;

type Documents = BTreeMap<String, BTreeMap<String, Value>>;

#[derive(Debug, Default)]
struct State {
    /// Last committed documents.
    committed: Documents,
    /// Working copy all mutations apply to.
    working: Documents,
}

/// An in-memory [`DocumentStore`].
///
/// Mutations land in a working copy; `commit` publishes it, `rollback`
/// restores the last committed state. The whole store can be snapshotted to
/// a JSON file, which is how the CLI keeps state across invocations.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a snapshot file written by
    /// [`MemoryStore::write_snapshot`]. A missing file yields an empty store.
    pub fn from_snapshot(path: &Path) -> Result<Self> {
        let store = Self::new();
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let documents: Documents = serde_json::from_str(&raw)?;
                let mut state = store.lock();
                state.committed = documents.clone();
                state.working = documents;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no snapshot file, starting empty");
            }
            Err(e) => return Err(StoreError::Io(e)),
        }
        Ok(store)
    }

    /// Write the committed state to a snapshot file.
    pub fn write_snapshot(&self, path: &Path) -> Result<()> {
        let raw = {
            let state = self.lock();
            serde_json::to_string_pretty(&state.committed)?
        };
        std::fs::write(path, raw)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock means a writer panicked mid-mutation; the working
        // copy is still structurally valid JSON, so recover the guard.
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

impl DocumentStore for MemoryStore {
    fn exists(&self, kind: &str, name: &str) -> Result<bool> {
        let state = self.lock();
        Ok(state
            .working
            .get(kind)
            .is_some_and(|docs| docs.contains_key(name)))
    }

    fn get(&self, kind: &str, name: &str) -> Result<Option<Value>> {
        let state = self.lock();
        Ok(state
            .working
            .get(kind)
            .and_then(|docs| docs.get(name))
            .cloned())
    }

    fn insert(&self, kind: &str, name: &str, doc: Value) -> Result<()> {
        if !doc.is_object() {
            return Err(StoreError::NotAnObject {
                kind: kind.to_string(),
                name: name.to_string(),
            });
        }
        let mut state = self.lock();
        let docs = state.working.entry(kind.to_string()).or_default();
        if docs.contains_key(name) {
            return Err(StoreError::duplicate(kind, name));
        }
        docs.insert(name.to_string(), doc);
        Ok(())
    }

    fn update(&self, kind: &str, name: &str, doc: Value) -> Result<()> {
        if !doc.is_object() {
            return Err(StoreError::NotAnObject {
                kind: kind.to_string(),
                name: name.to_string(),
            });
        }
        let mut state = self.lock();
        let docs = state
            .working
            .get_mut(kind)
            .ok_or_else(|| StoreError::not_found(kind, name))?;
        match docs.get_mut(name) {
            Some(existing) => {
                *existing = doc;
                Ok(())
            }
            None => Err(StoreError::not_found(kind, name)),
        }
    }

    fn delete(&self, kind: &str, name: &str) -> Result<bool> {
        let mut state = self.lock();
        Ok(state
            .working
            .get_mut(kind)
            .is_some_and(|docs| docs.remove(name).is_some()))
    }

    fn delete_where(&self, kind: &str, filter: &Filter) -> Result<usize> {
        let mut state = self.lock();
        let Some(docs) = state.working.get_mut(kind) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|_, doc| !filter.matches(doc));
        Ok(before - docs.len())
    }

    fn count(&self, kind: &str, filter: &Filter) -> Result<usize> {
        let state = self.lock();
        Ok(state
            .working
            .get(kind)
            .map_or(0, |docs| docs.values().filter(|d| filter.matches(d)).count()))
    }

    fn list(&self, kind: &str, filter: &Filter, order: Option<&OrderBy>) -> Result<Vec<Value>> {
        let state = self.lock();
        let mut docs: Vec<Value> = state
            .working
            .get(kind)
            .map(|docs| {
                docs.values()
                    .filter(|d| filter.matches(d))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(order) = order {
            docs.sort_by(|a, b| {
                let ordering = match (a.get(&order.field), b.get(&order.field)) {
                    (Some(x), Some(y)) => {
                        compare_values(x, y).unwrap_or(std::cmp::Ordering::Equal)
                    }
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                };
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        Ok(docs)
    }

    fn commit(&self) -> Result<()> {
        let mut state = self.lock();
        state.committed = state.working.clone();
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let mut state = self.lock();
        state.working = state.committed.clone();
        Ok(())
    }
}
