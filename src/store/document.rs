//! The shared, mutable dataset behind a mock API.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Value};

use crate::store::merge::merge_value;
use crate::store::query::{locate, resolve_mut, select, to_pointer, Segment};
use crate::store::StoreError;

/// Result of a mutation addressed by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The query resolved and the change was applied.
    Applied,
    /// The query resolved to nothing; the dataset is unchanged.
    NotFound,
}

/// In-memory JSON array shared by every request to one API.
///
/// Every operation takes the lock exactly once, for the duration of that
/// operation only. Mutations either apply completely or not at all.
#[derive(Debug)]
pub struct DocumentStore {
    root: RwLock<Value>,
}

impl DocumentStore {
    /// Wrap a loaded dataset. The root must be a JSON array.
    pub fn new(data: Value) -> Result<Self, StoreError> {
        if !data.is_array() {
            return Err(StoreError::NotAnArray);
        }
        Ok(Self {
            root: RwLock::new(data),
        })
    }

    /// An empty dataset.
    pub fn empty() -> Self {
        Self {
            root: RwLock::new(Value::Array(Vec::new())),
        }
    }

    /// Copy of the whole dataset.
    pub fn snapshot(&self) -> Value {
        self.read().clone()
    }

    /// Number of top-level elements.
    pub fn len(&self) -> usize {
        self.read().as_array().map(Vec::len).unwrap_or_default()
    }

    /// Whether the dataset has no top-level elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First node the query resolves to.
    pub fn query_one(&self, query: &str) -> Result<Option<Value>, StoreError> {
        let root = self.read();
        let selected = select(&root, query)?;
        Ok(selected.first().map(|node| (*node).clone()))
    }

    /// Every node the query resolves to, in document order.
    pub fn query_many(&self, query: &str) -> Result<Vec<Value>, StoreError> {
        let root = self.read();
        let selected = select(&root, query)?;
        Ok(selected.into_iter().cloned().collect())
    }

    /// Append a node to the top-level array.
    pub fn append(&self, node: Value) -> Result<(), StoreError> {
        let mut root = self.write();
        match root.as_array_mut() {
            Some(items) => {
                items.push(node);
                Ok(())
            }
            None => Err(StoreError::NotAnArray),
        }
    }

    /// Deep-merge `partial` into the first node the query resolves to.
    pub fn merge_into(&self, query: &str, partial: &Map<String, Value>) -> Result<MutationOutcome, StoreError> {
        let mut root = self.write();
        let Some(path) = find(&root, query)? else {
            return Ok(MutationOutcome::NotFound);
        };

        let node = resolve_mut(&mut root, &path).ok_or_else(|| StoreError::Detached(to_pointer(&path)))?;
        if !node.is_object() {
            return Err(StoreError::NotMergeable {
                location: to_pointer(&path),
                kind: kind_of(node),
            });
        }

        merge_value(node, &Value::Object(partial.clone()));
        Ok(MutationOutcome::Applied)
    }

    /// Replace the first node the query resolves to with `full`.
    pub fn replace_at(&self, query: &str, full: Value) -> Result<MutationOutcome, StoreError> {
        let mut root = self.write();
        let Some(path) = find(&root, query)? else {
            return Ok(MutationOutcome::NotFound);
        };
        if path.is_empty() {
            return Err(StoreError::RootMutation);
        }

        let node = resolve_mut(&mut root, &path).ok_or_else(|| StoreError::Detached(to_pointer(&path)))?;
        if !(node.is_object() || node.is_array()) {
            return Err(StoreError::NotAContainer(to_pointer(&path)));
        }

        *node = full;
        Ok(MutationOutcome::Applied)
    }

    /// Detach the first node the query resolves to from its parent.
    pub fn remove_at(&self, query: &str) -> Result<MutationOutcome, StoreError> {
        let mut root = self.write();
        let Some(mut path) = find(&root, query)? else {
            return Ok(MutationOutcome::NotFound);
        };

        let Some(last) = path.pop() else {
            return Err(StoreError::RootMutation);
        };
        let parent = resolve_mut(&mut root, &path).ok_or_else(|| StoreError::Detached(to_pointer(&path)))?;

        let removed = match (parent, &last) {
            (Value::Array(items), Segment::Index(i)) if *i < items.len() => {
                items.remove(*i);
                true
            }
            (Value::Object(map), Segment::Key(key)) => map.remove(key).is_some(),
            _ => false,
        };

        if removed {
            Ok(MutationOutcome::Applied)
        } else {
            path.push(last);
            Err(StoreError::Detached(to_pointer(&path)))
        }
    }

    // Mutations are applied only after selection succeeds, so a guard
    // poisoned by a panicking caller still holds a consistent tree.
    fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.root.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Value> {
        self.root.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::empty()
    }
}

/// Location of the first node the query selects.
fn find(root: &Value, query: &str) -> Result<Option<Vec<Segment>>, StoreError> {
    let selected = select(root, query)?;
    match selected.first() {
        Some(node) => locate(root, node)
            .map(Some)
            .ok_or_else(|| StoreError::Detached(query.to_string())),
        None => Ok(None),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
