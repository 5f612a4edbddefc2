//! Mapping from file-level node ids to store handles.
//!
//! Node rows register their id when they are staged. Once the batch holding
//! the node commits, the store handle is bound to the id. Relationship rows
//! then resolve their endpoints against the bound ids.

use crate::error::ImportError;
use crate::header::IdSpace;
use import_core::{NodeHandle, PropertyValue};
use std::collections::HashMap;

/// A node id qualified by its id space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdKey {
    pub space: IdSpace,
    pub id: String,
}

impl IdKey {
    pub fn new(space: IdSpace, id: impl Into<String>) -> Self {
        Self {
            space,
            id: id.into(),
        }
    }

    /// Key for a coerced id value. Numeric ids are keyed by their value so
    /// that `01` and `1` name the same node.
    pub fn from_value(space: IdSpace, value: &PropertyValue, raw: &str) -> Self {
        let id = match value {
            PropertyValue::String(s) => s.clone(),
            other => other.as_i64().map(|n| n.to_string()).unwrap_or_else(|| raw.to_string()),
        };
        Self { space, id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Registered, waiting for its batch to commit
    Staged,
    Bound(NodeHandle),
}

/// Outcome of [`IdentifierRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First time this id was seen; the caller creates the node.
    New,
    /// The id was registered before. `existing` is set once the first
    /// node's batch has committed.
    Duplicate { existing: Option<NodeHandle> },
}

#[derive(Debug, Default)]
pub struct IdentifierRegistry {
    entries: HashMap<IdKey, Slot>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` for a node about to be staged.
    pub fn register(&mut self, key: &IdKey) -> Registration {
        match self.entries.get(key).copied() {
            Some(Slot::Staged) => Registration::Duplicate { existing: None },
            Some(Slot::Bound(handle)) => Registration::Duplicate {
                existing: Some(handle),
            },
            None => {
                self.entries.insert(key.clone(), Slot::Staged);
                Registration::New
            }
        }
    }

    /// Record the store handle of a committed node.
    pub fn bind(&mut self, key: IdKey, handle: NodeHandle) -> Result<(), ImportError> {
        match self.entries.get(&key).copied() {
            Some(Slot::Bound(existing)) if existing != handle => {
                Err(ImportError::IdentifierCollision {
                    space: key.space,
                    id: key.id,
                    existing,
                    attempted: handle,
                })
            }
            _ => {
                self.entries.insert(key, Slot::Bound(handle));
                Ok(())
            }
        }
    }

    /// Handle of the committed node with this id.
    pub fn resolve(&self, key: &IdKey) -> Option<NodeHandle> {
        match self.entries.get(key) {
            Some(Slot::Bound(handle)) => Some(*handle),
            _ => None,
        }
    }

    /// Number of registered ids, bound or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
