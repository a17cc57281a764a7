//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of records that can be loaded from a
//! data source, added to, toggled and deleted. Every change to the list goes
//! through a [`TodoAction`]; the state itself is a plain immutable value.

use composable_state_macros::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Unique identifier for a record
///
/// Opaque to the state layer; ids are compared, never parsed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a `RecordId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single todo record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier, fixed at creation
    pub id: RecordId,
    /// Title of the todo, fixed at creation
    pub title: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl Record {
    /// Creates a new, not yet completed record
    #[must_use]
    pub fn new(id: impl Into<RecordId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
        }
    }

    /// Returns the record with `completed` set
    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Returns a copy of the record with `completed` flipped
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// State of the todo list
///
/// `items` sits behind an `Arc` so that transitions which leave the list alone
/// hand the very same allocation to the next state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Records in display order, ids unique
    pub items: Arc<Vec<Record>>,
    /// True while a load is in flight
    pub loading: bool,
    /// Reason the last load failed, cleared when the next load starts
    pub error: Option<String>,
}

impl TodoState {
    /// Creates an empty todo state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding `items`
    #[must_use]
    pub fn with_items(items: Vec<Record>) -> Self {
        Self {
            items: Arc::new(items),
            ..Self::default()
        }
    }

    /// Returns the number of records
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Returns a record by id
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.items.iter().find(|record| &record.id == id)
    }

    /// Checks if a record exists
    #[must_use]
    pub fn exists(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }
}

/// Actions of the todo list
///
/// Requests express what the user wants; outcomes report how the data source
/// call started by a request settled. Actions carry data only.
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TodoAction {
    // ========== Requests ==========
    /// Request: (re)load the list from the data source
    #[request]
    LoadRequested,

    /// Request: add a record with this title
    #[request]
    AddRequested {
        /// Title of the new record
        title: String,
    },

    /// Request: flip the completion flag of a record
    #[request]
    ToggleRequested {
        /// Record to toggle
        id: RecordId,
    },

    /// Request: remove a record
    #[request]
    DeleteRequested {
        /// Record to delete
        id: RecordId,
    },

    // ========== Outcomes ==========
    /// Outcome: the data source returned the full list
    #[outcome]
    LoadSucceeded {
        /// Records as returned by the source
        items: Vec<Record>,
    },

    /// Outcome: a data source call failed
    #[outcome]
    LoadFailed {
        /// Human-readable reason
        reason: String,
    },
}
