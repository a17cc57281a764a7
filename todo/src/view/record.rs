//! How records take part in a derived view.

use crate::types::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Debug;

/// Value of a sortable field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Boolean, `false` sorts before `true`
    Bool(bool),
    /// Number, compared numerically
    Number(f64),
    /// Text, compared lexicographically
    Text(String),
}

impl FieldValue {
    /// Natural ordering of two field values
    ///
    /// Values of different kinds order by kind: booleans, then numbers, then text.
    #[must_use]
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

/// A record that can be filtered and sorted by a derived view
pub trait ViewRecord: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Names of the sortable fields
    type Key: Copy + Eq + Debug + Send + Sync + 'static;

    /// Text fields the query is matched against
    fn search_fields(&self) -> Vec<&str>;

    /// Value of the sortable field `key`
    fn field(&self, key: Self::Key) -> FieldValue;
}

/// Sortable fields of a todo [`Record`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordField {
    /// The record id
    Id,
    /// The title
    Title,
    /// The completion flag
    Completed,
}

impl ViewRecord for Record {
    type Key = RecordField;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str()]
    }

    fn field(&self, key: RecordField) -> FieldValue {
        match key {
            RecordField::Id => FieldValue::Text(self.id.to_string()),
            RecordField::Title => FieldValue::Text(self.title.clone()),
            RecordField::Completed => FieldValue::Bool(self.completed),
        }
    }
}
