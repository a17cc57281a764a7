//! Memoized projections of [`TodoState`].
//!
//! Each selector reads one slice of state and only recomputes when that slice
//! changes. The list-derived selectors read `items`, which keeps its `Arc`
//! across transitions that touch only `loading` or `error`, so a load start or
//! failure never re-filters the list.

use crate::types::{Record, TodoState};
use composable_state_runtime::Selector;
use std::sync::Arc;

/// Shared, immutable list of records
pub type Records = Arc<Vec<Record>>;

type ItemsSelector<T> = Selector<TodoState, Records, T>;

fn items(state: &TodoState) -> Records {
    Arc::clone(&state.items)
}

fn filtered(items: &Records, completed: bool) -> Records {
    Arc::new(
        items
            .iter()
            .filter(|record| record.completed == completed)
            .cloned()
            .collect(),
    )
}

/// Every value the facade derives, read at one instant
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoSnapshot {
    /// All records
    pub items: Records,
    /// Completed records, in list order
    pub completed_items: Records,
    /// Not yet completed records, in list order
    pub active_items: Records,
    /// Whether a load is in flight
    pub loading: bool,
    /// Last load failure
    pub error: Option<String>,
    /// Number of records
    pub count: usize,
    /// Number of completed records
    pub completed_count: usize,
    /// Number of active records
    pub active_count: usize,
}

/// The set of todo selectors
///
/// Caches are per instance; each facade owns its own set.
#[derive(Debug)]
pub struct TodoSelectors {
    all_items: ItemsSelector<Records>,
    completed_items: ItemsSelector<Records>,
    active_items: ItemsSelector<Records>,
    count: ItemsSelector<usize>,
    completed_count: ItemsSelector<usize>,
    active_count: ItemsSelector<usize>,
    loading: Selector<TodoState, bool, bool>,
    error: Selector<TodoState, Option<String>, Option<String>>,
}

impl TodoSelectors {
    /// Creates a fresh set of selectors with empty caches
    #[must_use]
    pub fn new() -> Self {
        Self {
            all_items: Selector::new(items, Arc::clone),
            completed_items: Selector::new(items, |items: &Records| filtered(items, true)),
            active_items: Selector::new(items, |items: &Records| filtered(items, false)),
            count: Selector::new(items, |items: &Records| items.len()),
            completed_count: Selector::new(items, |items: &Records| {
                items.iter().filter(|record| record.completed).count()
            }),
            active_count: Selector::new(items, |items: &Records| {
                items.iter().filter(|record| !record.completed).count()
            }),
            loading: Selector::new(|state: &TodoState| state.loading, |loading: &bool| *loading),
            error: Selector::new(|state: &TodoState| state.error.clone(), Clone::clone),
        }
    }

    /// All records
    pub fn all_items(&self, state: &TodoState) -> Records {
        self.all_items.select(state)
    }

    /// Completed records, order preserved
    pub fn completed_items(&self, state: &TodoState) -> Records {
        self.completed_items.select(state)
    }

    /// Active records, order preserved
    pub fn active_items(&self, state: &TodoState) -> Records {
        self.active_items.select(state)
    }

    /// Whether a load is in flight
    pub fn loading(&self, state: &TodoState) -> bool {
        self.loading.select(state)
    }

    /// Last load failure
    pub fn error(&self, state: &TodoState) -> Option<String> {
        self.error.select(state)
    }

    /// Number of records
    pub fn count(&self, state: &TodoState) -> usize {
        self.count.select(state)
    }

    /// Number of completed records
    pub fn completed_count(&self, state: &TodoState) -> usize {
        self.completed_count.select(state)
    }

    /// Number of active records
    pub fn active_count(&self, state: &TodoState) -> usize {
        self.active_count.select(state)
    }

    /// All selector values for `state`
    pub fn snapshot(&self, state: &TodoState) -> TodoSnapshot {
        TodoSnapshot {
            items: self.all_items(state),
            completed_items: self.completed_items(state),
            active_items: self.active_items(state),
            loading: self.loading(state),
            error: self.error(state),
            count: self.count(state),
            completed_count: self.completed_count(state),
            active_count: self.active_count(state),
        }
    }

    /// Times the completed/active filters have actually run
    #[must_use]
    pub fn filter_computations(&self) -> usize {
        self.completed_items.computations() + self.active_items.computations()
    }
}

impl Default for TodoSelectors {
    fn default() -> Self {
        Self::new()
    }
}
