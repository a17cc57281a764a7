//! Reducer logic for the todo list.
//!
//! State transitions are synchronous and free of I/O. Requests that need the
//! data source change state optimistically and return a lane effect built by
//! [`crate::effects`]; outcomes only fold results into state.

use crate::effects;
use crate::source::TodoSource;
use crate::types::{Record, RecordId, TodoAction, TodoState};
use composable_state_core::{
    SmallVec, effect::Effect, environment::IdGenerator, reducer::Reducer, smallvec,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Random ids for optimistically added records
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Id generator for optimistically added records
    pub ids: Arc<dyn IdGenerator>,
    /// Data source the effects talk to
    pub source: Arc<dyn TodoSource>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>, source: Arc<dyn TodoSource>) -> Self {
        Self { ids, source }
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Drops every record whose id was already seen, keeping the first
    fn unique_by_id(items: Vec<Record>) -> Vec<Record> {
        let mut seen = HashSet::with_capacity(items.len());
        items
            .into_iter()
            .filter(|record| seen.insert(record.id.clone()))
            .collect()
    }

    fn position(state: &TodoState, id: &RecordId) -> Option<usize> {
        state.items.iter().position(|record| &record.id == id)
    }
}

impl Default for TodoReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Requests ==========
            TodoAction::LoadRequested => {
                state.loading = true;
                state.error = None;
                smallvec![effects::load(&env.source)]
            },

            TodoAction::AddRequested { title } => {
                let id = RecordId::new(env.ids.next_id());
                if state.exists(&id) {
                    tracing::warn!(%id, "Generated id already in use, skipping optimistic add");
                } else {
                    Arc::make_mut(&mut state.items).push(Record::new(id, title.clone()));
                }
                smallvec![effects::create(&env.source, title)]
            },

            TodoAction::ToggleRequested { id } => {
                if let Some(index) = Self::position(state, &id) {
                    let items = Arc::make_mut(&mut state.items);
                    items[index] = items[index].toggled();
                }
                smallvec![effects::toggle(&env.source, id)]
            },

            TodoAction::DeleteRequested { id } => {
                if let Some(index) = Self::position(state, &id) {
                    Arc::make_mut(&mut state.items).remove(index);
                }
                smallvec![effects::delete(&env.source, id)]
            },

            // ========== Outcomes ==========
            TodoAction::LoadSucceeded { items } => {
                let items = Self::unique_by_id(items);
                if *state.items != items {
                    state.items = Arc::new(items);
                }
                state.loading = false;
                SmallVec::new()
            },

            TodoAction::LoadFailed { reason } => {
                state.loading = false;
                state.error = Some(reason);
                SmallVec::new()
            },
        }
    }
}
