//! Effect orchestration for the todo list.
//!
//! Each request that needs I/O maps to exactly one [`TodoSource`] call and
//! exactly one follow-up action once that call settles. Every call runs in the
//! lane of its request kind, so a newer request of the same kind supersedes the
//! one in flight and the superseded call's follow-up is dropped by the store.
//!
//! Failures never escape: they are logged and turned into
//! [`TodoAction::LoadFailed`].

use crate::error::TodoError;
use crate::source::{SourceError, TodoSource};
use crate::types::{RecordId, TodoAction};
use composable_state_core::effect::{Effect, EffectId};
use composable_state_core::{async_effect, cancellable};
use std::sync::Arc;

/// Lane of `fetch_all` calls
pub const LOAD: EffectId = EffectId::new("todo.load");
/// Lane of `create` calls
pub const ADD: EffectId = EffectId::new("todo.add");
/// Lane of `toggle` calls
pub const TOGGLE: EffectId = EffectId::new("todo.toggle");
/// Lane of `delete` calls
pub const DELETE: EffectId = EffectId::new("todo.delete");

/// Fetch the whole list
///
/// Settles as `LoadSucceeded` or `LoadFailed`.
#[must_use]
pub fn load(source: &Arc<dyn TodoSource>) -> Effect<TodoAction> {
    let source = Arc::clone(source);
    cancellable! {
        id: LOAD,
        effect: async_effect! {
            Some(match source.fetch_all().await {
                Ok(items) => TodoAction::LoadSucceeded { items },
                Err(error) => failed(&LOAD, error),
            })
        }
    }
}

/// Create a record, then resync
#[must_use]
pub fn create(source: &Arc<dyn TodoSource>, title: String) -> Effect<TodoAction> {
    let source = Arc::clone(source);
    cancellable! {
        id: ADD,
        effect: async_effect! {
            Some(match source.create(title).await {
                Ok(record) => {
                    tracing::debug!(id = %record.id, "Record created");
                    TodoAction::LoadRequested
                },
                Err(error) => failed(&ADD, error),
            })
        }
    }
}

/// Toggle a record, then resync
///
/// A missing record is not a failure; the list is resynced all the same.
#[must_use]
pub fn toggle(source: &Arc<dyn TodoSource>, id: RecordId) -> Effect<TodoAction> {
    let source = Arc::clone(source);
    cancellable! {
        id: TOGGLE,
        effect: async_effect! {
            Some(match source.toggle(id.clone()).await {
                Ok(Some(_)) => TodoAction::LoadRequested,
                Ok(None) => {
                    not_found(&TOGGLE, id);
                    TodoAction::LoadRequested
                },
                Err(error) => failed(&TOGGLE, error),
            })
        }
    }
}

/// Delete a record, then resync
///
/// A missing record is not a failure; the list is resynced all the same.
#[must_use]
pub fn delete(source: &Arc<dyn TodoSource>, id: RecordId) -> Effect<TodoAction> {
    let source = Arc::clone(source);
    cancellable! {
        id: DELETE,
        effect: async_effect! {
            Some(match source.delete(id.clone()).await {
                Ok(true) => TodoAction::LoadRequested,
                Ok(false) => {
                    not_found(&DELETE, id);
                    TodoAction::LoadRequested
                },
                Err(error) => failed(&DELETE, error),
            })
        }
    }
}

fn failed(lane: &EffectId, error: SourceError) -> TodoAction {
    let error = TodoError::from(error);
    tracing::warn!(%lane, %error, "Todo source call failed");
    metrics::counter!("todo.source.failures", "lane" => lane.to_string()).increment(1);
    TodoAction::LoadFailed {
        reason: error.to_string(),
    }
}

fn not_found(lane: &EffectId, id: RecordId) {
    let error = TodoError::NotFound(id);
    tracing::debug!(%lane, %error, "Target missing at source, resyncing");
}
