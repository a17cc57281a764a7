//! Scoped state subscriptions.
//!
//! [`Store::subscribe`](crate::Store::subscribe) returns a [`Subscription`].
//! The observer stays registered exactly as long as the handle lives: dropping
//! it, or calling [`Subscription::unsubscribe`], removes the observer before
//! returning, so no notification is delivered afterwards.

use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Callback invoked with every published state
pub(crate) type Observer<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Ordered observer table shared between a store and its subscriptions
pub(crate) struct Observers<S> {
    next_id: u64,
    entries: Vec<(u64, Observer<S>)>,
}

impl<S> Default for Observers<S> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<S> Observers<S> {
    pub(crate) fn insert(&mut self, observer: Observer<S>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry, _)| *entry != id);
    }

    /// Observers in registration order
    pub(crate) fn snapshot(&self) -> Vec<Observer<S>> {
        self.entries
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Handle for a registered state observer
///
/// # Example
///
/// ```ignore
/// let subscription = store.subscribe(|state| println!("{} items", state.items.len()));
/// store.send(TodoAction::LoadRequested)?;
/// drop(subscription); // observer removed here
/// ```
#[must_use = "dropping a Subscription immediately unsubscribes the observer"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new<S: 'static>(observers: &Arc<Mutex<Observers<S>>>, id: u64) -> Self {
        let observers: Weak<Mutex<Observers<S>>> = Arc::downgrade(observers);
        Self {
            release: Some(Box::new(move || {
                if let Some(observers) = observers.upgrade() {
                    observers
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .remove(id);
                    tracing::trace!(observer = id, "Observer removed");
                }
            })),
        }
    }

    /// Remove the observer now
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
