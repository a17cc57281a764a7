//! The todo facade: the only surface presentation code talks to.
//!
//! The facade owns the store privately. Reads go through memoized selectors,
//! exposed as streams that yield the current value and then each distinct
//! change. Writes are intention methods (`load`, `add`, `toggle`, `delete`);
//! the facade is the only place commands are constructed.

use crate::error::TodoError;
use crate::reducer::{TodoEnvironment, TodoReducer, UuidIds};
use crate::selectors::{Records, TodoSelectors, TodoSnapshot};
use crate::source::TodoSource;
use crate::types::{RecordId, TodoAction, TodoState};
use composable_state_runtime::{EffectHandle, Store, StoreConfig, Subscription};
use futures::Stream;
use std::sync::Arc;

type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Facade over the todo store
///
/// # Example
///
/// ```ignore
/// let facade = TodoFacade::new(Arc::new(InMemoryTodoSource::new()));
///
/// facade.add("Learn X")?;
/// let mut active = Box::pin(facade.active_items());
/// while let Some(items) = active.next().await {
///     println!("{} active", items.len());
/// }
/// ```
pub struct TodoFacade {
    store: TodoStore,
    selectors: Arc<TodoSelectors>,
}

impl TodoFacade {
    /// Creates a facade over `source` with random record ids and default settings
    #[must_use]
    pub fn new(source: Arc<dyn TodoSource>) -> Self {
        Self::with_environment(
            TodoEnvironment::new(Arc::new(UuidIds), source),
            StoreConfig::default(),
        )
    }

    /// Creates a facade with an explicit environment and store configuration
    #[must_use]
    pub fn with_environment(environment: TodoEnvironment, config: StoreConfig) -> Self {
        Self {
            store: Store::with_config(TodoState::new(), TodoReducer::new(), environment, config),
            selectors: Arc::new(TodoSelectors::new()),
        }
    }

    // ========== Intentions ==========

    /// Reload the list from the data source
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Store`] if the store is shutting down.
    pub fn load(&self) -> Result<EffectHandle, TodoError> {
        self.dispatch(TodoAction::LoadRequested)
    }

    /// Add a record titled `title`
    ///
    /// A blank title is rejected before anything is dispatched.
    ///
    /// # Errors
    ///
    /// - [`TodoError::ValidationRejected`]: `title` is empty or whitespace only
    /// - [`TodoError::Store`]: the store is shutting down
    pub fn add(&self, title: &str) -> Result<EffectHandle, TodoError> {
        if title.trim().is_empty() {
            tracing::debug!("Rejected add with blank title");
            return Err(TodoError::ValidationRejected);
        }
        self.dispatch(TodoAction::AddRequested {
            title: title.to_string(),
        })
    }

    /// Flip the completion flag of `id`
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Store`] if the store is shutting down.
    pub fn toggle(&self, id: &RecordId) -> Result<EffectHandle, TodoError> {
        self.dispatch(TodoAction::ToggleRequested { id: id.clone() })
    }

    /// Delete `id`
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Store`] if the store is shutting down.
    pub fn delete(&self, id: &RecordId) -> Result<EffectHandle, TodoError> {
        self.dispatch(TodoAction::DeleteRequested { id: id.clone() })
    }

    fn dispatch(&self, action: TodoAction) -> Result<EffectHandle, TodoError> {
        tracing::debug!(action = action.name(), "Dispatching todo intention");
        Ok(self.store.send(action)?)
    }

    // ========== Streams ==========

    /// All records
    pub fn items(&self) -> impl Stream<Item = Records> + Send + use<> {
        self.select(TodoSelectors::all_items)
    }

    /// Completed records, in list order
    pub fn completed_items(&self) -> impl Stream<Item = Records> + Send + use<> {
        self.select(TodoSelectors::completed_items)
    }

    /// Active records, in list order
    pub fn active_items(&self) -> impl Stream<Item = Records> + Send + use<> {
        self.select(TodoSelectors::active_items)
    }

    /// Whether a load is in flight
    pub fn loading(&self) -> impl Stream<Item = bool> + Send + use<> {
        self.select(TodoSelectors::loading)
    }

    /// Last load failure
    pub fn error(&self) -> impl Stream<Item = Option<String>> + Send + use<> {
        self.select(TodoSelectors::error)
    }

    /// Number of records
    pub fn count(&self) -> impl Stream<Item = usize> + Send + use<> {
        self.select(TodoSelectors::count)
    }

    /// Number of completed records
    pub fn completed_count(&self) -> impl Stream<Item = usize> + Send + use<> {
        self.select(TodoSelectors::completed_count)
    }

    /// Number of active records
    pub fn active_count(&self) -> impl Stream<Item = usize> + Send + use<> {
        self.select(TodoSelectors::active_count)
    }

    /// Every selector value, whenever any of them changes
    pub fn snapshots(&self) -> impl Stream<Item = TodoSnapshot> + Send + use<> {
        self.select(TodoSelectors::snapshot)
    }

    /// Stream of `select` applied to each published state, duplicates skipped
    ///
    /// Ends once the store is gone. Intermediate states may be coalesced when
    /// the consumer is slower than the store.
    fn select<T>(
        &self,
        select: fn(&TodoSelectors, &TodoState) -> T,
    ) -> impl Stream<Item = T> + Send + use<T>
    where
        T: Clone + PartialEq + Send + 'static,
    {
        let mut states = self.store.watch();
        let selectors = Arc::clone(&self.selectors);

        async_stream::stream! {
            let mut last: Option<T> = None;
            loop {
                let value = {
                    let state = states.borrow_and_update();
                    select(selectors.as_ref(), &**state)
                };

                if last.as_ref() != Some(&value) {
                    last = Some(value.clone());
                    yield value;
                }

                if states.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    // ========== Synchronous reads ==========

    /// Every selector value for the current state
    #[must_use]
    pub fn snapshot(&self) -> TodoSnapshot {
        self.selectors.snapshot(&self.store.current_state())
    }

    /// Call `observer` with a snapshot now and after every state change
    ///
    /// The observer stays registered until the returned handle is dropped.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&TodoSnapshot) + Send + Sync + 'static,
    {
        let selectors = Arc::clone(&self.selectors);
        self.store
            .subscribe(move |state: &TodoState| observer(&selectors.snapshot(state)))
    }

    // ========== Lifecycle ==========

    /// Wait until no effect is in flight, follow-ups included
    pub async fn settled(&self) {
        self.store.settled().await;
    }

    /// Stop accepting intentions and wait for in-flight effects
    ///
    /// Requests already running still settle into state, so a load in
    /// flight finishes as `LoadSucceeded` or `LoadFailed`.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Store`] if effects are still running when the
    /// configured shutdown timeout expires.
    pub async fn shutdown(&self) -> Result<(), TodoError> {
        Ok(self.store.shutdown_gracefully().await?)
    }
}
