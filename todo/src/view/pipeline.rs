//! A running derived view.
//!
//! [`ViewPipeline`] drives a [`ViewReducer`] in its own store, independent of
//! any todo store, and derives its output through memoized stages: the filter
//! reruns only when the source or the committed query changes, the sort only
//! when the filtered set or the sort controls change, and pagination only when
//! the sorted set or the page controls change.

use super::derive::{self, SortDirection};
use super::reducer::{ViewAction, ViewEnvironment, ViewReducer, ViewState};
use super::record::ViewRecord;
use composable_state_runtime::{Selector, Store, StoreConfig, StoreError, Subscription};
use futures::Stream;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`ViewPipeline`] controls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// Navigation outside `[1, total_pages]`
    #[error("Page {page} is outside 1..={total_pages}")]
    PageOutOfRange {
        /// Requested page
        page: usize,
        /// Pages available
        total_pages: usize,
    },

    /// A page size of zero
    #[error("Page size must be > 0")]
    ZeroPageSize,

    /// The view's store refused the input
    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for ViewError {
    fn from(error: StoreError) -> Self {
        Self::Store(error.to_string())
    }
}

/// What a view currently shows
#[derive(Clone, Debug, PartialEq)]
pub struct ViewOutput<R> {
    /// Records on the current page
    pub page: Arc<Vec<R>>,
    /// Current page, 1-based
    pub current_page: usize,
    /// Number of pages, at least one
    pub total_pages: usize,
    /// Number of records matching the committed query
    pub total_matches: usize,
}

type ViewStore<R> = Store<ViewState<R>, ViewAction<R>, ViewEnvironment, ViewReducer<R>>;
type SortInput<R> = (Arc<Vec<R>>, Option<<R as ViewRecord>::Key>, SortDirection);
type PageInput<R> = (Arc<Vec<R>>, usize, usize);

/// Memoized derivation stages of one view
struct ViewStages<R: ViewRecord> {
    filtered: Selector<ViewState<R>, (Arc<Vec<R>>, String), Arc<Vec<R>>>,
    sorted: Selector<SortInput<R>, SortInput<R>, Arc<Vec<R>>>,
    paged: Selector<PageInput<R>, PageInput<R>, Arc<Vec<R>>>,
}

impl<R: ViewRecord> ViewStages<R> {
    fn new() -> Self {
        Self {
            filtered: Selector::new(
                |state: &ViewState<R>| (Arc::clone(&state.source), state.query.clone()),
                |(source, query): &(Arc<Vec<R>>, String)| {
                    Arc::new(derive::filter(source, query))
                },
            ),
            sorted: Selector::new(Clone::clone, |(records, key, direction): &SortInput<R>| {
                Arc::new(derive::sort(records, *key, *direction))
            }),
            paged: Selector::new(Clone::clone, |(records, page, size): &PageInput<R>| {
                Arc::new(derive::paginate(records, *page, *size))
            }),
        }
    }

    fn derive(&self, state: &ViewState<R>) -> ViewOutput<R> {
        let filtered = self.filtered.select(state);
        let total_matches = filtered.len();
        let sorted = self
            .sorted
            .select(&(filtered, state.sort_key, state.sort_direction));
        let page = self.paged.select(&(sorted, state.page, state.page_size));

        ViewOutput {
            page,
            current_page: state.page,
            total_pages: derive::total_pages(total_matches, state.page_size),
            total_matches,
        }
    }
}

/// A debounced, filtered, sorted, paginated view over records of type `R`
///
/// # Example
///
/// ```ignore
/// let view = ViewPipeline::new(records, 10, Duration::from_millis(300));
///
/// view.set_query("learn")?;
/// view.toggle_sort(RecordField::Title)?;
/// let output = view.output();
/// ```
pub struct ViewPipeline<R: ViewRecord> {
    store: ViewStore<R>,
    stages: Arc<ViewStages<R>>,
}

impl<R: ViewRecord> ViewPipeline<R> {
    /// Creates a view over `records`
    ///
    /// A `page_size` of zero is raised to one.
    #[must_use]
    pub fn new(records: Vec<R>, page_size: usize, debounce: Duration) -> Self {
        Self::with_config(records, page_size, debounce, StoreConfig::default())
    }

    /// Creates a view with an explicit store configuration
    #[must_use]
    pub fn with_config(
        records: Vec<R>,
        page_size: usize,
        debounce: Duration,
        config: StoreConfig,
    ) -> Self {
        Self {
            store: Store::with_config(
                ViewState::new(records, page_size),
                ViewReducer::new(),
                ViewEnvironment { debounce },
                config,
            ),
            stages: Arc::new(ViewStages::new()),
        }
    }

    /// Replace the source collection, clamping the current page
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Store`] if the view is shutting down.
    pub fn set_source(&self, records: impl Into<Arc<Vec<R>>>) -> Result<(), ViewError> {
        self.dispatch(ViewAction::SourceReplaced {
            records: records.into(),
        })
    }

    /// Feed typed query text
    ///
    /// The text is committed once no further input arrives within the
    /// debounce window, and only if it differs from the committed query after
    /// trimming and case-folding.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Store`] if the view is shutting down.
    pub fn set_query(&self, text: impl Into<String>) -> Result<(), ViewError> {
        self.dispatch(ViewAction::QueryChanged { text: text.into() })
    }

    /// Sort by `key` ascending, or flip the direction if already sorting by it
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Store`] if the view is shutting down.
    pub fn toggle_sort(&self, key: R::Key) -> Result<(), ViewError> {
        self.dispatch(ViewAction::SortToggled { key })
    }

    /// Sort by `key` in `direction`
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Store`] if the view is shutting down.
    pub fn set_sort(&self, key: R::Key, direction: SortDirection) -> Result<(), ViewError> {
        self.dispatch(ViewAction::SortSet { key, direction })
    }

    /// Stop sorting
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Store`] if the view is shutting down.
    pub fn clear_sort(&self) -> Result<(), ViewError> {
        self.dispatch(ViewAction::SortCleared)
    }

    /// Navigate to `page`
    ///
    /// # Errors
    ///
    /// - [`ViewError::PageOutOfRange`]: `page` is 0 or past the last page
    /// - [`ViewError::Store`]: the view is shutting down
    pub fn go_to_page(&self, page: usize) -> Result<(), ViewError> {
        let state = self.store.current_state();
        if !state.is_valid_page(page) {
            return Err(ViewError::PageOutOfRange {
                page,
                total_pages: state.total_pages(),
            });
        }
        self.dispatch(ViewAction::PageRequested { page })
    }

    /// Navigate to the next page
    ///
    /// # Errors
    ///
    /// See [`ViewPipeline::go_to_page`].
    pub fn next_page(&self) -> Result<(), ViewError> {
        let page = self.store.state(|s| s.page);
        self.go_to_page(page.saturating_add(1))
    }

    /// Navigate to the previous page
    ///
    /// # Errors
    ///
    /// See [`ViewPipeline::go_to_page`].
    pub fn previous_page(&self) -> Result<(), ViewError> {
        let page = self.store.state(|s| s.page);
        self.go_to_page(page.saturating_sub(1))
    }

    /// Change the number of records per page, clamping the current page
    ///
    /// # Errors
    ///
    /// - [`ViewError::ZeroPageSize`]: `size` is zero
    /// - [`ViewError::Store`]: the view is shutting down
    pub fn set_page_size(&self, size: usize) -> Result<(), ViewError> {
        if size == 0 {
            return Err(ViewError::ZeroPageSize);
        }
        self.dispatch(ViewAction::PageSizeChanged { size })
    }

    fn dispatch(&self, action: ViewAction<R>) -> Result<(), ViewError> {
        self.store.send(action)?;
        Ok(())
    }

    /// The current controls
    #[must_use]
    pub fn state(&self) -> Arc<ViewState<R>> {
        self.store.current_state()
    }

    /// What the view currently shows
    #[must_use]
    pub fn output(&self) -> ViewOutput<R> {
        self.stages.derive(&self.store.current_state())
    }

    /// Stream of outputs: the current one, then each distinct change
    pub fn outputs(&self) -> impl Stream<Item = ViewOutput<R>> + Send + use<R> {
        let mut states = self.store.watch();
        let stages = Arc::clone(&self.stages);

        async_stream::stream! {
            let mut last: Option<ViewOutput<R>> = None;
            loop {
                let output = {
                    let state = states.borrow_and_update();
                    stages.derive(&state)
                };

                if last.as_ref() != Some(&output) {
                    last = Some(output.clone());
                    yield output;
                }

                if states.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    /// Call `observer` with the output now and after every change of controls
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&ViewOutput<R>) + Send + Sync + 'static,
    {
        let stages = Arc::clone(&self.stages);
        self.store
            .subscribe(move |state: &ViewState<R>| observer(&stages.derive(state)))
    }

    /// Times the filter stage has actually run
    #[must_use]
    pub fn filter_runs(&self) -> usize {
        self.stages.filtered.computations()
    }

    /// Times the sort stage has actually run
    #[must_use]
    pub fn sort_runs(&self) -> usize {
        self.stages.sorted.computations()
    }

    /// Stop accepting input and wait for a pending debounce timer
    ///
    /// A query still inside its quiet window is committed before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Store`] if the timer outlives the shutdown timeout.
    pub async fn shutdown(&self) -> Result<(), ViewError> {
        Ok(self.store.shutdown_gracefully().await?)
    }
}
