//! State, actions and reducer of a derived view.
//!
//! The view holds only its controls and a shared handle to the source
//! collection. Query input is debounced: every keystroke restarts a timer in
//! the [`QUERY_LANE`], and only the last timer of a burst commits its text.

use super::derive::{self, SortDirection};
use super::record::ViewRecord;
use composable_state_core::effect::{Effect, EffectId};
use composable_state_core::reducer::Reducer;
use composable_state_core::{SmallVec, cancellable, delay, smallvec};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Lane of the query debounce timer
pub const QUERY_LANE: EffectId = EffectId::new("view.query");

/// Controls of a derived view
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState<R: ViewRecord> {
    /// Collection the view is derived from
    pub source: Arc<Vec<R>>,
    /// Query text as last typed, not yet debounced
    pub query_input: String,
    /// Committed query, trimmed and case-folded
    pub query: String,
    /// Current page, 1-based
    pub page: usize,
    /// Records per page, never zero
    pub page_size: usize,
    /// Field to sort by, if any
    pub sort_key: Option<R::Key>,
    /// Sort direction
    pub sort_direction: SortDirection,
}

impl<R: ViewRecord> ViewState<R> {
    /// Creates a view over `source` showing the first page
    ///
    /// A `page_size` of zero is raised to one.
    #[must_use]
    pub fn new(source: Vec<R>, page_size: usize) -> Self {
        Self {
            source: Arc::new(source),
            query_input: String::new(),
            query: String::new(),
            page: 1,
            page_size: page_size.max(1),
            sort_key: None,
            sort_direction: SortDirection::Ascending,
        }
    }

    /// Number of source records matching the committed query
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.source
            .iter()
            .filter(|record| derive::matches(*record, &self.query))
            .count()
    }

    /// Number of pages for the committed query
    #[must_use]
    pub fn total_pages(&self) -> usize {
        derive::total_pages(self.match_count(), self.page_size)
    }

    /// Whether `page` lies within `[1, total_pages]`
    #[must_use]
    pub fn is_valid_page(&self, page: usize) -> bool {
        (1..=self.total_pages()).contains(&page)
    }

    fn clamp_page(&mut self) {
        self.page = self.page.clamp(1, self.total_pages());
    }
}

/// Inputs of a derived view
#[derive(Clone, Debug, PartialEq)]
pub enum ViewAction<R: ViewRecord> {
    /// Replace the source collection
    SourceReplaced {
        /// New collection
        records: Arc<Vec<R>>,
    },
    /// Query text typed; starts or restarts the debounce timer
    QueryChanged {
        /// Raw text
        text: String,
    },
    /// Debounce window elapsed without further input
    QueryCommitted {
        /// Raw text typed last
        text: String,
    },
    /// Sort by `key`, or flip the direction if already sorting by it
    SortToggled {
        /// Field to sort by
        key: R::Key,
    },
    /// Sort by `key` in `direction`
    SortSet {
        /// Field to sort by
        key: R::Key,
        /// Direction
        direction: SortDirection,
    },
    /// Stop sorting
    SortCleared,
    /// Navigate to `page`
    PageRequested {
        /// 1-based page
        page: usize,
    },
    /// Change the number of records per page
    PageSizeChanged {
        /// New page size
        size: usize,
    },
}

/// Environment of the view reducer
#[derive(Clone, Copy, Debug)]
pub struct ViewEnvironment {
    /// Quiet period before typed text is committed
    pub debounce: Duration,
}

impl Default for ViewEnvironment {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
        }
    }
}

/// Reducer of a derived view over records of type `R`
pub struct ViewReducer<R>(PhantomData<fn() -> R>);

impl<R> ViewReducer<R> {
    /// Creates a new `ViewReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<R> Default for ViewReducer<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for ViewReducer<R> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for ViewReducer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ViewReducer")
    }
}

impl<R: ViewRecord> Reducer for ViewReducer<R> {
    type State = ViewState<R>;
    type Action = ViewAction<R>;
    type Environment = ViewEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ViewAction::SourceReplaced { records } => {
                state.source = records;
                state.clamp_page();
            },

            ViewAction::QueryChanged { text } => {
                state.query_input.clone_from(&text);
                return smallvec![cancellable! {
                    id: QUERY_LANE,
                    effect: delay! {
                        duration: env.debounce,
                        action: ViewAction::QueryCommitted { text }
                    }
                }];
            },

            ViewAction::QueryCommitted { text } => {
                let query = derive::normalize_query(&text);
                if query == state.query {
                    tracing::trace!(%query, "Committed query unchanged");
                } else {
                    tracing::debug!(%query, "Query committed");
                    state.query = query;
                    state.page = 1;
                }
            },

            ViewAction::SortToggled { key } => {
                if state.sort_key == Some(key) {
                    state.sort_direction = state.sort_direction.flipped();
                } else {
                    state.sort_key = Some(key);
                    state.sort_direction = SortDirection::Ascending;
                }
            },

            ViewAction::SortSet { key, direction } => {
                state.sort_key = Some(key);
                state.sort_direction = direction;
            },

            ViewAction::SortCleared => {
                state.sort_key = None;
                state.sort_direction = SortDirection::Ascending;
            },

            ViewAction::PageRequested { page } => {
                if state.is_valid_page(page) {
                    state.page = page;
                } else {
                    tracing::debug!(
                        page,
                        total_pages = state.total_pages(),
                        "Rejected navigation outside page range"
                    );
                }
            },

            ViewAction::PageSizeChanged { size } => {
                if size == 0 {
                    tracing::debug!("Rejected page size of zero");
                } else {
                    state.page_size = size;
                    state.clamp_page();
                }
            },
        }

        SmallVec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use crate::view::record::RecordField;
    use composable_state_testing::{ReducerTest, assertions};

    fn records() -> Vec<Record> {
        vec![
            Record::new("1", "Learn X").with_completed(true),
            Record::new("2", "Learn Y"),
            Record::new("3", "Build Z"),
        ]
    }

    type ViewTest = ReducerTest<
        ViewReducer<Record>,
        ViewState<Record>,
        ViewAction<Record>,
        ViewEnvironment,
    >;

    fn test(page_size: usize) -> ViewTest {
        ReducerTest::new(ViewReducer::new())
            .with_env(ViewEnvironment::default())
            .given_state(ViewState::new(records(), page_size))
    }

    #[test]
    fn test_query_change_schedules_debounce() {
        test(10)
            .when_action(ViewAction::QueryChanged { text: "Lea".into() })
            .then_state(|state| {
                assert_eq!(state.query_input, "Lea");
                assert_eq!(state.query, "");
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_lane_effect(effects, QUERY_LANE.as_str());
            })
            .run();
    }

    #[test]
    fn test_commit_normalizes_and_resets_page() {
        test(1)
            .when_actions([
                ViewAction::PageRequested { page: 3 },
                ViewAction::QueryCommitted { text: "  LEARN ".into() },
            ])
            .then_state(|state| {
                assert_eq!(state.query, "learn");
                assert_eq!(state.page, 1);
                assert_eq!(state.total_pages(), 2);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_equivalent_commit_keeps_page() {
        test(1)
            .when_actions([
                ViewAction::QueryCommitted { text: "learn".into() },
                ViewAction::PageRequested { page: 2 },
                ViewAction::QueryCommitted { text: " Learn".into() },
            ])
            .then_state(|state| {
                assert_eq!(state.page, 2);
            })
            .run();
    }

    #[test]
    fn test_out_of_range_pages_rejected() {
        test(2)
            .when_actions([
                ViewAction::PageRequested { page: 2 },
                ViewAction::PageRequested { page: 0 },
                ViewAction::PageRequested { page: 3 },
            ])
            .then_state(|state| {
                assert_eq!(state.page, 2);
            })
            .run();
    }

    #[test]
    fn test_sort_toggle_and_clear() {
        test(10)
            .when_actions([
                ViewAction::SortToggled { key: RecordField::Title },
                ViewAction::SortToggled { key: RecordField::Title },
            ])
            .then_state(|state| {
                assert_eq!(state.sort_key, Some(RecordField::Title));
                assert_eq!(state.sort_direction, SortDirection::Descending);
            })
            .run();

        test(10)
            .when_actions([
                ViewAction::SortSet {
                    key: RecordField::Title,
                    direction: SortDirection::Descending,
                },
                ViewAction::SortToggled { key: RecordField::Completed },
            ])
            .then_state(|state| {
                assert_eq!(state.sort_key, Some(RecordField::Completed));
                assert_eq!(state.sort_direction, SortDirection::Ascending);
            })
            .run();

        test(10)
            .when_actions([
                ViewAction::SortToggled { key: RecordField::Title },
                ViewAction::SortCleared,
            ])
            .then_state(|state| {
                assert_eq!(state.sort_key, None);
            })
            .run();
    }

    #[test]
    fn test_sort_change_keeps_page() {
        test(1)
            .when_actions([
                ViewAction::PageRequested { page: 3 },
                ViewAction::SortToggled { key: RecordField::Title },
            ])
            .then_state(|state| {
                assert_eq!(state.page, 3);
            })
            .run();
    }

    #[test]
    fn test_page_size_zero_rejected_and_growth_clamps() {
        test(1)
            .when_actions([
                ViewAction::PageRequested { page: 3 },
                ViewAction::PageSizeChanged { size: 0 },
            ])
            .then_state(|state| {
                assert_eq!(state.page_size, 1);
                assert_eq!(state.page, 3);
            })
            .run();

        test(1)
            .when_actions([
                ViewAction::PageRequested { page: 3 },
                ViewAction::PageSizeChanged { size: 2 },
            ])
            .then_state(|state| {
                assert_eq!(state.page_size, 2);
                assert_eq!(state.page, 2);
            })
            .run();
    }

    #[test]
    fn test_shrinking_source_clamps_page() {
        test(1)
            .when_actions([
                ViewAction::PageRequested { page: 3 },
                ViewAction::SourceReplaced {
                    records: Arc::new(vec![Record::new("9", "Only")]),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.page, 1);
                assert_eq!(state.total_pages(), 1);
            })
            .run();
    }
}
