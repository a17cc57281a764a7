//! Derived views: debounced, filtered, sorted, paginated projections of a
//! record collection.
//!
//! A view runs independently of the todo store. It owns only its controls
//! (query, sort, page) and reads the collection its caller hands it.

pub mod derive;
pub mod pipeline;
pub mod record;
pub mod reducer;

pub use derive::SortDirection;
pub use pipeline::{ViewError, ViewOutput, ViewPipeline};
pub use record::{FieldValue, RecordField, ViewRecord};
pub use reducer::{QUERY_LANE, ViewAction, ViewEnvironment, ViewReducer, ViewState};
