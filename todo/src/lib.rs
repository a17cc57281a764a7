//! Reactive state layer for a todo list, plus derived views over records.
//!
//! This crate shows how to build a unidirectional state layer with
//! Composable State. It demonstrates:
//!
//! - A pure reducer with optimistic updates (`add`, `toggle`, `delete`)
//! - Effect orchestration against an async data source, one lane per request
//!   kind, where a newer request supersedes the one in flight
//! - Memoized selectors and a facade exposing them as streams
//! - An independent derived-view pipeline with debounced query input,
//!   filtering, stable sorting and pagination
//! - Testing with `ReducerTest`
//!
//! # Quick Start
//!
//! ```no_run
//! use todo::{InMemoryTodoSource, TodoFacade};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let facade = TodoFacade::new(Arc::new(InMemoryTodoSource::new()));
//!
//! facade.load()?;
//! facade.add("Buy milk")?;
//! facade.settled().await;
//!
//! let snapshot = facade.snapshot();
//! println!("Total todos: {}", snapshot.count);
//! println!("Completed: {}", snapshot.completed_count);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod effects;
pub mod error;
pub mod facade;
pub mod reducer;
pub mod selectors;
pub mod source;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use config::{ConfigError, TodoConfig};
pub use error::TodoError;
pub use facade::TodoFacade;
pub use reducer::{TodoEnvironment, TodoReducer, UuidIds};
pub use selectors::{Records, TodoSelectors, TodoSnapshot};
pub use source::{InMemoryTodoSource, SourceError, TodoSource};
pub use types::{Record, RecordId, TodoAction, TodoState};
pub use view::{RecordField, SortDirection, ViewPipeline};
