//! # Composable State Testing
//!
//! Testing utilities and helpers for the Composable State architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - The `ReducerTest` Given-When-Then harness
//! - Assertion helpers for effects
//! - Tracing setup for tests
//!
//! ## Example
//!
//! ```ignore
//! use composable_state_testing::{SequentialIds, init_test_tracing};
//! use composable_state_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_add_flow() {
//!     init_test_tracing();
//!     let env = TodoEnvironment::new(Arc::new(SequentialIds::new("tmp")), source);
//!     let store = Store::new(TodoState::default(), TodoReducer::new(), env);
//!
//!     store.send(TodoAction::AddRequested { title: "Learn X".into() })?;
//!
//!     assert_eq!(store.state(|s| s.items.len()), 1);
//! }
//! ```

use composable_state_core::environment::IdGenerator;

/// Fluent Given-When-Then reducer tests
pub mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::IdGenerator;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Predictable id generator for deterministic tests
    ///
    /// Produces `"{prefix}-1"`, `"{prefix}-2"`, ... in order.
    ///
    /// # Example
    ///
    /// ```
    /// use composable_state_testing::mocks::SequentialIds;
    /// use composable_state_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIds::new("todo");
    /// assert_eq!(ids.next_id(), "todo-1");
    /// assert_eq!(ids.next_id(), "todo-2");
    /// ```
    #[derive(Debug)]
    pub struct SequentialIds {
        prefix: String,
        next: AtomicU64,
    }

    impl SequentialIds {
        /// Create a generator whose ids start with `prefix`
        #[must_use]
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                next: AtomicU64::new(1),
            }
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            format!("{}-{n}", self.prefix)
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    /// Install a `tracing` subscriber that writes through the test harness
    ///
    /// Safe to call from every test; only the first call installs anything.
    /// Filtering follows `RUST_LOG` when set.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use helpers::init_test_tracing;
pub use mocks::SequentialIds;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds::new("tmp");
        assert_eq!(ids.next_id(), "tmp-1");
        assert_eq!(ids.next_id(), "tmp-2");
    }

    #[test]
    fn test_init_tracing_twice() {
        init_test_tracing();
        init_test_tracing();
    }
}
