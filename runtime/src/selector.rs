//! Memoized projections of store state.
//!
//! A [`Selector`] reads one slice of state (its *input*) and derives a value
//! from it (its *projection*). The projection only runs again when the input
//! slice compares unequal to the one seen last time, so unrelated state
//! changes hand back the cached value. Slices held in an `Arc` keep pointer
//! identity across transitions that do not touch them, which makes the
//! comparison cheap.
//!
//! # Example
//!
//! ```ignore
//! let completed = Selector::new(
//!     |state: &TodoState| Arc::clone(&state.items),
//!     |items| items.iter().filter(|r| r.completed).count(),
//! );
//!
//! let count = completed.select(&store.current_state());
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// A memoized projection from state `S` through input slice `K` to `T`
pub struct Selector<S, K, T> {
    input: fn(&S) -> K,
    project: fn(&K) -> T,
    cache: Mutex<Option<(K, T)>>,
    computations: AtomicUsize,
}

impl<S, K, T> Selector<S, K, T>
where
    K: PartialEq,
    T: Clone,
{
    /// Create a selector from an input extractor and a projection
    #[must_use]
    pub const fn new(input: fn(&S) -> K, project: fn(&K) -> T) -> Self {
        Self {
            input,
            project,
            cache: Mutex::new(None),
            computations: AtomicUsize::new(0),
        }
    }

    /// Derive the value for `state`, reusing the cached one when the input is unchanged
    pub fn select(&self, state: &S) -> T {
        let input = (self.input)(state);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((cached_input, cached_value)) = cache.as_ref() {
            if *cached_input == input {
                return cached_value.clone();
            }
        }

        let value = (self.project)(&input);
        self.computations.fetch_add(1, Ordering::Relaxed);
        *cache = Some((input, value.clone()));
        value
    }

    /// How many times the projection has actually run
    #[must_use]
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }
}

impl<S, K, T> std::fmt::Debug for Selector<S, K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("computations", &self.computations.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
