//! # Composable State Core
//!
//! Core traits and types for the Composable State architecture.
//!
//! This crate provides the fundamental abstractions for building unidirectional,
//! reactive state layers: commands are reduced into state by a pure function and
//! side effects are returned as descriptions that a runtime executes.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature
//! - **Action**: All possible inputs to a reducer (requests and their outcomes)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Dependency Injection via Environment
//! - Cancellation by lane, not by task handle
//!
//! ## Example
//!
//! ```ignore
//! use composable_state_core::*;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//!     Reset,
//! }
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!             CounterAction::Reset => state.count = 0,
//!         }
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use smallvec::{SmallVec, smallvec};

/// Effect construction macros (`async_effect!`, `delay!`, `cancellable!`)
pub mod effect_macros;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for TodoReducer {
    ///     type State = TodoState;
    ///     type Action = TodoAction;
    ///     type Environment = TodoEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut TodoState,
    ///         action: TodoAction,
    ///         env: &TodoEnvironment,
    ///     ) -> SmallVec<[Effect<TodoAction>; 4]> {
    ///         match action {
    ///             TodoAction::LoadRequested => {
    ///                 state.loading = true;
    ///                 smallvec![Effect::None]
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates the state it is handed
        /// 3. Returns effect descriptions to be executed
        ///
        /// The runtime hands the reducer a private copy of the current state,
        /// so previously published snapshots are never mutated.
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to the working copy of state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable and cancellable.
pub mod effect {
    use std::borrow::Cow;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Identity of a cancellation lane
    ///
    /// All [`Effect::Cancellable`] effects sharing an `EffectId` belong to the
    /// same lane. Starting a new effect in a lane supersedes whatever was in
    /// flight there: the superseded effect still runs to completion, but the
    /// action it produces is discarded.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EffectId(Cow<'static, str>);

    impl EffectId {
        /// Create a lane id from a static name
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(Cow::Borrowed(name))
        }

        /// Create a lane id from an owned name
        #[must_use]
        pub fn owned(name: impl Into<String>) -> Self {
            Self(Cow::Owned(name.into()))
        }

        /// The lane name
        #[must_use]
        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl std::fmt::Display for EffectId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for timeouts, debouncing)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Run `effect` in the lane `id`, superseding the lane's previous effect
        ///
        /// Only the most recently started effect of a lane may feed an action
        /// back into the store.
        Cancellable {
            /// Lane the effect runs in
            id: EffectId,
            /// The wrapped effect
            effect: Box<Effect<Action>>,
        },
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Move this effect into the lane `id`
        #[must_use]
        pub fn cancellable(self, id: EffectId) -> Effect<Action> {
            Effect::Cancellable {
                id,
                effect: Box::new(self),
            }
        }

        /// The lane this effect runs in, if any
        #[must_use]
        pub const fn lane(&self) -> Option<&EffectId> {
            match self {
                Effect::Cancellable { id, .. } => Some(id),
                _ => None,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All non-deterministic dependencies are abstracted behind traits and injected
/// via the Environment parameter, so reducers stay replayable.
pub mod environment {
    /// Id generator trait - abstracts identifier creation for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - random identifiers
    /// struct UuidIds;
    /// impl IdGenerator for UuidIds {
    ///     fn next_id(&self) -> String {
    ///         uuid::Uuid::new_v4().to_string()
    ///     }
    /// }
    /// ```
    pub trait IdGenerator: Send + Sync {
        /// Produce an identifier that has not been produced before
        fn next_id(&self) -> String;
    }
}
