//! # Composable State Runtime
//!
//! Runtime implementation for the Composable State architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution,
//! state publication and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that owns state, runs the reducer and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Lanes**: Generation counters that let newer effects supersede older ones
//! - **Selectors**: Memoized projections of published state
//! - **Subscriptions**: Scoped observer registrations
//!
//! ## Example
//!
//! ```ignore
//! use composable_state_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Observe every published state until the handle is dropped
//! let _subscription = store.subscribe(|state| println!("{state:?}"));
//!
//! // Dispatch an action
//! store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//! ```

use composable_state_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;

/// Generation counters for cancellable effect lanes
mod lanes;

/// Memoized state projections
pub mod selector;

/// Scoped state observers
pub mod subscription;

pub use selector::Selector;
pub use subscription::Subscription;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        ///
        /// The action broadcast channel was closed, typically because the
        /// store is shutting down.
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

use lanes::{LaneRegistry, LaneToken};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Configuration for Store instances
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(256)
///     .with_shutdown_timeout(Duration::from_secs(5));
///
/// let store = Store::with_config(state, reducer, env, config);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of effect-produced actions buffered for action observers
    pub broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    ///
    /// # Arguments
    ///
    /// - `broadcast_capacity`: Action broadcast channel capacity
    /// - `default_shutdown_timeout`: Default timeout for shutdown operations
    #[must_use]
    pub const fn new(broadcast_capacity: usize, default_shutdown_timeout: Duration) -> Self {
        Self {
            broadcast_capacity,
            default_shutdown_timeout,
        }
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Effect tracking mode - controls how effects are tracked for completion
///
/// # Modes
///
/// - **Direct**: Tracks only immediate effects (default)
/// - **Cascading**: Tracks effects transitively, following the entire effect tree
#[derive(Debug, Clone)]
pub enum TrackingMode {
    /// Track only immediate effects spawned by this action
    Direct,

    /// Track effects transitively - any effects produced by feedback actions
    /// are also tracked as children
    Cascading {
        /// Child effect handles that need to complete before this handle is done
        children: Arc<Mutex<Vec<EffectHandle>>>,
    },
}

impl TrackingMode {
    /// A fresh cascading mode with no children yet
    #[must_use]
    pub fn cascading() -> Self {
        Self::Cascading {
            children: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for effects to complete.
/// Each action gets a handle that can be awaited to know when its effects
/// (and optionally cascading effects) are done.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start)?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // All effects from Action::Start are now complete
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    mode: TrackingMode,
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("mode", &self.mode)
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl EffectHandle {
    /// Create a new effect handle with the given tracking mode
    ///
    /// # Returns
    ///
    /// A tuple of `(EffectHandle, EffectTracking)` where:
    /// - `EffectHandle` is returned to the caller for waiting
    /// - `EffectTracking` is used internally for effect execution
    fn new(mode: TrackingMode) -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            mode: mode.clone(),
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            mode,
            counter,
            notifier: tx,
            lanes: Vec::new(),
        };

        (handle, tracking)
    }

    /// Number of this handle's effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    ///
    /// In cascading mode this also waits for the effects of every action the
    /// tracked effects fed back, transitively.
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }

        if let TrackingMode::Cascading { children } = &self.mode {
            loop {
                let handles = {
                    let mut guard = children.lock().unwrap_or_else(PoisonError::into_inner);
                    if guard.is_empty() {
                        break;
                    }
                    guard.drain(..).collect::<Vec<_>>()
                };

                for mut handle in handles {
                    Box::pin(handle.wait()).await;
                }
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

/// Internal: Effect tracking context passed through effect execution
///
/// Carries the completion counter for the originating action and the lane
/// tokens of every `Cancellable` the effect is nested in.
#[derive(Clone)]
struct EffectTracking {
    mode: TrackingMode,
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
    lanes: Vec<LaneToken>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }

    /// The first lane this effect has been superseded in, if any
    fn superseded_lane(&self) -> Option<&LaneToken> {
        self.lanes.iter().find(|token| !token.is_current())
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Ensures the effect counter is always decremented, even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that releases one slot of the store-wide pending count on drop
struct PendingGuard(Arc<watch::Sender<usize>>);

impl PendingGuard {
    fn acquire(pending: &Arc<watch::Sender<usize>>) -> Self {
        pending.send_modify(|count| *count += 1);
        Self(Arc::clone(pending))
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.send_modify(|count| *count = count.saturating_sub(1));
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicUsize, DecrementGuard, Duration, Effect, EffectHandle,
        EffectTracking, LaneRegistry, Mutex, Ordering, PendingGuard, PoisonError, Reducer,
        StoreConfig, StoreError, TrackingMode,
    };
    use crate::subscription::{Observers, Subscription};
    use tokio::sync::{broadcast, watch};

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (published as immutable `Arc<S>` snapshots through a watch channel)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and lane cancellation)
    /// 5. Observers (synchronous subscribers notified in dispatch order)
    ///
    /// The reducer runs on a private clone of the current snapshot. When the
    /// result differs from the snapshot a new `Arc` is published; when it is
    /// equal nothing is published and no observer is notified.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<watch::Sender<Arc<S>>>,
        reducer: R,
        environment: E,
        lanes: LaneRegistry,
        observers: Arc<Mutex<Observers<S>>>,
        shutdown: Arc<AtomicBool>,
        /// Effect tasks still running, across every action
        pending_effects: Arc<watch::Sender<usize>>,
        default_shutdown_timeout: Duration,
        /// Action broadcast channel for observing actions produced by effects.
        ///
        /// Actions fed back by effects are broadcast to observers; actions
        /// discarded because their lane was superseded are not.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Clone + Send + std::fmt::Debug + 'static,
        S: Clone + PartialEq + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default()`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        ///
        /// # Arguments
        ///
        /// - `initial_state`: Initial state value
        /// - `reducer`: The reducer function
        /// - `environment`: Dependencies injected into the reducer
        /// - `config`: Broadcast capacity and shutdown behavior
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));
            let (state, _) = watch::channel(Arc::new(initial_state));

            Self {
                state: Arc::new(state),
                reducer,
                environment,
                lanes: LaneRegistry::default(),
                observers: Arc::new(Mutex::new(Observers::default())),
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(watch::channel(0).0),
                default_shutdown_timeout: config.default_shutdown_timeout,
                action_broadcast,
            }
        }

        /// Initiate graceful shutdown of the store
        ///
        /// This method:
        /// 1. Sets the shutdown flag (rejecting new actions from callers)
        /// 2. Waits for pending effects to complete (with timeout)
        /// 3. Returns when all effects finish or timeout expires
        ///
        /// Effects already running still feed their actions back while the
        /// store drains, so in-flight work settles into state before this
        /// returns.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let drained = tokio::time::timeout(timeout, self.settled()).await.is_ok();
            if drained {
                tracing::info!("All effects completed, shutdown successful");
                metrics::counter!("store.shutdown.completed").increment(1);
                return Ok(());
            }

            let pending = self.pending_effects();
            tracing::error!(
                pending_effects = pending,
                "Shutdown timeout: {} effects still running", pending
            );
            metrics::counter!("store.shutdown.timeout").increment(1);
            Err(StoreError::ShutdownTimeout(pending))
        }

        /// Wait until no effect task is running
        ///
        /// Covers every action sent so far and all of their follow-ups. Returns
        /// immediately when the store is already quiet.
        pub async fn settled(&self) {
            let mut pending = self.pending_effects.subscribe();
            let _ = pending.wait_for(|count| *count == 0).await;
        }

        /// Graceful shutdown using the configured default timeout
        ///
        /// # Errors
        ///
        /// See [`Store::shutdown`].
        pub async fn shutdown_gracefully(&self) -> Result<(), StoreError> {
            self.shutdown(self.default_shutdown_timeout).await
        }

        /// Send an action to the store
        ///
        /// This is the single dispatch entry point:
        /// 1. Runs the reducer on a copy of the current state
        /// 2. Publishes the new state if it changed and notifies observers
        /// 3. Starts the returned effects
        /// 4. Effects may produce more actions, which come back through `send`
        ///
        /// Reduction happens before this method returns, so actions sent from
        /// one task are reduced and observed in the order they were sent.
        /// Effects run on spawned tasks, so this must be called from within a
        /// tokio runtime.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        ///
        /// # Example
        ///
        /// ```ignore
        /// let mut handle = store.send(TodoAction::LoadRequested)?;
        /// handle.wait().await;
        /// ```
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            self.send_internal(action, TrackingMode::Direct)
        }

        /// Send an action and wait until it has fully settled
        ///
        /// Waits for the action's effects, the effects of every action they fed
        /// back, and so on, until the cascade is quiet.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        pub async fn send_and_settle(&self, action: A) -> Result<(), StoreError> {
            let mut handle = self.send_internal(action, TrackingMode::cascading())?;
            handle.wait().await;
            Ok(())
        }

        /// Send an action and wait for a matching result action
        ///
        /// Subscribes to the action broadcast before sending, then returns the
        /// first effect-produced action matching `predicate`.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: Timeout expired before matching action received
        /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            // Subscribe BEFORE sending to avoid race condition
            let mut rx = self.action_broadcast.subscribe();

            self.send(action)?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(
                                skipped,
                                "Action observer lagged, {} actions skipped",
                                skipped
                            );
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to all actions fed back by effects
        ///
        /// Actions sent directly through [`Store::send`] are not broadcast, and
        /// neither are actions discarded because their lane was superseded.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Register an observer for published states
        ///
        /// The observer is called immediately with the current state, then once
        /// for every state the store publishes, until the returned
        /// [`Subscription`] is dropped or unsubscribed.
        ///
        /// Observers run on the dispatching task and must not block.
        pub fn subscribe<F>(&self, observer: F) -> Subscription
        where
            F: Fn(&S) + Send + Sync + 'static,
        {
            let observer: crate::subscription::Observer<S> = Arc::new(observer);
            observer(self.current_state().as_ref());

            let id = self
                .observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(observer);
            tracing::trace!(observer = id, "Observer registered");

            Subscription::new(&self.observers, id)
        }

        /// Number of registered observers
        #[must_use]
        pub fn observer_count(&self) -> usize {
            self.observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Number of effect tasks currently running
        ///
        /// A follow-up's effects are started before the effect that produced it
        /// finishes, so this only drops to zero once a cascade is quiet.
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            *self.pending_effects.borrow()
        }

        /// A receiver that always holds the latest published state
        ///
        /// Suited to async consumers; intermediate states may be coalesced if
        /// the receiver falls behind.
        #[must_use]
        pub fn watch(&self) -> watch::Receiver<Arc<S>> {
            self.state.subscribe()
        }

        /// The last published state
        #[must_use]
        pub fn current_state(&self) -> Arc<S> {
            Arc::clone(&self.state.borrow())
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.items.len());
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.borrow();
            f(&**state)
        }

        /// Internal send implementation with tracking control
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action, tracking_mode), name = "store_send_internal")]
        fn send_internal(
            &self,
            action: A,
            tracking_mode: TrackingMode,
        ) -> Result<EffectHandle, StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            Ok(self.dispatch(action, tracking_mode))
        }

        /// Reduce `action`, publish the result and start its effects
        ///
        /// Does not consult the shutdown flag; effect follow-ups come through
        /// here directly so a draining store still applies them.
        fn dispatch(&self, action: A, tracking_mode: TrackingMode) -> EffectHandle {
            tracing::debug!(?action, "Processing action");
            metrics::counter!("store.commands.total").increment(1);

            let (handle, tracking) = EffectHandle::new(tracking_mode);

            let mut effects = composable_state_core::SmallVec::new();
            let changed = self.state.send_if_modified(|current| {
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let mut next = S::clone(&**current);
                effects = self.reducer.reduce(&mut next, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                if next == **current {
                    false
                } else {
                    *current = Arc::new(next);
                    true
                }
            });

            tracing::trace!(changed, effects = effects.len(), "Reducer completed");
            // Note: Precision loss acceptable for metrics (effect counts < 2^52)
            #[allow(clippy::cast_precision_loss)]
            metrics::histogram!("store.effects.count").record(effects.len() as f64);

            if changed {
                self.notify_observers();
            }

            for effect in effects {
                self.execute_effect_internal(effect, tracking.clone());
            }

            handle
        }

        /// Call every observer with the latest state, in registration order
        fn notify_observers(&self) {
            let observers = self
                .observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .snapshot();

            if observers.is_empty() {
                return;
            }

            let state = self.current_state();
            for observer in observers {
                observer(state.as_ref());
            }
        }

        /// Feed an effect-produced action back into the store
        fn feed_back(&self, action: A, tracking: &EffectTracking) {
            if let Some(token) = tracking.superseded_lane() {
                tracing::debug!(
                    lane = %token.id(),
                    current_generation = self.lanes.generation(token.id()),
                    ?action,
                    "Discarding result of superseded effect"
                );
                metrics::counter!("store.effects.superseded").increment(1);
                return;
            }

            // Broadcast to observers (tests, logging, request-response callers)
            let _ = self.action_broadcast.send(action.clone());

            match &tracking.mode {
                TrackingMode::Direct => {
                    let _ = self.dispatch(action, TrackingMode::Direct);
                },
                TrackingMode::Cascading { children } => {
                    let mode = TrackingMode::Cascading {
                        children: Arc::clone(children),
                    };
                    let child = self.dispatch(action, mode);
                    children
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(child);
                },
            }
        }

        /// Spawn `work` as a tracked effect task
        fn spawn_tracked<F>(&self, tracking: &EffectTracking, work: F)
        where
            F: FnOnce(Self, EffectTracking) -> futures::future::BoxFuture<'static, ()>,
        {
            tracking.increment();

            // Track global pending effects for shutdown
            let pending_guard = PendingGuard::acquire(&self.pending_effects);

            let task = work(self.clone(), tracking.clone());
            let tracking = tracking.clone();

            tokio::spawn(async move {
                let _guard = DecrementGuard(tracking);
                let _pending_guard = pending_guard; // Decrement on drop
                task.await;
            });
        }

        /// Execute an effect with tracking
        ///
        /// # Effect Types
        ///
        /// - `None`: No-op
        /// - `Future`: Executes async computation, feeds resulting action back if `Some`
        /// - `Delay`: Waits for duration, then feeds the action back
        /// - `Parallel`: Executes effects concurrently
        /// - `Sequential`: Executes effects in order, waiting for each to complete
        /// - `Cancellable`: Advances the lane, then executes the inner effect with
        ///   the lane's token attached
        ///
        /// Effect failures are isolated: a panicking effect task is logged by tokio
        /// and the [`DecrementGuard`] still releases its tracking slot.
        #[allow(clippy::needless_pass_by_value)] // tracking is cloned per branch
        #[tracing::instrument(skip(self, effect, tracking), name = "execute_effect")]
        fn execute_effect_internal(&self, effect: Effect<A>, tracking: EffectTracking) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);

                    self.spawn_tracked(&tracking, move |store, tracking| {
                        Box::pin(async move {
                            if let Some(action) = fut.await {
                                tracing::trace!("Effect::Future produced an action");
                                store.feed_back(action, &tracking);
                            } else {
                                tracing::trace!("Effect::Future completed with no action");
                            }
                        })
                    });
                },
                Effect::Delay { duration, action } => {
                    tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);

                    self.spawn_tracked(&tracking, move |store, tracking| {
                        Box::pin(async move {
                            tokio::time::sleep(duration).await;
                            tracing::trace!("Effect::Delay elapsed");
                            store.feed_back(*action, &tracking);
                        })
                    });
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);

                    for effect in effects {
                        self.execute_effect_internal(effect, tracking.clone());
                    }
                },
                Effect::Sequential(effects) => {
                    let effect_count = effects.len();
                    tracing::trace!("Executing Effect::Sequential with {} effects", effect_count);
                    metrics::counter!("store.effects.executed", "type" => "sequential")
                        .increment(1);

                    self.spawn_tracked(&tracking, move |store, tracking| {
                        Box::pin(async move {
                            for (idx, effect) in effects.into_iter().enumerate() {
                                tracing::trace!(
                                    "Executing sequential effect {} of {}",
                                    idx + 1,
                                    effect_count
                                );

                                let (sub_tx, mut sub_rx) = watch::channel(());
                                let sub_tracking = EffectTracking {
                                    mode: tracking.mode.clone(),
                                    counter: Arc::new(AtomicUsize::new(0)),
                                    notifier: sub_tx,
                                    lanes: tracking.lanes.clone(),
                                };
                                let counter = Arc::clone(&sub_tracking.counter);

                                store.execute_effect_internal(effect, sub_tracking);

                                while counter.load(Ordering::SeqCst) > 0 {
                                    if sub_rx.changed().await.is_err() {
                                        break;
                                    }
                                }
                            }
                            tracing::trace!("Effect::Sequential completed");
                        })
                    });
                },
                Effect::Cancellable { id, effect } => {
                    metrics::counter!("store.effects.executed", "type" => "cancellable")
                        .increment(1);

                    let token = self.lanes.begin(&id);
                    tracing::trace!(lane = %id, "Executing Effect::Cancellable");

                    let mut tracking = tracking;
                    tracking.lanes.push(token);
                    self.execute_effect_internal(*effect, tracking);
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                lanes: self.lanes.clone(),
                observers: Arc::clone(&self.observers),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                default_shutdown_timeout: self.default_shutdown_timeout,
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
