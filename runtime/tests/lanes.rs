//! Integration tests for lane-scoped (cancellable) effects
//!
//! Covers the two lane patterns the runtime is built for: "switch to latest"
//! request lanes, where only the newest request may apply its result, and
//! debounced input, where a burst of inputs commits only the last one.

// Test code can use unwrap/expect/panic
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
)]

use composable_state_core::effect::{Effect, EffectId};
use composable_state_core::{SmallVec, cancellable, delay, smallvec};
use composable_state_runtime::{Store, StoreError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

const FETCH: EffectId = EffectId::new("fetch");
const SEARCH: EffectId = EffectId::new("search");
const AUDIT: EffectId = EffectId::new("audit");

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Fetch `label` with a simulated latency
    Fetch { label: &'static str, latency_ms: u64 },
    /// Fetch completed
    Fetched { label: &'static str },
    /// Audit in an unrelated lane
    Audit { latency_ms: u64 },
    /// Audit completed
    Audited,
    /// Keystroke in a search box
    Typed { text: String },
    /// Debounce window elapsed
    SearchCommitted { text: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
struct TestState {
    fetched: Vec<&'static str>,
    audits: u32,
    committed: Vec<String>,
}

#[derive(Clone)]
struct TestEnvironment {
    debounce: Duration,
}

#[derive(Clone)]
struct TestReducer;

impl composable_state_core::reducer::Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = TestEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::Fetch { label, latency_ms } => smallvec![cancellable! {
                id: FETCH,
                effect: Effect::Future(Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(latency_ms)).await;
                    Some(TestAction::Fetched { label })
                }))
            }],
            TestAction::Fetched { label } => {
                state.fetched.push(label);
                SmallVec::new()
            },
            TestAction::Audit { latency_ms } => smallvec![cancellable! {
                id: AUDIT,
                effect: Effect::Future(Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(latency_ms)).await;
                    Some(TestAction::Audited)
                }))
            }],
            TestAction::Audited => {
                state.audits += 1;
                SmallVec::new()
            },
            TestAction::Typed { text } => smallvec![cancellable! {
                id: SEARCH,
                effect: delay! {
                    duration: env.debounce,
                    action: TestAction::SearchCommitted { text }
                }
            }],
            TestAction::SearchCommitted { text } => {
                state.committed.push(text);
                SmallVec::new()
            },
        }
    }
}

fn store() -> Store<TestState, TestAction, TestEnvironment, TestReducer> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Store::new(
        TestState::default(),
        TestReducer,
        TestEnvironment {
            debounce: Duration::from_millis(300),
        },
    )
}

// ============================================================================
// Tests
// ============================================================================

/// The newer request wins even when the older one settles later.
#[tokio::test(start_paused = true)]
async fn test_latest_request_wins() -> Result<(), StoreError> {
    let store = store();

    let mut slow = store.send(TestAction::Fetch { label: "first", latency_ms: 200 })?;
    let mut fast = store.send(TestAction::Fetch { label: "second", latency_ms: 50 })?;

    fast.wait().await;
    slow.wait().await;

    assert_eq!(store.state(|s| s.fetched.clone()), vec!["second"]);
    Ok(())
}

/// A superseded request is discarded even when it settles first.
#[tokio::test(start_paused = true)]
async fn test_superseded_request_settling_first_is_discarded() -> Result<(), StoreError> {
    let store = store();

    let mut first = store.send(TestAction::Fetch { label: "first", latency_ms: 10 })?;
    let mut second = store.send(TestAction::Fetch { label: "second", latency_ms: 100 })?;

    first.wait().await;
    assert!(store.state(|s| s.fetched.is_empty()));

    second.wait().await;
    assert_eq!(store.state(|s| s.fetched.clone()), vec!["second"]);
    Ok(())
}

/// Effects in different lanes never cancel each other.
#[tokio::test(start_paused = true)]
async fn test_lanes_do_not_interfere() -> Result<(), StoreError> {
    let store = store();

    let mut audit = store.send(TestAction::Audit { latency_ms: 100 })?;
    let mut fetch = store.send(TestAction::Fetch { label: "only", latency_ms: 50 })?;

    fetch.wait().await;
    audit.wait().await;

    let state = store.current_state();
    assert_eq!(state.fetched, vec!["only"]);
    assert_eq!(state.audits, 1);
    Ok(())
}

/// Sequential requests (each settled before the next) all apply.
#[tokio::test(start_paused = true)]
async fn test_sequential_requests_all_apply() -> Result<(), StoreError> {
    let store = store();

    store
        .send_and_settle(TestAction::Fetch { label: "a", latency_ms: 10 })
        .await?;
    store
        .send_and_settle(TestAction::Fetch { label: "b", latency_ms: 10 })
        .await?;

    assert_eq!(store.state(|s| s.fetched.clone()), vec!["a", "b"]);
    Ok(())
}

/// Only the last keystroke of a burst commits, once the window is quiet.
#[tokio::test(start_paused = true)]
async fn test_debounce_commits_last_input_of_burst() -> Result<(), StoreError> {
    let store = store();

    let mut last = store.send(TestAction::Typed { text: "l".into() })?;
    for text in ["le", "lea", "lear", "learn"] {
        tokio::time::sleep(Duration::from_millis(100)).await;
        last = store.send(TestAction::Typed { text: text.into() })?;
    }

    tokio::time::sleep(Duration::from_millis(299)).await;
    assert!(store.state(|s| s.committed.is_empty()));

    last.wait().await;
    assert_eq!(store.state(|s| s.committed.clone()), vec!["learn".to_string()]);
    Ok(())
}

/// Inputs separated by more than the window each commit.
#[tokio::test(start_paused = true)]
async fn test_debounce_quiet_gaps_commit_each_input() -> Result<(), StoreError> {
    let store = store();

    store.send_and_settle(TestAction::Typed { text: "x".into() }).await?;
    store.send_and_settle(TestAction::Typed { text: "y".into() }).await?;

    assert_eq!(
        store.state(|s| s.committed.clone()),
        vec!["x".to_string(), "y".to_string()]
    );
    Ok(())
}

/// Observers see each published state in order, including intermediate ones.
#[tokio::test(start_paused = true)]
async fn test_observer_sees_fetch_results_in_order() -> Result<(), StoreError> {
    let store = store();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let _subscription = store.subscribe(move |state: &TestState| {
        sink.lock().unwrap().push(state.fetched.len());
    });

    store
        .send_and_settle(TestAction::Fetch { label: "a", latency_ms: 5 })
        .await?;
    store
        .send_and_settle(TestAction::Fetch { label: "b", latency_ms: 5 })
        .await?;

    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    Ok(())
}
