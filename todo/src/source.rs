//! The data source the todo list is loaded from and written to.
//!
//! [`TodoSource`] is the only I/O boundary of the state layer. Effects call it;
//! reducers never do. [`InMemoryTodoSource`] stands in for a remote backend,
//! with configurable latency and failure injection so that slow and flaky
//! networks can be reproduced deterministically.

use crate::types::{Record, RecordId};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by a [`TodoSource`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Failure produced by failure injection
    #[error("simulated source failure")]
    Injected,

    /// The backend could not be reached or refused the call
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Boxed future returned by [`TodoSource`] operations
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Asynchronous CRUD over the record collection
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// so it can be shared as `Arc<dyn TodoSource>` and captured by effects.
pub trait TodoSource: Send + Sync {
    /// Fetch every record, in source order
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the backend call fails.
    fn fetch_all(&self) -> SourceFuture<'_, Vec<Record>>;

    /// Create a record with `title`; the source assigns the id
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the backend call fails.
    fn create(&self, title: String) -> SourceFuture<'_, Record>;

    /// Flip the completion flag of `id`
    ///
    /// Returns `None` when no such record exists.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the backend call fails.
    fn toggle(&self, id: RecordId) -> SourceFuture<'_, Option<Record>>;

    /// Delete `id`, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the backend call fails.
    fn delete(&self, id: RecordId) -> SourceFuture<'_, bool>;
}

/// In-memory [`TodoSource`] with simulated latency and failures
///
/// Clones share the same records and failure switches.
///
/// # Example
///
/// ```
/// use todo::source::{InMemoryTodoSource, TodoSource};
/// use todo::types::Record;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = InMemoryTodoSource::with_records(vec![Record::new("1", "Learn X")])
///     .with_latency(Duration::from_millis(20));
///
/// source.fail_next(1);
/// assert!(source.fetch_all().await.is_err());
/// assert_eq!(source.fetch_all().await?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTodoSource {
    records: Arc<Mutex<Vec<Record>>>,
    latency: Duration,
    failures_pending: Arc<AtomicUsize>,
    always_fail: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryTodoSource {
    /// Create an empty source without latency
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source seeded with `records`
    #[must_use]
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Self::default()
        }
    }

    /// Delay every call by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next `calls` operations fail with [`SourceError::Injected`]
    pub fn fail_next(&self, calls: usize) {
        self.failures_pending.store(calls, Ordering::SeqCst);
    }

    /// Make every operation fail with [`SourceError::Unavailable`] until switched off again
    pub fn set_always_fail(&self, always_fail: bool) {
        self.always_fail.store(always_fail, Ordering::SeqCst);
    }

    /// Number of operations started so far, failed ones included
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Copy of the records currently held
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulated round trip: latency first, then the failure decision
    async fn round_trip(&self, operation: &'static str) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let injected = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if injected {
            tracing::debug!(operation, "Injected source failure");
            return Err(SourceError::Injected);
        }

        if self.always_fail.load(Ordering::SeqCst) {
            tracing::debug!(operation, "Source switched offline");
            return Err(SourceError::Unavailable("source is offline".to_string()));
        }

        tracing::trace!(operation, "Source call succeeded");
        Ok(())
    }
}

impl TodoSource for InMemoryTodoSource {
    fn fetch_all(&self) -> SourceFuture<'_, Vec<Record>> {
        Box::pin(async move {
            self.round_trip("fetch_all").await?;
            Ok(self.records())
        })
    }

    fn create(&self, title: String) -> SourceFuture<'_, Record> {
        Box::pin(async move {
            self.round_trip("create").await?;
            let record = Record::new(Uuid::new_v4().to_string(), title);
            self.lock().push(record.clone());
            Ok(record)
        })
    }

    fn toggle(&self, id: RecordId) -> SourceFuture<'_, Option<Record>> {
        Box::pin(async move {
            self.round_trip("toggle").await?;
            let mut records = self.lock();
            Ok(records.iter_mut().find(|r| r.id == id).map(|record| {
                record.completed = !record.completed;
                record.clone()
            }))
        })
    }

    fn delete(&self, id: RecordId) -> SourceFuture<'_, bool> {
        Box::pin(async move {
            self.round_trip("delete").await?;
            let mut records = self.lock();
            let before = records.len();
            records.retain(|r| r.id != id);
            Ok(records.len() != before)
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;

    fn seeded() -> InMemoryTodoSource {
        InMemoryTodoSource::with_records(vec![
            Record::new("1", "Learn X").with_completed(true),
            Record::new("2", "Learn Y"),
        ])
    }

    #[tokio::test]
    async fn test_fetch_returns_seed_in_order() {
        let records = seeded().fetch_all().await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[tokio::test]
    async fn test_create_assigns_fresh_id() {
        let source = seeded();
        let a = source.create("Build Z".into()).await.unwrap();
        let b = source.create("Ship it".into()).await.unwrap();

        assert_ne!(a.id, b.id);
        assert!(!a.completed);
        assert_eq!(source.records().len(), 4);
    }

    #[tokio::test]
    async fn test_toggle_and_delete_missing_record() {
        let source = seeded();

        assert_eq!(source.toggle(RecordId::from("9")).await.unwrap(), None);
        assert!(!source.delete(RecordId::from("9")).await.unwrap());

        let toggled = source.toggle(RecordId::from("1")).await.unwrap().unwrap();
        assert!(!toggled.completed);
        assert!(source.delete(RecordId::from("1")).await.unwrap());
        assert_eq!(source.records().len(), 1);
    }

    #[tokio::test]
    async fn test_fail_next_counts_down() {
        let source = seeded();
        source.fail_next(2);

        assert_eq!(source.fetch_all().await, Err(SourceError::Injected));
        assert_eq!(source.fetch_all().await, Err(SourceError::Injected));
        assert!(source.fetch_all().await.is_ok());
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_always_fail_switch() {
        let source = seeded();
        source.set_always_fail(true);
        assert_eq!(
            source.create("x".into()).await,
            Err(SourceError::Unavailable("source is offline".into()))
        );

        source.set_always_fail(false);
        assert!(source.create("x".into()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let source = seeded().with_latency(Duration::from_millis(250));
        let start = tokio::time::Instant::now();

        source.fetch_all().await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
