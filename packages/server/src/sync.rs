//! Mutation observers and the index synchronizer.
//!
//! Every committed create/update/delete flows through the registered
//! [`MutationObserver`]s. The built-in [`IndexSynchronizer`] mirrors the
//! mutation into the document index; failures become [`SyncError`]s that
//! surface to the caller without unwinding the relational commit.

use std::sync::Arc;

use async_trait::async_trait;
use metacat_core::EntityHash;
use tracing::warn;

use crate::error::SyncError;
use crate::index::DocumentIndex;

/// Observer for committed entity mutations.
///
/// Implementations can mirror data into the index, maintain statistics, or
/// broadcast change events. Used as `Arc<dyn MutationObserver>`. Observers
/// run after the relational commit; an error reports the side effect as
/// failed but never rolls the commit back.
#[async_trait]
pub trait MutationObserver: Send + Sync {
    /// Called after a new row is committed.
    async fn on_create(&self, kind: &str, id: i64, row: &EntityHash) -> Result<(), SyncError>;

    /// Called after an existing row is overwritten.
    async fn on_update(&self, kind: &str, id: i64, row: &EntityHash) -> Result<(), SyncError>;

    /// Called after a row is removed.
    async fn on_delete(&self, kind: &str, id: i64) -> Result<(), SyncError>;
}

/// Composite observer that fans out to multiple observers.
///
/// Every observer is notified even when an earlier one fails; the first
/// error is returned after the fan-out completes.
#[derive(Default)]
pub struct CompositeMutationObserver {
    observers: Vec<Arc<dyn MutationObserver>>,
}

impl CompositeMutationObserver {
    /// Creates a composite observer with the given list of observers.
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn MutationObserver>>) -> Self {
        Self { observers }
    }

    /// Adds an observer after construction.
    pub fn add(&mut self, observer: Arc<dyn MutationObserver>) {
        self.observers.push(observer);
    }

    fn collect(first_error: &mut Option<SyncError>, result: Result<(), SyncError>) {
        if let Err(err) = result {
            warn!(kind = %err.kind, id = err.id, error = %err, "mutation observer failed");
            if first_error.is_none() {
                *first_error = Some(err);
            }
        }
    }

    fn finish(first_error: Option<SyncError>) -> Result<(), SyncError> {
        first_error.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl MutationObserver for CompositeMutationObserver {
    async fn on_create(&self, kind: &str, id: i64, row: &EntityHash) -> Result<(), SyncError> {
        let mut first_error = None;
        for observer in &self.observers {
            Self::collect(&mut first_error, observer.on_create(kind, id, row).await);
        }
        Self::finish(first_error)
    }

    async fn on_update(&self, kind: &str, id: i64, row: &EntityHash) -> Result<(), SyncError> {
        let mut first_error = None;
        for observer in &self.observers {
            Self::collect(&mut first_error, observer.on_update(kind, id, row).await);
        }
        Self::finish(first_error)
    }

    async fn on_delete(&self, kind: &str, id: i64) -> Result<(), SyncError> {
        let mut first_error = None;
        for observer in &self.observers {
            Self::collect(&mut first_error, observer.on_delete(kind, id).await);
        }
        Self::finish(first_error)
    }
}

/// Observer that mirrors committed mutations into the document index.
pub struct IndexSynchronizer {
    index: Arc<dyn DocumentIndex>,
}

impl IndexSynchronizer {
    /// Creates a synchronizer writing to the given index.
    #[must_use]
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self { index }
    }

    fn sync_error(kind: &str, id: i64) -> impl FnOnce(crate::error::IndexError) -> SyncError + '_ {
        move |source| SyncError {
            kind: kind.to_string(),
            id,
            source,
        }
    }
}

#[async_trait]
impl MutationObserver for IndexSynchronizer {
    async fn on_create(&self, kind: &str, id: i64, row: &EntityHash) -> Result<(), SyncError> {
        self.index
            .put_document(kind, id, row)
            .await
            .map_err(Self::sync_error(kind, id))
    }

    async fn on_update(&self, kind: &str, id: i64, row: &EntityHash) -> Result<(), SyncError> {
        self.index
            .put_document(kind, id, row)
            .await
            .map_err(Self::sync_error(kind, id))
    }

    async fn on_delete(&self, kind: &str, id: i64) -> Result<(), SyncError> {
        self.index
            .delete_document(kind, id)
            .await
            .map_err(Self::sync_error(kind, id))
    }
}
