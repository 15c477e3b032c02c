//! Ordered background persistence.
//!
//! Accepted mutations only mark their country dirty. A single worker task
//! drains the queue in order, coalesces repeated marks for one country and
//! writes the country's snapshot as it is at write time (or deletes the
//! record if the country is gone). A record on disk therefore never moves
//! backwards, and a delete can never be overtaken by an older save.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use polity_core::domain::CountryId;
use polity_core::manager::UnifiedStateManager;

use crate::service::ServiceStats;
use crate::store::SelectionStore;

enum Job {
    Dirty(CountryId),
    Flush(oneshot::Sender<()>),
}

/// Sender side of the persistence worker.
#[derive(Debug, Clone)]
pub struct PersistQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl PersistQueue {
    /// Start the worker on the current Tokio runtime.
    ///
    /// The worker stops once every clone of the queue is dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(
        manager: Arc<UnifiedStateManager>,
        store: Arc<dyn SelectionStore>,
        stats: Arc<ServiceStats>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, manager, store, stats));
        Self { tx }
    }

    /// Queue a write of the country's current state.
    pub fn mark_dirty(&self, country: CountryId) {
        if self.tx.send(Job::Dirty(country)).is_err() {
            tracing::warn!("Persistence worker has stopped, dropping write");
        }
    }

    /// Wait until every write queued before this call has finished.
    pub async fn flush(&self) {
        let (done, finished) = oneshot::channel();
        if self.tx.send(Job::Flush(done)).is_ok() {
            let _ = finished.await;
        }
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<Job>,
    manager: Arc<UnifiedStateManager>,
    store: Arc<dyn SelectionStore>,
    stats: Arc<ServiceStats>,
) {
    let mut dirty = BTreeSet::new();
    while let Some(job) = rx.recv().await {
        let mut batch = vec![job];
        while let Ok(job) = rx.try_recv() {
            batch.push(job);
        }

        for job in batch {
            match job {
                Job::Dirty(country) => {
                    dirty.insert(country);
                }
                Job::Flush(done) => {
                    write_dirty(&mut dirty, &manager, store.as_ref(), &stats).await;
                    let _ = done.send(());
                }
            }
        }
        write_dirty(&mut dirty, &manager, store.as_ref(), &stats).await;
    }
    tracing::debug!("Persistence worker stopped");
}

async fn write_dirty(
    dirty: &mut BTreeSet<CountryId>,
    manager: &UnifiedStateManager,
    store: &dyn SelectionStore,
    stats: &ServiceStats,
) {
    for country in std::mem::take(dirty) {
        let result = match manager.snapshot(&country) {
            Some(record) => store.save(record).await,
            None => store.delete(&country).await,
        };
        match result {
            Ok(()) => stats.record_persisted(),
            Err(e) => {
                stats.record_persist_failure();
                tracing::warn!(country = %country, "Persistence failed: {e}");
            }
        }
    }
}
