//! Debounced draft persistence
//!
//! Each edit cancels the pending write and schedules a new one after the
//! quiet period, so a burst of edits produces exactly one write carrying the
//! state of the last edit.
//!
//! Cancellation only interrupts the quiet period. A write that has started
//! always runs to completion, so [`DraftAutosaver::cancel_and_wait`] can
//! guarantee no draft lands after it returns.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fhi_common::{FamilyRecord, Result};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Destination of draft writes
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn store_draft(&self, record: &FamilyRecord) -> Result<()>;
}

struct PendingWrite {
    /// Dropping the sender cancels a write still in its quiet period
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Cancellable single-slot timer in front of a [`DraftStore`]
pub struct DraftAutosaver {
    store: Arc<dyn DraftStore>,
    quiet: Duration,
    pending: Option<PendingWrite>,
}

impl DraftAutosaver {
    pub fn new(store: Arc<dyn DraftStore>, quiet: Duration) -> Self {
        Self {
            store,
            quiet,
            pending: None,
        }
    }

    /// Replace any pending write with one of `record` after the quiet period
    pub fn schedule(&mut self, record: FamilyRecord) {
        self.cancel();

        let (cancel, cancelled) = oneshot::channel::<()>();
        let store = Arc::clone(&self.store);
        let quiet = self.quiet;
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(quiet) => {}
                _ = cancelled => return,
            }
            match store.store_draft(&record).await {
                Ok(()) => debug!(record_id = %record.id, "Draft saved"),
                Err(e) => warn!(record_id = %record.id, "Draft save failed: {}", e),
            }
        });
        self.pending = Some(PendingWrite { cancel, task });
    }

    /// Drop the pending write unless it has already started
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            drop(pending.cancel);
        }
    }

    /// Cancel, then wait until any write already in progress has finished
    pub async fn cancel_and_wait(&mut self) {
        if let Some(PendingWrite { cancel, task }) = self.pending.take() {
            drop(cancel);
            if let Err(e) = task.await {
                warn!("Draft writer ended abnormally: {}", e);
            }
        }
    }

    /// True while a scheduled write has not yet completed
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|pending| !pending.task.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for DraftAutosaver {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingStore {
        writes: Mutex<Vec<FamilyRecord>>,
    }

    #[async_trait]
    impl DraftStore for CountingStore {
        async fn store_draft(&self, record: &FamilyRecord) -> Result<()> {
            self.writes.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn record_with_phone(base: &FamilyRecord, phone: &str) -> FamilyRecord {
        let mut record = base.clone();
        record.family_info.phone = phone.to_string();
        record
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_writes_once() {
        let store = Arc::new(CountingStore::default());
        let mut saver = DraftAutosaver::new(store.clone(), Duration::from_millis(1000));
        let base = FamilyRecord::blank();

        saver.schedule(record_with_phone(&base, "3"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        saver.schedule(record_with_phone(&base, "30"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        saver.schedule(record_with_phone(&base, "300"));

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(store.writes.lock().unwrap().is_empty());
        assert!(saver.is_pending());

        tokio::time::sleep(Duration::from_millis(10)).await;
        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].family_info.phone, "300");
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_write_separately() {
        let store = Arc::new(CountingStore::default());
        let mut saver = DraftAutosaver::new(store.clone(), Duration::from_millis(1000));
        let base = FamilyRecord::blank();

        saver.schedule(record_with_phone(&base, "1"));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        saver.schedule(record_with_phone(&base, "2"));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.writes.lock().unwrap().len(), 2);
        assert!(!saver.is_pending());
    }

    /// Store whose writes take a while to complete
    struct SlowStore {
        inner: CountingStore,
        delay: Duration,
    }

    #[async_trait]
    impl DraftStore for SlowStore {
        async fn store_draft(&self, record: &FamilyRecord) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            self.inner.store_draft(record).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_wait_lets_started_write_finish() {
        let store = Arc::new(SlowStore {
            inner: CountingStore::default(),
            delay: Duration::from_millis(500),
        });
        let mut saver = DraftAutosaver::new(store.clone(), Duration::from_millis(100));

        saver.schedule(FamilyRecord::blank());
        // Quiet period over, write in progress
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.inner.writes.lock().unwrap().is_empty());

        saver.cancel_and_wait().await;
        assert_eq!(store.inner.writes.lock().unwrap().len(), 1);
        assert!(!saver.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_wait_during_quiet_period_writes_nothing() {
        let store = Arc::new(CountingStore::default());
        let mut saver = DraftAutosaver::new(store.clone(), Duration::from_millis(1000));

        saver.schedule(FamilyRecord::blank());
        tokio::time::sleep(Duration::from_millis(500)).await;
        saver.cancel_and_wait().await;

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop_discard_pending_write() {
        let store = Arc::new(CountingStore::default());
        let base = FamilyRecord::blank();

        let mut saver = DraftAutosaver::new(store.clone(), Duration::from_millis(1000));
        saver.schedule(base.clone());
        saver.cancel();
        assert!(!saver.is_pending());

        saver.schedule(base);
        drop(saver);

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(store.writes.lock().unwrap().is_empty());
    }
}
