//! Draft persistence — the durable record behind the wizard.
//!
//! Writes are debounced: mutations park the latest snapshot in a pending
//! slot and (re)arm a timer; when the timer fires it serializes whatever
//! is in the slot at that moment, never its closure capture. A sequence
//! counter kills superseded timers so the record always converges on the
//! most recent state. `reset` clears the record synchronously.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::builder::steps::WizardStep;
use crate::models::resume::DraftResume;

/// Quiet period a burst of edits must survive before a write happens.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(300);

/// What actually lands in durable storage: step and draft, nothing
/// ephemeral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDraft {
    pub current_step: WizardStep,
    pub resume_data: DraftResume,
}

#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn load(&self) -> anyhow::Result<Option<String>>;
    async fn save(&self, payload: &str) -> anyhow::Result<()>;
    async fn clear(&self) -> anyhow::Result<()>;
}

/// Single-record JSON file store.
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileDraftStore { path: path.into() }
    }
}

#[async_trait]
impl DraftStore for FileDraftStore {
    async fn load(&self) -> anyhow::Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, payload: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, payload).await?;
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

struct SaverInner {
    pending: Mutex<Option<String>>,
    sequence: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
}

pub struct DebouncedSaver {
    store: Arc<dyn DraftStore>,
    delay: Duration,
    inner: Arc<SaverInner>,
}

impl DebouncedSaver {
    pub fn new(store: Arc<dyn DraftStore>, delay: Duration) -> Self {
        DebouncedSaver {
            store,
            delay,
            inner: Arc::new(SaverInner {
                pending: Mutex::new(None),
                sequence: AtomicU64::new(0),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Parks the snapshot and (re)arms the timer. Later calls within the
    /// quiet period supersede earlier ones; only the last snapshot is
    /// written.
    pub fn schedule(&self, payload: String) {
        *self.inner.pending.lock().expect("pending lock") = Some(payload);
        let my_sequence = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let inner = Arc::clone(&self.inner);
        let store = Arc::clone(&self.store);
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if inner.sequence.load(Ordering::SeqCst) != my_sequence {
                // A newer mutation re-armed the timer; its task will write.
                return;
            }
            let payload = inner.pending.lock().expect("pending lock").take();
            if let Some(payload) = payload {
                if let Err(e) = store.save(&payload).await {
                    warn!("Failed to persist draft: {e}");
                }
            }
        });

        let mut timer = self.inner.timer.lock().expect("timer lock");
        if let Some(previous) = timer.replace(handle) {
            previous.abort();
        }
    }

    /// Drops any pending write and removes the durable record. Not
    /// debounced: a reload right after reset must not resurrect the
    /// draft.
    pub async fn cancel_and_clear(&self) {
        self.inner.sequence.fetch_add(1, Ordering::SeqCst);
        *self.inner.pending.lock().expect("pending lock") = None;
        if let Some(handle) = self.inner.timer.lock().expect("timer lock").take() {
            handle.abort();
        }
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear persisted draft: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingStore {
        saves: Mutex<Vec<String>>,
        cleared: AtomicU64,
    }

    impl RecordingStore {
        fn new() -> Arc<Self> {
            Arc::new(RecordingStore {
                saves: Mutex::new(Vec::new()),
                cleared: AtomicU64::new(0),
            })
        }
    }

    #[async_trait]
    impl DraftStore for RecordingStore {
        async fn load(&self) -> anyhow::Result<Option<String>> {
            Ok(self.saves.lock().unwrap().last().cloned())
        }

        async fn save(&self, payload: &str) -> anyhow::Result<()> {
            self.saves.lock().unwrap().push(payload.to_string());
            Ok(())
        }

        async fn clear(&self) -> anyhow::Result<()> {
            self.cleared.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_debounce_coalesces_to_most_recent() {
        let store = RecordingStore::new();
        let saver = DebouncedSaver::new(store.clone(), Duration::from_millis(20));

        saver.schedule("first".to_string());
        saver.schedule("second".to_string());
        saver.schedule("third".to_string());

        tokio::time::sleep(Duration::from_millis(80)).await;

        let saves = store.saves.lock().unwrap().clone();
        assert_eq!(saves, vec!["third".to_string()]);
    }

    #[tokio::test]
    async fn test_writes_after_quiet_period_each_land() {
        let store = RecordingStore::new();
        let saver = DebouncedSaver::new(store.clone(), Duration::from_millis(10));

        saver.schedule("one".to_string());
        tokio::time::sleep(Duration::from_millis(50)).await;
        saver.schedule("two".to_string());
        tokio::time::sleep(Duration::from_millis(50)).await;

        let saves = store.saves.lock().unwrap().clone();
        assert_eq!(saves, vec!["one".to_string(), "two".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel_and_clear_discards_pending_write() {
        let store = RecordingStore::new();
        let saver = DebouncedSaver::new(store.clone(), Duration::from_millis(20));

        saver.schedule("doomed".to_string());
        saver.cancel_and_clear().await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(store.saves.lock().unwrap().is_empty());
        assert_eq!(store.cleared.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path().join("nested/draft.json"));

        assert_eq!(store.load().await.unwrap(), None);
        store.save("{\"currentStep\":1}").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("{\"currentStep\":1}"));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        // clearing an absent record is fine
        store.clear().await.unwrap();
    }
}
