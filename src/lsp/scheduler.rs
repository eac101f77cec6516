//! Per-document debounce for swatch refreshes.
//!
//! Scheduling a document replaces its pending task, so a burst of edits runs
//! the refresh once, a quiet window after the last edit.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_lsp::lsp_types::Url;

pub struct DecorationScheduler {
    delay_ms: AtomicU64,
    pending: Mutex<HashMap<Url, JoinHandle<()>>>,
}

impl DecorationScheduler {
    pub fn new(delay: Duration) -> Self {
        Self { delay_ms: AtomicU64::new(delay.as_millis() as u64), pending: Mutex::new(HashMap::new()) }
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.load(Ordering::Relaxed))
    }

    /// Run `task` for `uri` after the quiet window, aborting the task still
    /// pending for the same document.
    pub fn schedule<F>(&self, uri: Url, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        let mut pending = self.pending.lock().unwrap();
        if let Some(previous) = pending.insert(uri, handle) {
            previous.abort();
        }
        pending.retain(|_, handle| !handle.is_finished());
    }

    pub fn cancel(&self, uri: &Url) {
        if let Some(handle) = self.pending.lock().unwrap().remove(uri) {
            handle.abort();
        }
    }

    /// Documents with a refresh still waiting or running.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().values().filter(|handle| !handle.is_finished()).count()
    }
}
