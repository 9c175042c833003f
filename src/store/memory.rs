use crate::core::error::TrackerError;
use crate::core::history::{HistoryStore, PriceHistory};
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// In-memory history store. `None` behaves like a missing history file.
pub struct MemoryHistoryStore {
    inner: Mutex<Option<PriceHistory>>,
    saves: AtomicUsize,
}

impl MemoryHistoryStore {
    pub fn new(history: Option<PriceHistory>) -> Self {
        Self {
            inner: Mutex::new(history),
            saves: AtomicUsize::new(0),
        }
    }

    /// Snapshot of what is currently persisted.
    pub fn persisted(&self) -> Option<PriceHistory> {
        self.inner.lock().ok().and_then(|guard| guard.clone())
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new(Some(PriceHistory::new()))
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<PriceHistory, TrackerError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| TrackerError::HistoryCorrupt {
                path: PathBuf::from("<memory>"),
                reason: "store lock poisoned".to_string(),
            })?;
        guard
            .clone()
            .ok_or_else(|| TrackerError::HistoryNotFound(PathBuf::from("<memory>")))
    }

    fn save(&self, history: &PriceHistory) -> Result<(), TrackerError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| TrackerError::HistoryCorrupt {
                path: PathBuf::from("<memory>"),
                reason: "store lock poisoned".to_string(),
            })?;
        *guard = Some(history.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        debug!(rows = history.len(), "Saved price history in memory");
        Ok(())
    }
}
