//! The session list as a display surface sees it.

use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Summary, SummaryCache};
use crate::error::PlayLedgerError;
use crate::session::Session;
use crate::store::RecordStore;

/// A consistent view of the fetched list and its totals.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub sessions: Arc<[Session]>,
    pub summary: Summary,
    /// Refresh generation this list was fetched for, `None` before the
    /// first fetch.
    pub generation: Option<u64>,
}

/// Latest session list, re-fetched whenever the refresh signal changes.
///
/// A failed fetch is not an error for the viewer: it is logged and the list
/// is shown empty until the next successful refresh.
pub struct SessionListView {
    records: Arc<dyn RecordStore>,
    sessions: RwLock<(Arc<[Session]>, Option<u64>)>,
    cache: SummaryCache,
}

impl SessionListView {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self {
            records,
            sessions: RwLock::new((Arc::from(Vec::new()), None)),
            cache: SummaryCache::new(),
        }
    }

    /// Fetch the list for `generation`, degrading to empty on failure.
    ///
    /// A failed fetch leaves the list untagged, so the next
    /// [`snapshot_at`](Self::snapshot_at) tries again.
    pub async fn refresh(&self, generation: u64) -> usize {
        let (fetched, tag): (Arc<[Session]>, _) = match self.records.list().await {
            Ok(list) => (list.into(), Some(generation)),
            Err(e) => {
                let err = PlayLedgerError::ListFetch(e);
                warn!(error = %err, generation, "showing empty session list");
                (Arc::from(Vec::new()), None)
            }
        };

        let count = fetched.len();
        if let Ok(mut sessions) = self.sessions.write() {
            *sessions = (fetched, tag);
        }
        debug!(count, generation, "session list refreshed");
        count
    }

    /// Current list and totals.
    pub fn snapshot(&self) -> Snapshot {
        let (sessions, generation) = self
            .sessions
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|_| (Arc::from(Vec::new()), None));
        let summary = self.cache.get(&sessions);
        Snapshot {
            sessions,
            summary,
            generation,
        }
    }

    /// Current list, re-fetched first if it predates `generation`.
    pub async fn snapshot_at(&self, generation: u64) -> Snapshot {
        let current = self.sessions.read().ok().and_then(|s| s.1);
        if current != Some(generation) {
            self.refresh(generation).await;
        }
        self.snapshot()
    }

    /// Refresh once per change of `signal` until its sender is dropped.
    pub async fn watch(self: Arc<Self>, mut signal: watch::Receiver<u64>) {
        let initial = *signal.borrow_and_update();
        self.refresh(initial).await;

        while signal.changed().await.is_ok() {
            let generation = *signal.borrow_and_update();
            self.refresh(generation).await;
        }
        info!("refresh signal closed; list watcher stopped");
    }
}
