//! Request sequencing for displayed state.
//!
//! Each user action takes a fresh id before its fetches start. A response may
//! only replace what is shown if its id is still the latest issued, so a slow
//! earlier request can never overwrite a newer result.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Identifier of one issued request. Higher is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestId(u64);

/// Issues monotonically increasing request ids.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new id, superseding every earlier one.
    pub fn begin(&self) -> RequestId {
        RequestId(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, id: RequestId) -> bool {
        self.latest.load(Ordering::SeqCst) == id.0
    }
}

/// A displayed value that only the latest request may update.
#[derive(Debug)]
pub struct LatestOnly<T> {
    sequencer: RequestSequencer,
    shown: RwLock<Option<(RequestId, T)>>,
}

impl<T: Clone> LatestOnly<T> {
    pub fn new() -> Self {
        Self {
            sequencer: RequestSequencer::new(),
            shown: RwLock::new(None),
        }
    }

    /// Start a request whose result may later be published.
    pub fn begin(&self) -> RequestId {
        self.sequencer.begin()
    }

    /// Publish `value` for request `id`.
    ///
    /// Returns `false` and drops the value when a newer request was started
    /// in the meantime.
    pub async fn publish(&self, id: RequestId, value: T) -> bool {
        let mut shown = self.shown.write().await;
        if !self.sequencer.is_latest(id) {
            tracing::debug!("Dropping stale response for request {:?}", id);
            return false;
        }
        *shown = Some((id, value));
        true
    }

    /// The currently displayed value, if any.
    pub async fn current(&self) -> Option<T> {
        self.shown.read().await.as_ref().map(|(_, v)| v.clone())
    }
}

impl<T: Clone> Default for LatestOnly<T> {
    fn default() -> Self {
        Self::new()
    }
}
