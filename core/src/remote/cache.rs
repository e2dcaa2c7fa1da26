//! Last-known-good snapshot cache.
//!
//! Single writer (the poller thread), single reader (the tick thread).
//! The writer builds a complete snapshot and swaps the `Arc` under a lock
//! held only for the pointer exchange; the reader clones the `Arc` and never
//! observes a partial write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::model::PrinterState;

/// Wholesale-replaced view of everything the backend knows.
#[derive(Clone, Debug)]
pub struct RemoteSnapshot {
    pub printers: Vec<PrinterState>,
    /// False after a failed poll; the printer list is then last-known-good.
    pub reachable: bool,
    /// Wall-clock time of the last successful poll.
    pub last_update: DateTime<Utc>,
}

impl RemoteSnapshot {
    fn empty() -> Self {
        Self {
            printers: Vec::new(),
            reachable: false,
            last_update: DateTime::UNIX_EPOCH,
        }
    }

    /// First connected printer, which the AMS overview follows.
    pub fn active_printer(&self) -> Option<&PrinterState> {
        self.printers
            .iter()
            .find(|p| p.connected)
            .or_else(|| self.printers.first())
    }
}

/// Cloneable handle to the swapped snapshot.
#[derive(Clone)]
pub struct SnapshotCache {
    inner: Arc<RwLock<Arc<RemoteSnapshot>>>,
}

impl SnapshotCache {
    /// Starts empty and unreachable, until the first successful poll.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(RemoteSnapshot::empty()))),
        }
    }

    /// Current snapshot. Non-blocking beyond the `Arc` clone; safe to call
    /// every tick.
    pub fn get(&self) -> Arc<RemoteSnapshot> {
        Arc::clone(&self.inner.read())
    }

    /// Publish a successful poll: the printer list is replaced wholesale,
    /// printers absent from the new list are dropped.
    pub fn store(&self, printers: Vec<PrinterState>) {
        let snapshot = Arc::new(RemoteSnapshot {
            printers,
            reachable: true,
            last_update: Utc::now(),
        });
        *self.inner.write() = snapshot;
    }

    /// Record a failed poll: keep the previous printer list for last-known-
    /// good display, drop only the reachability claim.
    pub fn mark_unreachable(&self) {
        let mut slot = self.inner.write();
        if slot.reachable {
            let mut snapshot = (**slot).clone();
            snapshot.reachable = false;
            *slot = Arc::new(snapshot);
        }
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
