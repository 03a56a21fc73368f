//! Indexer statistics

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use contracts::Action;

/// Counters shared by the indexer and all of its workers
#[derive(Debug, Default)]
pub struct IndexerStats {
    /// Items accepted by `add`
    added: AtomicU64,
    /// Items the service reported as successful
    flushed: AtomicU64,
    /// Items the service (or the encoder) rejected
    failed: AtomicU64,
    indexed: AtomicU64,
    created: AtomicU64,
    updated: AtomicU64,
    deleted: AtomicU64,
    /// Flush calls that returned a response
    requests: AtomicU64,
}

impl IndexerStats {
    /// Create new stats instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_added(&self) {
        self.added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one successful operation
    ///
    /// `create` and `index` share the indexed counter unless the service
    /// tagged the outcome as `created`.
    pub fn record_success(&self, action: Action, created: bool) {
        self.flushed.fetch_add(1, Ordering::Relaxed);
        let counter = match action {
            Action::Create | Action::Index if created => &self.created,
            Action::Create | Action::Index => &self.indexed,
            Action::Update => &self.updated,
            Action::Delete => &self.deleted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            num_added: self.added.load(Ordering::Relaxed),
            num_flushed: self.flushed.load(Ordering::Relaxed),
            num_failed: self.failed.load(Ordering::Relaxed),
            num_indexed: self.indexed.load(Ordering::Relaxed),
            num_created: self.created.load(Ordering::Relaxed),
            num_updated: self.updated.load(Ordering::Relaxed),
            num_deleted: self.deleted.load(Ordering::Relaxed),
            num_requests: self.requests.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the indexer counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub num_added: u64,
    pub num_flushed: u64,
    pub num_failed: u64,
    pub num_indexed: u64,
    pub num_created: u64,
    pub num_updated: u64,
    pub num_deleted: u64,
    pub num_requests: u64,
}

impl StatsSnapshot {
    /// Items accepted but never resolved through a callback
    pub fn num_unresolved(&self) -> u64 {
        self.num_added
            .saturating_sub(self.num_flushed + self.num_failed)
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Bulk Indexer Stats ===")?;
        writeln!(f, "Added: {}", self.num_added)?;
        writeln!(f, "Flushed: {}", self.num_flushed)?;
        writeln!(f, "Failed: {}", self.num_failed)?;
        writeln!(f, "Unresolved: {}", self.num_unresolved())?;
        writeln!(
            f,
            "Indexed: {}, Created: {}, Updated: {}, Deleted: {}",
            self.num_indexed, self.num_created, self.num_updated, self.num_deleted
        )?;
        write!(f, "Requests: {}", self.num_requests)
    }
}
