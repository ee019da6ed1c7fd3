//! Invocation counters
//!
//! The counters use Relaxed ordering: they are observational only and do
//! not synchronize any other memory.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by a ledger
#[derive(Debug, Default)]
pub struct InvocationCounters {
    started: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
    max_depth_seen: AtomicU64,
}

impl InvocationCounters {
    /// Fresh counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame entering execution at `depth`
    pub fn record_start(&self, depth: usize) {
        self.started.fetch_add(1, Ordering::Relaxed);
        self.max_depth_seen
            .fetch_max(depth as u64 + 1, Ordering::Relaxed);
    }

    /// Record a committed frame
    pub fn record_commit(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rolled-back frame
    pub fn record_rollback(&self) {
        self.rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time snapshot
    pub fn snapshot(&self) -> InvocationMetrics {
        InvocationMetrics {
            total_started: self.started.load(Ordering::Relaxed),
            total_committed: self.committed.load(Ordering::Relaxed),
            total_rolled_back: self.rolled_back.load(Ordering::Relaxed),
            max_depth_seen: self.max_depth_seen.load(Ordering::Relaxed),
        }
    }
}

/// Invocation statistics
///
/// Every executed frame counts, nested ones included, so one outer
/// transaction with a nested call starts two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvocationMetrics {
    /// Frames that reached execution
    pub total_started: u64,
    /// Frames that committed
    pub total_committed: u64,
    /// Frames that rolled back
    pub total_rolled_back: u64,
    /// Deepest stack observed
    pub max_depth_seen: u64,
}

impl InvocationMetrics {
    /// Frames that finished either way
    pub fn total_completed(&self) -> u64 {
        self.total_committed + self.total_rolled_back
    }

    /// Rollback rate (rolled back / started)
    pub fn rollback_rate(&self) -> f64 {
        if self.total_started > 0 {
            self.total_rolled_back as f64 / self.total_started as f64
        } else {
            0.0
        }
    }
}
