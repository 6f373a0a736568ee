//! Worker pool statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics tracked by the worker pool.
///
/// All fields are atomic for lock-free, thread-safe updates from the
/// submitting threads and the workers.
///
/// # Memory Ordering
/// We use `Ordering::Relaxed` for all operations: the counters are
/// independent and only need atomicity.
///
/// # Example
/// ```
/// use dispatchsql::PoolStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = PoolStats::new();
/// stats.submitted.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().pending(), 1);
/// ```
#[derive(Debug)]
pub struct PoolStats {
    /// Tasks accepted into a queue.
    pub submitted: AtomicU64,

    /// Tasks that ran to completion.
    pub completed: AtomicU64,

    /// Tasks that panicked while running.
    pub panicked: AtomicU64,

    /// Submissions refused because the pool was shut down.
    pub rejected: AtomicU64,
}

impl PoolStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            submitted: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            panicked: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

impl Default for PoolStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of worker pool statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub submitted: u64,
    pub completed: u64,
    pub panicked: u64,
    pub rejected: u64,
}

impl StatsSnapshot {
    /// Tasks that finished either way.
    pub fn finished(&self) -> u64 {
        self.completed + self.panicked
    }

    /// Tasks queued or running at snapshot time.
    pub fn pending(&self) -> u64 {
        self.submitted.saturating_sub(self.finished())
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ submitted: {}, completed: {}, panicked: {}, rejected: {}, pending: {} }}",
            self.submitted,
            self.completed,
            self.panicked,
            self.rejected,
            self.pending()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = PoolStats::new();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.submitted, 0);
        assert_eq!(snapshot.pending(), 0);
    }

    #[test]
    fn test_stats_pending() {
        let stats = PoolStats::new();
        stats.submitted.fetch_add(10, Ordering::Relaxed);
        stats.completed.fetch_add(6, Ordering::Relaxed);
        stats.panicked.fetch_add(1, Ordering::Relaxed);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.finished(), 7);
        assert_eq!(snapshot.pending(), 3);
    }

    #[test]
    fn test_stats_display() {
        let stats = PoolStats::new();
        stats.submitted.fetch_add(5, Ordering::Relaxed);
        stats.completed.fetch_add(4, Ordering::Relaxed);

        let display = format!("{}", stats.snapshot());

        assert!(display.contains("submitted: 5"));
        assert!(display.contains("completed: 4"));
        assert!(display.contains("pending: 1"));
    }
}
