//! Worker identifier type.

use std::fmt;

/// Identifies a worker thread and the queue it owns.
///
/// Using `usize` because queues live in a `Vec` and the id doubles as the
/// index: `queues[worker_id.0]`. Lower ids win dispatch ties.
///
/// # Example
/// ```
/// use dispatchsql::WorkerId;
///
/// let worker = WorkerId::new(2);
/// assert_eq!(worker.0, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub usize);

impl WorkerId {
    /// Create a new WorkerId.
    #[inline]
    pub fn new(id: usize) -> Self {
        WorkerId(id)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Worker({})", self.0)
    }
}
