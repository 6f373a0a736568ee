//! Blocking FIFO queue feeding one worker thread.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

/// A type-erased unit of work.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Per-worker job queue.
///
/// Any thread may push or read the length; exactly one worker pops.
/// A closed queue refuses new jobs but still hands out the ones it holds,
/// so the worker drains it before exiting.
pub(crate) struct WorkQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

struct QueueState {
    jobs: VecDeque<Job>,
    closed: bool,
}

impl WorkQueue {
    /// Create an empty, open queue.
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Append a job. Hands the job back if the queue is closed.
    pub(crate) fn push(&self, job: Job) -> Result<(), Job> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(job);
        }
        state.jobs.push_back(job);
        drop(state);

        self.available.notify_one();
        Ok(())
    }

    /// Take the oldest job, blocking while the queue is empty and open.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub(crate) fn pop(&self) -> Option<Job> {
        let mut state = self.state.lock();
        loop {
            if let Some(job) = state.jobs.pop_front() {
                return Some(job);
            }
            if state.closed {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Number of jobs waiting (not counting one already being run).
    pub(crate) fn len(&self) -> usize {
        self.state.lock().jobs.len()
    }

    /// Stop accepting jobs and wake the consumer.
    pub(crate) fn close(&self) {
        self.state.lock().closed = true;
        self.available.notify_all();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}
