//! Worker Pool - runs submitted work on a fixed set of threads.
//!
//! The [`WorkerPool`] provides:
//! - One blocking FIFO queue per worker thread
//! - Least-loaded dispatch at submission time
//! - Panic containment per task
//! - Drain-then-join shutdown

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use super::queue::{Job, WorkQueue};
use super::task::{self, TaskHandle};
use super::PoolStats;
use crate::common::config::{default_worker_count, WORKER_THREAD_PREFIX};
use crate::common::{Error, Result, WorkerId};

/// A fixed pool of worker threads, each draining its own queue.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                        WorkerPool                           │
/// │   submit() ── queue_depths() ── least_loaded() ──┐          │
/// │                                                  ▼          │
/// │  ┌──────────┐   ┌──────────┐         ┌──────────┐           │
/// │  │ queue 0  │   │ queue 1  │   ...   │ queue n  │           │
/// │  └────┬─────┘   └────┬─────┘         └────┬─────┘           │
/// │       ▼              ▼                    ▼                 │
/// │   worker 0       worker 1             worker n              │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `queues`: fixed size, each queue has its own lock + condvar
/// - `workers`: `Mutex`, only touched by `shutdown`
/// - `stats`: no lock, all atomic counters
///
/// There is no work stealing. A task stays on the queue it was dispatched
/// to, so tasks on the same queue run in submission order while tasks on
/// different queues may run concurrently.
///
/// # Usage
/// ```
/// use dispatchsql::WorkerPool;
///
/// let pool = WorkerPool::new(4).unwrap();
/// let handle = pool.submit(|| "ran off the caller's thread").unwrap();
/// assert_eq!(handle.wait().unwrap(), "ran off the caller's thread");
///
/// pool.shutdown();
/// assert!(pool.submit(|| ()).is_err());
/// ```
pub struct WorkerPool {
    /// One queue per worker, indexed by `WorkerId`.
    queues: Vec<Arc<WorkQueue>>,

    /// Join handles, emptied by `shutdown`.
    workers: Mutex<Vec<JoinHandle<()>>>,

    /// Task counters.
    stats: Arc<PoolStats>,
}

impl WorkerPool {
    /// Spawn a pool with `thread_count` workers.
    ///
    /// A count of `0` derives the size from the CPU count
    /// (see [`worker_count_for`](crate::common::config::worker_count_for)).
    /// The size never changes afterwards.
    ///
    /// # Errors
    /// - `Error::Spawn` if a worker thread cannot be started; workers that
    ///   did start are stopped again before returning
    pub fn new(thread_count: usize) -> Result<Self> {
        let thread_count = if thread_count == 0 {
            default_worker_count()
        } else {
            thread_count
        };

        let queues: Vec<Arc<WorkQueue>> =
            (0..thread_count).map(|_| Arc::new(WorkQueue::new())).collect();

        let mut workers = Vec::with_capacity(thread_count);
        for (index, queue) in queues.iter().enumerate() {
            let id = WorkerId::new(index);
            let queue = Arc::clone(queue);
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", WORKER_THREAD_PREFIX, index))
                .spawn(move || worker_loop(id, queue));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    for queue in &queues {
                        queue.close();
                    }
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(Error::Spawn(e));
                }
            }
        }

        tracing::debug!(workers = thread_count, "worker pool started");

        Ok(Self {
            queues,
            workers: Mutex::new(workers),
            stats: Arc::new(PoolStats::new()),
        })
    }

    // ========================================================================
    // Public API: Submission
    // ========================================================================

    /// Queue `f` on the least-loaded worker and return a handle to its result.
    ///
    /// Never blocks on the task and never runs it on the calling thread.
    /// If `f` panics, the worker keeps running and the handle resolves to
    /// `Error::TaskPanicked`.
    ///
    /// # Errors
    /// - `Error::SchedulerClosed` after `shutdown` has been called
    pub fn submit<F, T>(&self, f: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.is_shut_down() {
            self.stats.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(Error::SchedulerClosed);
        }

        let worker = least_loaded(&self.queue_depths()).ok_or(Error::SchedulerClosed)?;
        let (completer, handle) = task::channel(worker);
        let stats = Arc::clone(&self.stats);

        let job: Job = Box::new(move || match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => {
                stats.completed.fetch_add(1, Ordering::Relaxed);
                completer.complete(Ok(value));
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(worker = %worker, "task panicked: {}", message);
                stats.panicked.fetch_add(1, Ordering::Relaxed);
                completer.complete(Err(Error::TaskPanicked(message)));
            }
        });

        self.stats.submitted.fetch_add(1, Ordering::Relaxed);
        if self.queues[worker.0].push(job).is_err() {
            // Lost a race with shutdown.
            self.stats.submitted.fetch_sub(1, Ordering::Relaxed);
            self.stats.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(Error::SchedulerClosed);
        }

        Ok(handle)
    }

    // ========================================================================
    // Public API: Lifecycle
    // ========================================================================

    /// Stop accepting work, let every queued task finish, and join the workers.
    ///
    /// Idempotent. A second concurrent call blocks until the first is done,
    /// so returning always means the pool is fully stopped. Must not be
    /// called from inside a pool task.
    pub fn shutdown(&self) {
        for queue in &self.queues {
            queue.close();
        }

        let mut workers = self.workers.lock();
        if workers.is_empty() {
            return;
        }

        tracing::debug!(
            pending = self.stats.snapshot().pending(),
            "worker pool shutting down, draining queues"
        );

        let current = thread::current().id();
        for handle in workers.drain(..) {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                tracing::warn!("worker thread exited abnormally");
            }
        }

        tracing::debug!("worker pool stopped");
    }

    /// Whether `shutdown` has been called.
    pub fn is_shut_down(&self) -> bool {
        self.queues.iter().all(|queue| queue.is_closed())
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Number of worker threads (fixed at construction).
    pub fn worker_count(&self) -> usize {
        self.queues.len()
    }

    /// Pending task count per queue, indexed by worker.
    pub fn queue_depths(&self) -> Vec<usize> {
        self.queues.iter().map(|queue| queue.len()).collect()
    }

    /// Get worker pool statistics.
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.worker_count())
            .field("queue_depths", &self.queue_depths())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

// ============================================================================
// Internal: Dispatch and worker loop
// ============================================================================

/// Pick the queue with the strictly smallest depth; ties go to the lowest index.
pub(crate) fn least_loaded(depths: &[usize]) -> Option<WorkerId> {
    let mut best: Option<(usize, usize)> = None;
    for (index, &depth) in depths.iter().enumerate() {
        match best {
            Some((_, best_depth)) if depth >= best_depth => {}
            _ => best = Some((index, depth)),
        }
    }
    best.map(|(index, _)| WorkerId::new(index))
}

fn worker_loop(id: WorkerId, queue: Arc<WorkQueue>) {
    tracing::debug!(worker = %id, "worker started");
    while let Some(job) = queue.pop() {
        job();
    }
    tracing::debug!(worker = %id, "worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
