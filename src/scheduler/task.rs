//! Completion handles for submitted tasks.
//!
//! A task's result travels from the worker to the caller over a
//! `futures` oneshot channel. The caller holds a [`TaskHandle`] and can
//! block on it, poll it with a timeout, or `.await` it from async code. The
//! worker side holds a `Completer`; dropping it unfinished cancels the
//! channel, which the handle reports as `Error::TaskDropped`.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread::{self, Thread};
use std::time::{Duration, Instant};

use futures::channel::oneshot;
use futures::task::ArcWake;
use futures::FutureExt;

use crate::common::{Error, Result, WorkerId};

/// Create a linked completer/handle pair for a task queued on `worker`.
pub(crate) fn channel<T>(worker: WorkerId) -> (Completer<T>, TaskHandle<T>) {
    let (tx, rx) = oneshot::channel();
    let finished = Arc::new(AtomicBool::new(false));

    (
        Completer {
            tx: Some(tx),
            finished: Arc::clone(&finished),
        },
        TaskHandle {
            rx,
            finished,
            worker,
        },
    )
}

/// Worker-side end of a task: delivers at most one result.
pub(crate) struct Completer<T> {
    /// `None` once a result has been sent.
    tx: Option<oneshot::Sender<Result<T>>>,
    finished: Arc<AtomicBool>,
}

impl<T> Completer<T> {
    pub(crate) fn complete(mut self, result: Result<T>) {
        self.finished.store(true, Ordering::Release);
        if let Some(tx) = self.tx.take() {
            // The caller may have dropped its handle; nobody is left to tell.
            let _ = tx.send(result);
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        self.finished.store(true, Ordering::Release);
    }
}

/// Caller-side handle to a task running on the worker pool.
///
/// # Example
/// ```
/// use dispatchsql::WorkerPool;
///
/// let pool = WorkerPool::new(2).unwrap();
/// let handle = pool.submit(|| 21 * 2).unwrap();
/// assert_eq!(handle.wait().unwrap(), 42);
/// ```
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<Result<T>>,
    finished: Arc<AtomicBool>,
    worker: WorkerId,
}

impl<T> TaskHandle<T> {
    /// The worker whose queue received this task.
    pub fn worker(&self) -> WorkerId {
        self.worker
    }

    /// Whether the task has finished (successfully or not).
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Block until the task finishes and return its result.
    ///
    /// # Errors
    /// - `Error::TaskPanicked` if the task panicked
    /// - `Error::TaskDropped` if the task was discarded without running
    pub fn wait(self) -> Result<T> {
        futures::executor::block_on(self)
    }

    /// Block for at most `timeout`.
    ///
    /// Returns `None` if the task is still running; the handle stays valid.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<Result<T>> {
        let deadline = Instant::now() + timeout;
        let waker = futures::task::waker(Arc::new(Unparker(thread::current())));
        let mut cx = Context::from_waker(&waker);

        loop {
            if let Poll::Ready(result) = self.poll_unpin(&mut cx) {
                return Some(result);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            thread::park_timeout(deadline - now);
        }
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.rx
            .poll_unpin(cx)
            .map(|received| received.unwrap_or(Err(Error::TaskDropped)))
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("worker", &self.worker)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Wakes a thread parked in `wait_timeout`.
struct Unparker(Thread);

impl ArcWake for Unparker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.0.unpark();
    }
}
