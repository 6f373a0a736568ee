//! Task scheduling.
//!
//! Database calls block, so they never run on the caller's thread. This
//! module owns the threads they run on.
//!
//! # Components
//! - [`WorkerPool`] - Fixed set of worker threads with least-loaded dispatch
//! - [`TaskHandle`] - Waitable / awaitable result of a submitted task
//! - [`PoolStats`] - Task counters

mod pool;
mod queue;
mod stats;
mod task;

pub use pool::WorkerPool;
pub use stats::{PoolStats, StatsSnapshot};
pub use task::TaskHandle;
