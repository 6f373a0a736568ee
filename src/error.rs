//! Error types for dispatchsql.

use std::fmt;

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a single driver call.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// All errors that can reach a caller of dispatchsql.
///
/// Driver failures during an operation never show up here: interactions
/// turn them into sentinel results. What remains is configuration, caller
/// input, and scheduler state.
#[derive(Debug, Error)]
pub enum Error {
    /// The worker pool was shut down and accepts no more tasks.
    #[error("scheduler is closed")]
    SchedulerClosed,

    /// A submitted task panicked while running on a worker thread.
    ///
    /// The worker survives; only this task's handle sees the failure.
    #[error("task panicked: {0}")]
    TaskPanicked(String),

    /// The task was dropped without ever producing a result.
    #[error("task was dropped before completion")]
    TaskDropped,

    /// The connection string could not be parsed.
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Settings were rejected at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A transaction command list was not a sequence of strings.
    #[error("invalid transaction commands: {0}")]
    InvalidCommands(String),

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// A driver failure surfaced outside an interaction (connection checks).
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// A failure reported by the database driver.
///
/// Covers malformed SQL, constraint violations and lost connectivity alike.
/// `code` carries the server error number when the driver has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    /// Server error number (e.g. 1064 for a syntax error), if known.
    pub code: Option<u16>,
    /// Human-readable message from the driver.
    pub message: String,
}

impl DriverError {
    /// Create a driver error without a server code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Create a driver error carrying a server error number.
    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "#{} {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for DriverError {}
