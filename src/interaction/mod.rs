//! Interactions: one database round trip each.
//!
//! Every interaction follows the same script, implemented once in
//! [`run`]:
//!
//! ```text
//!   open ConnectionHandle ──▶ execute ──▶ close ──▶ (debug) timing line
//!        │ connect-ms           │ execute-ms / read-ms
//!        └── failure ───────────┴──▶ error line + sentinel result
//! ```
//!
//! Driver failures never leave an interaction. They are logged and the
//! variant's sentinel is returned instead:
//!
//! | Variant         | Output            | Sentinel |
//! |-----------------|-------------------|----------|
//! | [`NonQuery`]    | `i64`             | `-1`     |
//! | [`Scalar`]      | `Option<Value>`   | `None`   |
//! | [`Reader`]      | `ResultSet`       | empty    |
//! | [`Transaction`] | `bool`            | `false`  |

mod non_query;
mod reader;
pub mod report;
mod scalar;
mod transaction;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::common::{DriverResult, Settings};
use crate::db::{Connection, ConnectionHandle, Connector, Parameters};

pub use non_query::NonQuery;
pub use reader::Reader;
pub use scalar::Scalar;
pub use transaction::Transaction;

/// A single operation against the database.
///
/// Implementors provide the operation itself; opening, closing, timing
/// and failure handling come from [`run`].
pub trait Interaction: Send + Sized + 'static {
    /// Result handed back to the caller.
    type Output: Send + 'static;

    /// Short name used in log lines (`[Failed NonQuery] ...`).
    const KIND: &'static str;

    /// Settings captured when the interaction was built.
    fn settings(&self) -> &Settings;

    /// Statement text with parameter values spliced in, for logging only.
    fn describe(&self) -> String;

    /// Perform the operation on an open connection.
    ///
    /// Reader-style variants record `timings.read` themselves.
    fn execute<C: Connection>(
        &mut self,
        conn: &mut C,
        timings: &mut Timings,
    ) -> DriverResult<Self::Output>;

    /// Value returned when the operation fails.
    fn sentinel(&self) -> Self::Output;

    /// Open a connection, execute, close, report. Never fails.
    fn run<K: Connector>(self, connector: &K) -> Self::Output {
        run(self, connector)
    }
}

/// Statement text and parameters shared by the single-statement variants.
#[derive(Debug, Clone)]
pub struct Command {
    settings: Arc<Settings>,
    text: String,
    parameters: Parameters,
}

impl Command {
    /// `None` parameters behave like an empty map.
    pub fn new(
        settings: Arc<Settings>,
        text: impl Into<String>,
        parameters: Option<Parameters>,
    ) -> Self {
        Self {
            settings,
            text: text.into(),
            parameters: parameters.unwrap_or_default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The statement as it will appear in debug output.
    pub fn resolved(&self) -> String {
        report::resolve_statement(&self.text, &self.parameters)
    }
}

/// Wall-clock phases of one interaction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timings {
    pub connect: Duration,
    /// Statement execution, excluding `read`.
    pub execute: Duration,
    /// Draining the result set; readers only.
    pub read: Option<Duration>,
    pub total: Duration,
}

impl fmt::Display for Timings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "connect {}ms; execute {}ms; ",
            self.connect.as_millis(),
            self.execute.as_millis()
        )?;
        if let Some(read) = self.read {
            write!(f, "read {}ms; ", read.as_millis())?;
        }
        write!(f, "total {}ms", self.total.as_millis())
    }
}

/// Drive one interaction through open → execute → close → report.
pub fn run<I: Interaction, K: Connector>(mut interaction: I, connector: &K) -> I::Output {
    let debug = interaction.settings().debug();
    let started = Instant::now();
    let mut timings = Timings::default();

    let opened = ConnectionHandle::open(connector, interaction.settings().connection());
    timings.connect = started.elapsed();
    let mut handle = match opened {
        Ok(handle) => handle,
        Err(error) => {
            report::failure(I::KIND, &error, debug, || interaction.describe());
            return interaction.sentinel();
        }
    };

    let execute_started = Instant::now();
    let outcome = interaction.execute(&mut *handle, &mut timings);
    timings.execute = execute_started
        .elapsed()
        .saturating_sub(timings.read.unwrap_or_default());

    if let Err(error) = handle.close() {
        tracing::warn!(error = %error, "failed to close connection");
    }
    timings.total = started.elapsed();

    let output = match outcome {
        Ok(output) => output,
        Err(error) => {
            report::failure(I::KIND, &error, debug, || interaction.describe());
            interaction.sentinel()
        }
    };

    if debug {
        report::timing(&timings, &interaction.describe());
    }

    output
}
