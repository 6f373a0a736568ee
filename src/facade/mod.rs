//! Public query API.
//!
//! [`QueryFacade`] turns a statement and its parameters into an
//! interaction, hands the interaction's `run` to the [`WorkerPool`], and
//! gives the caller a [`TaskHandle`] for the result.
//!
//! ```text
//!   caller ──query()──▶ QueryFacade ──NonQuery──▶ WorkerPool::submit
//!     ▲                                               │
//!     │                                   least-loaded worker thread
//!     │                                               │
//!     └──────── TaskHandle<i64> ◀── run(): open, execute, close, report
//! ```
//!
//! Only scheduler state surfaces as `Err` here. Driver failures resolve the
//! handle to the operation's sentinel value.

pub mod input;

use std::sync::Arc;

use crate::common::{DriverResult, Result, Settings};
use crate::db::{ConnectionHandle, Connector, Parameters, ResultSet, Value};
use crate::interaction::{Command, Interaction, NonQuery, Reader, Scalar, Transaction};
use crate::scheduler::{TaskHandle, WorkerPool};

/// Asynchronous front door for database work.
///
/// Settings are captured once. To point at another server or flip the
/// debug flag, build a new facade.
///
/// # Example
/// ```
/// use dispatchsql::db::mock::{MockConnector, MockResponse};
/// use dispatchsql::{Parameters, QueryFacade, Settings};
///
/// let connector = MockConnector::new();
/// connector.respond("UPDATE users SET seen = NOW() WHERE id = @id", MockResponse::affected(1));
///
/// let settings = Settings::new("SERVER=localhost;DATABASE=app").unwrap().with_thread_limit(2);
/// let facade = QueryFacade::new(settings, connector).unwrap();
///
/// let handle = facade
///     .query(
///         "UPDATE users SET seen = NOW() WHERE id = @id",
///         Some(Parameters::new().with("id", 7)),
///         false,
///     )
///     .unwrap();
/// assert_eq!(handle.wait().unwrap(), 1);
/// ```
///
/// # Thread Safety
/// `QueryFacade` is `Send + Sync`; calls may come from any thread.
pub struct QueryFacade<K: Connector> {
    settings: Arc<Settings>,
    connector: Arc<K>,
    pool: Arc<WorkerPool>,
}

impl<K: Connector> QueryFacade<K> {
    /// Build a facade with its own pool, sized from `settings`.
    ///
    /// # Errors
    /// - `Error::Spawn` if a worker thread cannot be started
    pub fn new(settings: Settings, connector: K) -> Result<Self> {
        let pool = WorkerPool::new(settings.worker_count())?;
        Ok(Self::with_pool(settings, connector, Arc::new(pool)))
    }

    /// Build a facade on an existing pool, which may be shared.
    pub fn with_pool(settings: Settings, connector: K, pool: Arc<WorkerPool>) -> Self {
        Self {
            settings: Arc::new(settings),
            connector: Arc::new(connector),
            pool,
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Execute a statement for its side effects.
    ///
    /// Resolves to the affected-row count, or to the generated key when
    /// `is_insert` is set. Resolves to `-1` if the statement fails.
    ///
    /// # Errors
    /// - `Error::SchedulerClosed` after [`shutdown`](Self::shutdown)
    pub fn query(
        &self,
        command: impl Into<String>,
        parameters: Option<Parameters>,
        is_insert: bool,
    ) -> Result<TaskHandle<i64>> {
        let command = self.command(command, parameters);
        self.submit(NonQuery::new(command, is_insert))
    }

    /// Fetch the first column of the first row.
    ///
    /// Resolves to `None` for SQL `NULL`, no rows, or failure.
    pub fn query_scalar(
        &self,
        command: impl Into<String>,
        parameters: Option<Parameters>,
    ) -> Result<TaskHandle<Option<Value>>> {
        let command = self.command(command, parameters);
        self.submit(Scalar::new(command))
    }

    /// Fetch every row.
    ///
    /// Resolves to an empty set on failure.
    pub fn query_result(
        &self,
        command: impl Into<String>,
        parameters: Option<Parameters>,
    ) -> Result<TaskHandle<ResultSet>> {
        let command = self.command(command, parameters);
        self.submit(Reader::new(command))
    }

    /// Run `commands` in order inside one transaction.
    ///
    /// All statements share `parameters`. Resolves to `true` only if every
    /// statement and the commit succeeded.
    pub fn transaction<I, S>(
        &self,
        commands: I,
        parameters: Option<Parameters>,
    ) -> Result<TaskHandle<bool>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let commands = commands.into_iter().map(Into::into).collect();
        self.submit(Transaction::new(
            Arc::clone(&self.settings),
            commands,
            parameters,
        ))
    }

    /// Open and close one connection on the pool, blocking until done.
    ///
    /// Use at startup to fail fast on bad credentials or an unreachable
    /// server.
    ///
    /// # Errors
    /// - `Error::Driver` if the connection cannot be opened or closed
    /// - `Error::SchedulerClosed` after [`shutdown`](Self::shutdown)
    pub fn verify_connection(&self) -> Result<()> {
        let connector = Arc::clone(&self.connector);
        let settings = Arc::clone(&self.settings);

        let handle = self.pool.submit(move || -> DriverResult<()> {
            ConnectionHandle::open(&*connector, settings.connection())?.close()
        })?;
        handle.wait()??;

        tracing::debug!(server = %self.settings.connection().host(), "connection verified");
        Ok(())
    }

    // ========================================================================
    // Accessors & lifecycle
    // ========================================================================

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Shut down the underlying pool, draining queued work.
    ///
    /// Affects every facade sharing the pool.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }

    fn command(&self, text: impl Into<String>, parameters: Option<Parameters>) -> Command {
        Command::new(Arc::clone(&self.settings), text, parameters)
    }

    fn submit<I: Interaction>(&self, interaction: I) -> Result<TaskHandle<I::Output>> {
        let connector = Arc::clone(&self.connector);
        self.pool.submit(move || interaction.run(&*connector))
    }
}

impl<K: Connector> std::fmt::Debug for QueryFacade<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryFacade")
            .field("settings", &self.settings)
            .field("pool", &self.pool)
            .finish()
    }
}
