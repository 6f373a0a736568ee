//! Runtime settings and configuration constants for dispatchsql.

use super::connection_string::ConnectionString;
use crate::common::{Error, Result};

/// Default MySQL server port.
pub const DEFAULT_PORT: u16 = 3306;

/// Name prefix for worker threads (`dispatchsql-worker-0`, ...).
pub const WORKER_THREAD_PREFIX: &str = "dispatchsql-worker";

/// Result of a failed non-query.
pub const NON_QUERY_SENTINEL: i64 = -1;

/// Number of worker threads to use for a given core count.
///
/// Leaves one core to the host when there are more than two:
///
/// | cores | workers |
/// |-------|---------|
/// | 0, 1  | 1       |
/// | 2     | 2       |
/// | n > 2 | n - 1   |
pub fn worker_count_for(cores: usize) -> usize {
    if cores > 2 {
        cores - 1
    } else if cores > 1 {
        cores
    } else {
        1
    }
}

/// Number of worker threads for this machine.
pub fn default_worker_count() -> usize {
    worker_count_for(num_cpus::get())
}

/// Immutable settings captured when a facade is built.
///
/// There are no setters. To change anything, build a new `Settings` and a
/// new facade around it; components that already hold an `Arc<Settings>`
/// keep seeing the old values.
///
/// # Example
/// ```
/// use dispatchsql::Settings;
///
/// let settings = Settings::new("SERVER=localhost;DATABASE=app;UID=root;PASSWORD=secret")
///     .unwrap()
///     .with_debug(true)
///     .with_thread_limit(4);
///
/// assert!(settings.debug());
/// assert_eq!(settings.worker_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    connection: ConnectionString,
    debug: bool,
    thread_limit: usize,
}

impl Settings {
    /// Parse a connection string into settings with debug off and the
    /// thread count derived from the machine.
    ///
    /// # Errors
    /// - `Error::InvalidConnectionString` if the string is malformed
    pub fn new(connection_string: &str) -> Result<Self> {
        Ok(Self::from_connection(connection_string.parse()?))
    }

    /// Wrap an already parsed connection string.
    pub fn from_connection(connection: ConnectionString) -> Self {
        Self {
            connection,
            debug: false,
            thread_limit: 0,
        }
    }

    /// Build settings from discrete server fields.
    ///
    /// Produces `SERVER=..;PORT=..;DATABASE=..;UID=..;PASSWORD=..`, the form
    /// host configuration files resolve to.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if a field contains `;`, which would split
    ///   the connection string
    /// - `Error::InvalidConnectionString` if `server` is empty
    pub fn from_parts(
        server: &str,
        port: u16,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<Self> {
        let fields = [
            ("server", server),
            ("database", database),
            ("user", user),
            ("password", password),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.contains(';')) {
            return Err(Error::InvalidConfig(format!("{} must not contain ';'", name)));
        }

        Self::new(&format!(
            "SERVER={};PORT={};DATABASE={};UID={};PASSWORD={}",
            server, port, database, user, password
        ))
    }

    /// Enable or disable debug output (timing lines, verbose failures).
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Fix the number of worker threads. `0` derives it from the CPU count.
    pub fn with_thread_limit(mut self, thread_limit: usize) -> Self {
        self.thread_limit = thread_limit;
        self
    }

    /// The parsed connection target.
    pub fn connection(&self) -> &ConnectionString {
        &self.connection
    }

    /// Whether debug output is enabled.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// The configured thread limit (`0` = derive).
    pub fn thread_limit(&self) -> usize {
        self.thread_limit
    }

    /// The worker thread count these settings resolve to.
    pub fn worker_count(&self) -> usize {
        if self.thread_limit == 0 {
            default_worker_count()
        } else {
            self.thread_limit
        }
    }
}
