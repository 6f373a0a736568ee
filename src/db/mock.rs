//! Scripted in-memory driver.
//!
//! [`MockConnector`] stands in for a MySQL server in tests and benchmarks.
//! Statements are matched by exact text against scripted responses;
//! anything unscripted succeeds with zero affected rows and no result set.
//!
//! Statements run through `execute` count as effects. Outside a
//! transaction they persist immediately; inside one they persist on commit
//! and are discarded on rollback. All clones of a connector share state,
//! so a test can keep one clone and hand another to a facade.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;

use parking_lot::Mutex;

use crate::common::{ConnectionString, DriverError, DriverResult};

use super::driver::{Connection, Connector, RowSink};
use super::value::{Parameters, Value};

/// What a scripted statement does.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    /// Succeeds, touching `rows` rows and reporting `last_insert_id`.
    Affected { rows: u64, last_insert_id: u64 },
    /// Succeeds with a result set.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// Fails with a driver error.
    Fail(DriverError),
}

impl MockResponse {
    pub fn affected(rows: u64) -> Self {
        MockResponse::Affected {
            rows,
            last_insert_id: 0,
        }
    }

    pub fn inserted(rows: u64, last_insert_id: u64) -> Self {
        MockResponse::Affected {
            rows,
            last_insert_id,
        }
    }

    pub fn rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        MockResponse::Rows {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn fail(code: u16, message: &str) -> Self {
        MockResponse::Fail(DriverError::with_code(code, message))
    }
}

#[derive(Default)]
struct MockState {
    responses: HashMap<String, MockResponse>,
    refuse: Option<DriverError>,
    fail_commit: Option<DriverError>,
    delay: Option<Duration>,
    opened: usize,
    closed: usize,
    committed: Vec<String>,
    rolled_back: Vec<String>,
    threads: Vec<ThreadId>,
    bound: Vec<(String, Parameters)>,
}

/// A connector whose connections replay scripted responses.
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for an exact statement text.
    pub fn respond(&self, sql: &str, response: MockResponse) -> &Self {
        self.state.lock().responses.insert(sql.to_string(), response);
        self
    }

    /// Make every subsequent connect attempt fail.
    pub fn refuse_connections(&self, error: DriverError) {
        self.state.lock().refuse = Some(error);
    }

    /// Make every subsequent commit fail.
    pub fn fail_commits(&self, error: DriverError) {
        self.state.lock().fail_commit = Some(error);
    }

    /// Sleep this long inside every statement, simulating a slow server.
    pub fn delay_statements(&self, delay: Duration) {
        self.state.lock().delay = Some(delay);
    }

    /// Connections opened so far.
    pub fn opened(&self) -> usize {
        self.state.lock().opened
    }

    /// Connections closed so far.
    pub fn closed(&self) -> usize {
        self.state.lock().closed
    }

    /// Statements whose effects persisted, in the order they persisted.
    pub fn committed(&self) -> Vec<String> {
        self.state.lock().committed.clone()
    }

    /// Statements discarded by a rollback.
    pub fn rolled_back(&self) -> Vec<String> {
        self.state.lock().rolled_back.clone()
    }

    /// The thread each statement ran on, in execution order.
    pub fn statement_threads(&self) -> Vec<ThreadId> {
        self.state.lock().threads.clone()
    }

    /// Parameters bound for the most recent run of `sql`.
    pub fn bound_parameters(&self, sql: &str) -> Option<Parameters> {
        self.state
            .lock()
            .bound
            .iter()
            .rev()
            .find(|(s, _)| s == sql)
            .map(|(_, p)| p.clone())
    }
}

impl Connector for MockConnector {
    type Connection = MockConnection;

    fn connect(&self, _target: &ConnectionString) -> DriverResult<MockConnection> {
        let mut state = self.state.lock();
        if let Some(error) = &state.refuse {
            return Err(error.clone());
        }
        state.opened += 1;

        Ok(MockConnection {
            state: Arc::clone(&self.state),
            pending: None,
            last_insert_id: 0,
        })
    }
}

/// A connection handed out by [`MockConnector`].
pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
    /// Effects of the open transaction, if any.
    pending: Option<Vec<String>>,
    last_insert_id: u64,
}

impl MockConnection {
    /// Record the call and look up its scripted response.
    fn begin_statement(&self, sql: &str, params: &Parameters) -> Option<MockResponse> {
        let delay = {
            let mut state = self.state.lock();
            state.threads.push(thread::current().id());
            state.bound.push((sql.to_string(), params.clone()));
            state.delay
        };
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        self.state.lock().responses.get(sql).cloned()
    }
}

impl Connection for MockConnection {
    fn execute(&mut self, sql: &str, params: &Parameters) -> DriverResult<u64> {
        let (rows, last_insert_id) = match self.begin_statement(sql, params) {
            Some(MockResponse::Fail(error)) => return Err(error),
            Some(MockResponse::Affected {
                rows,
                last_insert_id,
            }) => (rows, last_insert_id),
            Some(MockResponse::Rows { .. }) | None => (0, 0),
        };

        if last_insert_id != 0 {
            self.last_insert_id = last_insert_id;
        }
        match &mut self.pending {
            Some(pending) => pending.push(sql.to_string()),
            None => self.state.lock().committed.push(sql.to_string()),
        }
        Ok(rows)
    }

    fn last_insert_id(&self) -> u64 {
        self.last_insert_id
    }

    fn query(
        &mut self,
        sql: &str,
        params: &Parameters,
        sink: &mut dyn RowSink,
    ) -> DriverResult<()> {
        match self.begin_statement(sql, params) {
            Some(MockResponse::Fail(error)) => Err(error),
            Some(MockResponse::Rows { columns, rows }) => {
                sink.columns(columns);
                for row in rows {
                    sink.row(row);
                }
                Ok(())
            }
            Some(MockResponse::Affected { .. }) | None => {
                sink.columns(Vec::new());
                Ok(())
            }
        }
    }

    fn begin(&mut self) -> DriverResult<()> {
        self.pending = Some(Vec::new());
        Ok(())
    }

    fn commit(&mut self) -> DriverResult<()> {
        let mut state = self.state.lock();
        if let Some(error) = &state.fail_commit {
            return Err(error.clone());
        }
        if let Some(pending) = self.pending.take() {
            state.committed.extend(pending);
        }
        Ok(())
    }

    fn rollback(&mut self) -> DriverResult<()> {
        if let Some(pending) = self.pending.take() {
            self.state.lock().rolled_back.extend(pending);
        }
        Ok(())
    }

    fn close(&mut self) -> DriverResult<()> {
        self.state.lock().closed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ConnectionString {
        "SERVER=mock".parse().unwrap()
    }

    #[test]
    fn test_unscripted_statement_persists() {
        let connector = MockConnector::new();
        let mut conn = connector.connect(&target()).unwrap();

        assert_eq!(conn.execute("UPDATE t SET x = 1", &Parameters::new()).unwrap(), 0);
        assert_eq!(connector.committed(), vec!["UPDATE t SET x = 1"]);
        assert_eq!(connector.opened(), 1);
    }

    #[test]
    fn test_transaction_effects_wait_for_commit() {
        let connector = MockConnector::new();
        let mut conn = connector.connect(&target()).unwrap();

        conn.begin().unwrap();
        conn.execute("INSERT a", &Parameters::new()).unwrap();
        assert!(connector.committed().is_empty());

        conn.rollback().unwrap();
        assert!(connector.committed().is_empty());
        assert_eq!(connector.rolled_back(), vec!["INSERT a"]);
    }

    #[test]
    fn test_refused_connections() {
        let connector = MockConnector::new();
        connector.refuse_connections(DriverError::new("down"));

        assert!(connector.connect(&target()).is_err());
        assert_eq!(connector.opened(), 0);
    }

    #[test]
    fn test_records_bound_parameters() {
        let connector = MockConnector::new();
        let mut conn = connector.connect(&target()).unwrap();
        let params = Parameters::new().with("id", 9);

        conn.execute("DELETE FROM t WHERE id=@id", &params).unwrap();
        assert_eq!(
            connector.bound_parameters("DELETE FROM t WHERE id=@id"),
            Some(params)
        );
    }
}
