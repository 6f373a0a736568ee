//! The seam between interactions and a database client library.
//!
//! An interaction only ever talks to a [`Connection`]. Connections come
//! from a [`Connector`], which is shared by every worker thread and must
//! therefore be `Send + Sync`. Each connection, by contrast, lives on one
//! worker for one interaction run.

use crate::common::{ConnectionString, DriverResult};

use super::value::{Parameters, Value};

/// Receives a result set as the driver streams it.
///
/// `columns` is called once, after the statement executed and before the
/// first row. `row` is called per row with values in column order.
pub trait RowSink {
    fn columns(&mut self, names: Vec<String>);
    fn row(&mut self, values: Vec<Value>);
}

/// One open database connection.
pub trait Connection: Send {
    /// Run a statement that returns no rows; returns the affected-row count.
    fn execute(&mut self, sql: &str, params: &Parameters) -> DriverResult<u64>;

    /// Id generated by the most recent insert on this connection.
    fn last_insert_id(&self) -> u64;

    /// Run a statement and stream every row of its result into `sink`.
    ///
    /// Must drain the whole result before returning.
    fn query(&mut self, sql: &str, params: &Parameters, sink: &mut dyn RowSink)
        -> DriverResult<()>;

    fn begin(&mut self) -> DriverResult<()>;

    fn commit(&mut self) -> DriverResult<()>;

    fn rollback(&mut self) -> DriverResult<()>;

    /// Close the connection. Called exactly once by [`ConnectionHandle`](super::ConnectionHandle).
    fn close(&mut self) -> DriverResult<()>;
}

/// Opens connections.
pub trait Connector: Send + Sync + 'static {
    type Connection: Connection;

    fn connect(&self, target: &ConnectionString) -> DriverResult<Self::Connection>;
}
