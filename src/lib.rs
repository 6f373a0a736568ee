//! dispatchsql - Blocking MySQL work dispatched onto a least-loaded worker pool.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           dispatchsql                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Query API (facade/)                      │   │
//! │  │   query │ query_scalar │ query_result │ transaction      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │               Scheduler (scheduler/)                     │   │
//! │  │   WorkerPool: one FIFO queue per thread, submit to the   │   │
//! │  │   shortest queue, TaskHandle back to the caller          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │             Interactions (interaction/)                  │   │
//! │  │   NonQuery │ Scalar │ Reader │ Transaction               │   │
//! │  │   open → execute → close → timings / failure report      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Database access (db/)                     │   │
//! │  │   ConnectionHandle + Connector/Connection traits         │   │
//! │  │   MockConnector │ MySqlConnector (feature "mysql")       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Settings, connection strings, identifiers, errors
//! - [`scheduler`] - Worker pool and task handles
//! - [`db`] - Driver seam, values, rows, connection guard
//! - [`interaction`] - The four database operations
//! - [`facade`] - Public query API and loosely typed input conversion
//!
//! # Quick Start
//! ```
//! use dispatchsql::db::mock::{MockConnector, MockResponse};
//! use dispatchsql::{Parameters, QueryFacade, Settings, Value};
//!
//! let connector = MockConnector::new();
//! connector.respond(
//!     "SELECT name FROM users WHERE id = @id",
//!     MockResponse::rows(&["name"], vec![vec![Value::from("alice")]]),
//! );
//!
//! let facade = QueryFacade::new(Settings::new("SERVER=localhost").unwrap(), connector).unwrap();
//! let name = facade
//!     .query_scalar("SELECT name FROM users WHERE id = @id", Some(Parameters::new().with("id", 1)))
//!     .unwrap()
//!     .wait()
//!     .unwrap();
//!
//! assert_eq!(name, Some(Value::from("alice")));
//! ```

pub mod common;
pub mod db;
pub mod error;
pub mod facade;
pub mod interaction;
pub mod scheduler;

// Re-export commonly used items at crate root for convenience
pub use common::{ConnectionString, DriverError, Error, Result, Settings, WorkerId};

pub use db::{Connection, ConnectionHandle, Connector, Parameters, ResultSet, Row, Value};
pub use facade::QueryFacade;
pub use interaction::{Interaction, Timings};
pub use scheduler::{PoolStats, StatsSnapshot, TaskHandle, WorkerPool};

#[cfg(feature = "mysql")]
pub use db::mysql::MySqlConnector;
