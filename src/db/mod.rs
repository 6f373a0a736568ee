//! Database access primitives.
//!
//! Everything an interaction needs to talk to a server, independent of
//! which client library sits underneath.
//!
//! # Components
//! - [`Connector`] / [`Connection`] - The driver seam
//! - [`ConnectionHandle`] - RAII guard that closes its connection exactly once
//! - [`Value`] / [`Parameters`] - Typed parameter and cell values
//! - [`Row`] / [`ResultSet`] - Reader output
//! - [`mock`] - Scripted in-memory driver
//! - `mysql` - Real MySQL backend (cargo feature `mysql`)

mod connection;
mod driver;
pub mod mock;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod placeholder;
mod row;
mod value;

pub use connection::ConnectionHandle;
pub use driver::{Connection, Connector, RowSink};
pub use row::{ResultSet, Row};
pub(crate) use row::ResultSetBuilder;
pub use value::{bare_name, placeholder_token, Parameters, Value};
