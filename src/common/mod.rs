//! Common types and utilities shared across dispatchsql.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Settings and configuration constants
//! - Connection string parsing
//! - Error types
//! - Identifiers (WorkerId)

pub mod config;
pub mod connection_string;
mod worker_id;

pub use crate::error::{DriverError, DriverResult, Error, Result};
pub use config::Settings;
pub use connection_string::ConnectionString;
pub use worker_id::WorkerId;
