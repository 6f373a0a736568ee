//! RAII ownership of one live connection.
//!
//! A [`ConnectionHandle`] is opened at the start of an interaction run and
//! closed when the run ends, whichever way it ends: normal return, driver
//! error, early return, or a panic unwinding through the worker.

use std::ops::{Deref, DerefMut};

use crate::common::{ConnectionString, DriverResult};

use super::driver::{Connection, Connector};

/// Scoped owner of exactly one connection.
///
/// The connection is closed exactly once, either by [`close`](Self::close)
/// (which reports the driver's answer) or on drop (which only logs it).
///
/// # Example
/// ```ignore
/// let mut handle = ConnectionHandle::open(&connector, settings.connection())?;
/// let affected = handle.execute("DELETE FROM sessions", &Parameters::new())?;
/// handle.close()?;
/// ```
pub struct ConnectionHandle<C: Connection> {
    /// The live connection.
    conn: C,
    /// Set once `Connection::close` has been called.
    closed: bool,
}

impl<C: Connection> ConnectionHandle<C> {
    /// Open a fresh connection to `target`.
    ///
    /// Nothing is reused between calls: every handle is one connect round
    /// trip.
    pub fn open<K>(connector: &K, target: &ConnectionString) -> DriverResult<Self>
    where
        K: Connector<Connection = C>,
    {
        let conn = connector.connect(target)?;
        Ok(Self {
            conn,
            closed: false,
        })
    }

    /// Close the connection and report the result.
    pub fn close(mut self) -> DriverResult<()> {
        self.release()
    }

    fn release(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.conn.close()
    }
}

impl<C: Connection> Deref for ConnectionHandle<C> {
    type Target = C;

    #[inline]
    fn deref(&self) -> &C {
        &self.conn
    }
}

impl<C: Connection> DerefMut for ConnectionHandle<C> {
    #[inline]
    fn deref_mut(&mut self) -> &mut C {
        &mut self.conn
    }
}

impl<C: Connection> Drop for ConnectionHandle<C> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "failed to close connection");
        }
    }
}
