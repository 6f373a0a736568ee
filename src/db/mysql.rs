//! MySQL backend on the blocking `mysql` client.
//!
//! Enabled with the `mysql` cargo feature. Statements keep their `@name`
//! placeholders in the public API; they are translated to the client's
//! `:name` syntax right before execution.

use std::collections::HashMap;

use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, Params};

use crate::common::{ConnectionString, DriverError, DriverResult};

use super::driver::{Connection, Connector, RowSink};
use super::placeholder::to_colon_placeholders;
use super::value::{Parameters, Value};

/// Opens real MySQL connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

impl Connector for MySqlConnector {
    type Connection = MySqlConnection;

    fn connect(&self, target: &ConnectionString) -> DriverResult<MySqlConnection> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(target.host()))
            .tcp_port(target.port())
            .db_name(target.database())
            .user(target.user())
            .pass(target.password());

        let conn = Conn::new(opts).map_err(driver_error)?;
        Ok(MySqlConnection { conn: Some(conn) })
    }
}

/// A live MySQL session. `None` once closed.
pub struct MySqlConnection {
    conn: Option<Conn>,
}

impl MySqlConnection {
    fn conn(&mut self) -> DriverResult<&mut Conn> {
        self.conn
            .as_mut()
            .ok_or_else(|| DriverError::new("connection already closed"))
    }
}

impl Connection for MySqlConnection {
    fn execute(&mut self, sql: &str, params: &Parameters) -> DriverResult<u64> {
        let conn = self.conn()?;
        let (sql, bound) = prepare(sql, params);
        conn.exec_drop(sql, bound).map_err(driver_error)?;
        Ok(conn.affected_rows())
    }

    fn last_insert_id(&self) -> u64 {
        self.conn.as_ref().map_or(0, |c| c.last_insert_id())
    }

    fn query(
        &mut self,
        sql: &str,
        params: &Parameters,
        sink: &mut dyn RowSink,
    ) -> DriverResult<()> {
        let conn = self.conn()?;
        let (sql, bound) = prepare(sql, params);
        let mut result = conn.exec_iter(sql, bound).map_err(driver_error)?;

        let names = result
            .columns()
            .as_ref()
            .iter()
            .map(|column| column.name_str().into_owned())
            .collect();
        sink.columns(names);

        for row in result.by_ref() {
            let row = row.map_err(driver_error)?;
            sink.row(row.unwrap().into_iter().map(from_mysql).collect());
        }
        Ok(())
    }

    fn begin(&mut self) -> DriverResult<()> {
        self.conn()?
            .query_drop("START TRANSACTION")
            .map_err(driver_error)
    }

    fn commit(&mut self) -> DriverResult<()> {
        self.conn()?.query_drop("COMMIT").map_err(driver_error)
    }

    fn rollback(&mut self) -> DriverResult<()> {
        self.conn()?.query_drop("ROLLBACK").map_err(driver_error)
    }

    fn close(&mut self) -> DriverResult<()> {
        // Dropping the client connection sends COM_QUIT.
        drop(self.conn.take());
        Ok(())
    }
}

/// Rewrite placeholders and bind only the parameters the statement uses.
///
/// The client rejects named values for a statement without named
/// placeholders, so a statement that uses none gets `Params::Empty`.
fn prepare(sql: &str, params: &Parameters) -> (String, Params) {
    let rewritten = to_colon_placeholders(sql, params);
    let bound = bind(params, &rewritten.names);
    (rewritten.sql, bound)
}

fn bind(params: &Parameters, names: &[String]) -> Params {
    let named: HashMap<Vec<u8>, mysql::Value> = names
        .iter()
        .filter_map(|name| {
            params
                .get(name)
                .map(|value| (name.as_bytes().to_vec(), to_mysql(value)))
        })
        .collect();

    if named.is_empty() {
        Params::Empty
    } else {
        Params::Named(named)
    }
}

fn to_mysql(value: &Value) -> mysql::Value {
    match value {
        Value::Null => mysql::Value::NULL,
        Value::Int(v) => mysql::Value::Int(*v),
        Value::Float(v) => mysql::Value::Double(*v),
        Value::Text(v) => mysql::Value::Bytes(v.as_bytes().to_vec()),
        Value::Bool(v) => mysql::Value::Int(i64::from(*v)),
        Value::Bytes(v) => mysql::Value::Bytes(v.clone()),
    }
}

fn from_mysql(value: mysql::Value) -> Value {
    match value {
        mysql::Value::NULL => Value::Null,
        mysql::Value::Int(v) => Value::Int(v),
        mysql::Value::UInt(v) => {
            i64::try_from(v).map_or_else(|_| Value::Text(v.to_string()), Value::Int)
        }
        mysql::Value::Float(v) => Value::Float(f64::from(v)),
        mysql::Value::Double(v) => Value::Float(v),
        mysql::Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Value::Text(text),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        mysql::Value::Date(year, month, day, 0, 0, 0, 0) => {
            Value::Text(format!("{:04}-{:02}-{:02}", year, month, day))
        }
        mysql::Value::Date(year, month, day, hour, minute, second, micros) => {
            let mut text = format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            );
            if micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            Value::Text(text)
        }
        mysql::Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let total_hours = days * 24 + u32::from(hours);
            let mut text = format!(
                "{}{:02}:{:02}:{:02}",
                if negative { "-" } else { "" },
                total_hours,
                minutes,
                seconds
            );
            if micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            Value::Text(text)
        }
    }
}

fn driver_error(err: mysql::Error) -> DriverError {
    match err {
        mysql::Error::MySqlError(server) => DriverError::with_code(server.code, server.message),
        other => DriverError::new(other.to_string()),
    }
}
