use crate::common::config::NON_QUERY_SENTINEL;
use crate::common::{DriverResult, Settings};
use crate::db::Connection;

use super::{Command, Interaction, Timings};

/// A statement executed for its side effects.
///
/// Returns the affected-row count, or the generated key when built in
/// insert-id mode. Failure yields `-1`.
#[derive(Debug, Clone)]
pub struct NonQuery {
    command: Command,
    is_insert: bool,
}

impl NonQuery {
    pub fn new(command: Command, is_insert: bool) -> Self {
        Self { command, is_insert }
    }

    pub fn is_insert(&self) -> bool {
        self.is_insert
    }
}

impl Interaction for NonQuery {
    type Output = i64;
    const KIND: &'static str = "NonQuery";

    fn settings(&self) -> &Settings {
        self.command.settings()
    }

    fn describe(&self) -> String {
        self.command.resolved()
    }

    fn execute<C: Connection>(&mut self, conn: &mut C, _timings: &mut Timings) -> DriverResult<i64> {
        let affected = conn.execute(self.command.text(), self.command.parameters())?;
        let result = if self.is_insert {
            conn.last_insert_id()
        } else {
            affected
        };
        Ok(i64::try_from(result).unwrap_or(i64::MAX))
    }

    fn sentinel(&self) -> i64 {
        NON_QUERY_SENTINEL
    }
}
