use crate::common::{DriverResult, Settings};
use crate::db::{Connection, ResultSet, ResultSetBuilder};

use super::{Command, Interaction, Timings};

/// A query materialized into a [`ResultSet`].
///
/// Column order follows the statement; SQL `NULL` cells stay
/// [`Value::Null`](crate::Value::Null). Failure yields an empty set.
#[derive(Debug, Clone)]
pub struct Reader {
    command: Command,
}

impl Reader {
    pub fn new(command: Command) -> Self {
        Self { command }
    }
}

impl Interaction for Reader {
    type Output = ResultSet;
    const KIND: &'static str = "Reader";

    fn settings(&self) -> &Settings {
        self.command.settings()
    }

    fn describe(&self) -> String {
        self.command.resolved()
    }

    fn execute<C: Connection>(
        &mut self,
        conn: &mut C,
        timings: &mut Timings,
    ) -> DriverResult<ResultSet> {
        let mut builder = ResultSetBuilder::new();
        conn.query(self.command.text(), self.command.parameters(), &mut builder)?;
        timings.read = Some(
            builder
                .header_at()
                .map(|header| header.elapsed())
                .unwrap_or_default(),
        );
        Ok(builder.finish())
    }

    fn sentinel(&self) -> ResultSet {
        ResultSet::new()
    }
}
