use crate::common::{DriverResult, Settings};
use crate::db::{Connection, RowSink, Value};

use super::{Command, Interaction, Timings};

/// A query whose answer is the first column of the first row.
///
/// SQL `NULL`, an empty result and a failure all come back as `None`.
#[derive(Debug, Clone)]
pub struct Scalar {
    command: Command,
}

impl Scalar {
    pub fn new(command: Command) -> Self {
        Self { command }
    }
}

impl Interaction for Scalar {
    type Output = Option<Value>;
    const KIND: &'static str = "Scalar";

    fn settings(&self) -> &Settings {
        self.command.settings()
    }

    fn describe(&self) -> String {
        self.command.resolved()
    }

    fn execute<C: Connection>(
        &mut self,
        conn: &mut C,
        _timings: &mut Timings,
    ) -> DriverResult<Option<Value>> {
        let mut sink = FirstCell::default();
        conn.query(self.command.text(), self.command.parameters(), &mut sink)?;
        Ok(sink.value.filter(|value| !value.is_null()))
    }

    fn sentinel(&self) -> Option<Value> {
        None
    }
}

/// Keeps the first cell and ignores the rest of the stream.
#[derive(Default)]
struct FirstCell {
    value: Option<Value>,
    seen_row: bool,
}

impl RowSink for FirstCell {
    fn columns(&mut self, _names: Vec<String>) {}

    fn row(&mut self, values: Vec<Value>) {
        if self.seen_row {
            return;
        }
        self.seen_row = true;
        self.value = values.into_iter().next();
    }
}
