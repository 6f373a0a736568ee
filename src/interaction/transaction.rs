use std::sync::Arc;

use crate::common::{DriverResult, Settings};
use crate::db::{Connection, Parameters};

use super::report::resolve_statement;
use super::{Interaction, Timings};

/// Several statements applied atomically on one connection.
///
/// Every statement shares the same parameter map. The result is `true`
/// only if all of them succeeded and the commit went through; on any
/// failure the transaction is rolled back and the result is `false`.
/// An empty command list commits nothing and reports `true`.
#[derive(Debug, Clone)]
pub struct Transaction {
    settings: Arc<Settings>,
    commands: Vec<String>,
    parameters: Parameters,
}

impl Transaction {
    pub fn new(settings: Arc<Settings>, commands: Vec<String>, parameters: Option<Parameters>) -> Self {
        Self {
            settings,
            commands,
            parameters: parameters.unwrap_or_default(),
        }
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl Interaction for Transaction {
    type Output = bool;
    const KIND: &'static str = "Transaction";

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn describe(&self) -> String {
        self.commands
            .iter()
            .map(|command| resolve_statement(command, &self.parameters))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn execute<C: Connection>(&mut self, conn: &mut C, _timings: &mut Timings) -> DriverResult<bool> {
        conn.begin()?;

        for command in &self.commands {
            if let Err(error) = conn.execute(command, &self.parameters) {
                roll_back(conn);
                return Err(error);
            }
        }

        if let Err(error) = conn.commit() {
            roll_back(conn);
            return Err(error);
        }
        Ok(true)
    }

    fn sentinel(&self) -> bool {
        false
    }
}

fn roll_back<C: Connection>(conn: &mut C) {
    if let Err(error) = conn.rollback() {
        tracing::warn!(error = %error, "rollback failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::DriverError;
    use crate::db::mock::{MockConnector, MockResponse};

    fn transaction(commands: &[&str]) -> Transaction {
        let settings = Arc::new(Settings::new("SERVER=mock").unwrap());
        Transaction::new(
            settings,
            commands.iter().map(|c| c.to_string()).collect(),
            Some(Parameters::new().with("id", 7)),
        )
    }

    #[test]
    fn test_all_succeed_commits() {
        let connector = MockConnector::new();

        assert!(transaction(&["INSERT a", "INSERT b"]).run(&connector));
        assert_eq!(connector.committed(), vec!["INSERT a", "INSERT b"]);
    }

    #[test]
    fn test_failure_rolls_back_everything() {
        let connector = MockConnector::new();
        connector.respond("INSERT b", MockResponse::fail(1062, "Duplicate entry"));

        assert!(!transaction(&["INSERT a", "INSERT b", "INSERT c"]).run(&connector));
        assert!(connector.committed().is_empty());
        assert_eq!(connector.rolled_back(), vec!["INSERT a"]);
        assert_eq!(connector.closed(), 1);
    }

    #[test]
    fn test_commit_failure_is_false() {
        let connector = MockConnector::new();
        connector.fail_commits(DriverError::new("lock wait timeout"));

        assert!(!transaction(&["INSERT a"]).run(&connector));
        assert!(connector.committed().is_empty());
    }

    #[test]
    fn test_empty_transaction_commits() {
        let connector = MockConnector::new();

        assert!(transaction(&[]).run(&connector));
        assert!(connector.committed().is_empty());
    }

    #[test]
    fn test_statements_share_parameters() {
        let connector = MockConnector::new();

        assert!(transaction(&["DELETE FROM a WHERE id=@id", "DELETE FROM b WHERE id=@id"]).run(&connector));
        assert_eq!(
            connector.bound_parameters("DELETE FROM b WHERE id=@id"),
            Some(Parameters::new().with("id", 7))
        );
    }

    #[test]
    fn test_describe_joins_resolved_statements() {
        let op = transaction(&["UPDATE a SET x=@id", "UPDATE b SET y=@id"]);
        assert_eq!(op.describe(), "UPDATE a SET x=7; UPDATE b SET y=7");
    }
}
