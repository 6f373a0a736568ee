//! Integration tests for the query facade.
//!
//! These drive the full path (facade → pool → interaction → driver)
//! against the scripted in-memory connector.

use dispatchsql::common::DriverError;
use dispatchsql::db::mock::{MockConnector, MockResponse};
use dispatchsql::facade::input::{commands_from_json, parameters_from_json};
use dispatchsql::{Error, Parameters, QueryFacade, Settings, Value};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn create_facade(connector: &MockConnector, threads: usize) -> QueryFacade<MockConnector> {
    let settings = Settings::new("SERVER=mock;DATABASE=game;UID=app;PASSWORD=secret")
        .unwrap()
        .with_thread_limit(threads);
    QueryFacade::new(settings, connector.clone()).unwrap()
}

// ============================================================================
// NonQuery
// ============================================================================

/// Affected-row count by default, generated key in insert mode.
#[test]
fn test_non_query_modes() {
    let connector = MockConnector::new();
    connector
        .respond("UPDATE t SET x=1", MockResponse::affected(4))
        .respond("INSERT INTO t (x) VALUES (@x)", MockResponse::inserted(1, 981));
    let facade = create_facade(&connector, 2);

    let updated = facade.query("UPDATE t SET x=1", None, false).unwrap();
    let inserted = facade
        .query(
            "INSERT INTO t (x) VALUES (@x)",
            Some(Parameters::new().with("x", 1)),
            true,
        )
        .unwrap();

    assert_eq!(updated.wait().unwrap(), 4);
    assert_eq!(inserted.wait().unwrap(), 981);
}

/// Driver failures resolve to the sentinel, not to an error.
#[test]
fn test_non_query_failure_is_minus_one() {
    let connector = MockConnector::new();
    connector.respond("INSERT dup", MockResponse::fail(1062, "Duplicate entry"));
    let facade = create_facade(&connector, 1);

    assert_eq!(facade.query("INSERT dup", None, false).unwrap().wait().unwrap(), -1);
}

// ============================================================================
// Scalar & Reader
// ============================================================================

/// SQL NULL comes back as `None`, never as the text "NULL".
#[test]
fn test_scalar_null_is_none() {
    let connector = MockConnector::new();
    connector.respond("SELECT NULL", MockResponse::rows(&["NULL"], vec![vec![Value::Null]]));
    connector.respond(
        "SELECT COUNT(*) FROM t",
        MockResponse::rows(&["COUNT(*)"], vec![vec![Value::Int(12)]]),
    );
    let facade = create_facade(&connector, 2);

    assert_eq!(facade.query_scalar("SELECT NULL", None).unwrap().wait().unwrap(), None);
    assert_eq!(
        facade.query_scalar("SELECT COUNT(*) FROM t", None).unwrap().wait().unwrap(),
        Some(Value::Int(12))
    );
}

/// Rows keep the statement's column order and NULL cells.
#[test]
fn test_reader_shape() {
    let connector = MockConnector::new();
    connector.respond(
        "SELECT 1 AS a, NULL AS b",
        MockResponse::rows(&["a", "b"], vec![vec![Value::Int(1), Value::Null]]),
    );
    let facade = create_facade(&connector, 2);

    let rows = facade
        .query_result("SELECT 1 AS a, NULL AS b", None)
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].columns(), ["a".to_string(), "b".to_string()]);
    assert_eq!(rows[0].get("a"), Some(&Value::Int(1)));
    assert!(rows[0].get("b").unwrap().is_null());
    assert_eq!(serde_json::to_value(&rows).unwrap(), json!([{ "a": 1, "b": null }]));
}

// ============================================================================
// Transaction
// ============================================================================

/// [ok, fail] persists nothing and resolves to false.
#[test]
fn test_transaction_rolls_back_on_failure() {
    let connector = MockConnector::new();
    connector.respond("INSERT b", MockResponse::fail(1452, "foreign key constraint fails"));
    let facade = create_facade(&connector, 2);

    let ok = facade.transaction(["INSERT a", "INSERT b"], None).unwrap().wait().unwrap();

    assert!(!ok);
    assert!(connector.committed().is_empty());
    assert_eq!(connector.rolled_back(), vec!["INSERT a"]);
}

/// [ok, ok] persists both and resolves to true.
#[test]
fn test_transaction_commits_all() {
    let connector = MockConnector::new();
    let facade = create_facade(&connector, 2);

    let params = Parameters::new().with("id", 3);
    let ok = facade
        .transaction(
            vec!["DELETE FROM a WHERE id=@id".to_string(), "DELETE FROM b WHERE id=@id".to_string()],
            Some(params.clone()),
        )
        .unwrap()
        .wait()
        .unwrap();

    assert!(ok);
    assert_eq!(
        connector.committed(),
        vec!["DELETE FROM a WHERE id=@id", "DELETE FROM b WHERE id=@id"]
    );
    assert_eq!(connector.bound_parameters("DELETE FROM b WHERE id=@id"), Some(params));
}

// ============================================================================
// Connections & threading
// ============================================================================

/// Every operation opens and closes its own connection, even on failure.
#[test]
fn test_connection_per_operation() {
    let connector = MockConnector::new();
    connector.respond("BROKEN", MockResponse::fail(1064, "syntax error"));
    let facade = create_facade(&connector, 3);

    let handles = vec![
        facade.query("UPDATE t SET x=1", None, false).unwrap(),
        facade.query("BROKEN", None, false).unwrap(),
        facade.query("UPDATE t SET x=2", None, false).unwrap(),
    ];
    for handle in handles {
        handle.wait().unwrap();
    }
    assert!(facade.query_result("BROKEN", None).unwrap().wait().unwrap().is_empty());

    assert_eq!(connector.opened(), 4);
    assert_eq!(connector.closed(), 4);
}

/// A refused connection yields every variant's sentinel.
#[test]
fn test_refused_connection_sentinels() {
    let connector = MockConnector::new();
    connector.refuse_connections(DriverError::with_code(2003, "Can't connect to MySQL server"));
    let facade = create_facade(&connector, 2);

    assert_eq!(facade.query("UPDATE t SET x=1", None, false).unwrap().wait().unwrap(), -1);
    assert_eq!(facade.query_scalar("SELECT 1", None).unwrap().wait().unwrap(), None);
    assert!(facade.query_result("SELECT 1", None).unwrap().wait().unwrap().is_empty());
    assert!(!facade.transaction(["INSERT a"], None).unwrap().wait().unwrap());
    assert!(matches!(facade.verify_connection(), Err(Error::Driver(_))));
}

/// Statements run on pool threads, and slow ones overlap across workers.
#[test]
fn test_statements_run_off_the_caller_thread() {
    let connector = MockConnector::new();
    connector.delay_statements(Duration::from_millis(20));
    let facade = create_facade(&connector, 4);

    let handles: Vec<_> = (0..8)
        .map(|i| facade.query(format!("UPDATE t SET x={}", i), None, false).unwrap())
        .collect();
    for handle in handles {
        assert_eq!(handle.wait().unwrap(), 0);
    }

    let threads: HashSet<_> = connector.statement_threads().into_iter().collect();
    assert!(!threads.contains(&thread::current().id()));
    assert!(threads.len() > 1);
}

/// Facades built on one pool share its workers and its shutdown.
#[test]
fn test_shared_pool_shutdown() {
    let connector = MockConnector::new();
    let first = create_facade(&connector, 2);
    let second = QueryFacade::with_pool(
        Settings::new("SERVER=other").unwrap().with_debug(true),
        connector.clone(),
        Arc::clone(first.pool()),
    );

    assert_eq!(second.query("UPDATE t SET x=1", None, false).unwrap().wait().unwrap(), 0);
    first.shutdown();
    assert!(matches!(
        second.query("UPDATE t SET x=1", None, false),
        Err(Error::SchedulerClosed)
    ));
}

// ============================================================================
// Loosely typed input
// ============================================================================

/// JSON input flows through the same path as typed input.
#[test]
fn test_json_input() {
    let connector = MockConnector::new();
    let facade = create_facade(&connector, 2);

    let params = parameters_from_json(&json!({ "id": 5, "name": "bob" }));
    let commands = commands_from_json(&json!([
        "UPDATE users SET name=@name WHERE id=@id",
        "INSERT INTO audit (user) VALUES (@id)"
    ]))
    .unwrap();

    assert!(facade.transaction(commands, params).unwrap().wait().unwrap());
    assert_eq!(
        connector
            .bound_parameters("INSERT INTO audit (user) VALUES (@id)")
            .and_then(|p| p.get("id").cloned()),
        Some(Value::Int(5))
    );

    // A malformed map degrades to "no parameters"; the statement still runs.
    let dropped = parameters_from_json(&json!({ "id": [1, 2] }));
    assert_eq!(dropped, None);
    assert_eq!(facade.query("DELETE FROM t", dropped, false).unwrap().wait().unwrap(), 0);

    assert!(matches!(
        commands_from_json(&json!({ "not": "a list" })),
        Err(Error::InvalidCommands(_))
    ));
}
