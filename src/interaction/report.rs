//! Log lines emitted by interactions.

use crate::common::DriverError;
use crate::db::Parameters;

use super::Timings;

/// Splice parameter values into statement text for display.
///
/// Plain find/replace of each placeholder token, in parameter insertion
/// order. It does not escape or quote anything, and a token that is a
/// prefix of another (`@id` vs `@identity`) or a value whose text contains
/// another token will be substituted naively. Never used for execution.
///
/// # Example
/// ```
/// use dispatchsql::interaction::report::resolve_statement;
/// use dispatchsql::Parameters;
///
/// let text = resolve_statement("SELECT * FROM t WHERE id=@id", &Parameters::new().with("id", 5));
/// assert_eq!(text, "SELECT * FROM t WHERE id=5");
/// ```
pub fn resolve_statement(command: &str, parameters: &Parameters) -> String {
    let mut text = command.to_string();
    for (token, value) in parameters.iter() {
        text = text.replace(token, &value.to_string());
    }
    text
}

/// Report a failed operation.
///
/// With debug on, the line also carries the server error code and the
/// resolved statement.
pub(crate) fn failure(
    kind: &str,
    error: &DriverError,
    debug: bool,
    statement: impl FnOnce() -> String,
) {
    if debug {
        tracing::error!(
            code = ?error.code,
            statement = %statement(),
            "[Failed {}] {}",
            kind,
            error.message
        );
    } else {
        tracing::error!("[Failed {}] {}", kind, error);
    }
}

/// Report how long each phase of an interaction took.
pub(crate) fn timing(timings: &Timings, statement: &str) {
    tracing::info!("[{}] {}", timings, statement);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tracing_test::traced_test;

    #[test]
    fn test_resolve_replaces_every_occurrence() {
        let params = Parameters::new().with("id", 5).with("name", "bob");
        assert_eq!(
            resolve_statement("UPDATE t SET name=@name WHERE id=@id OR parent=@id", &params),
            "UPDATE t SET name=bob WHERE id=5 OR parent=5"
        );
    }

    #[test]
    fn test_resolve_is_naive_about_prefixes() {
        let params = Parameters::new().with("id", 5);
        assert_eq!(
            resolve_statement("SELECT @identity, @id", &params),
            "SELECT 5entity, 5"
        );
    }

    #[test]
    fn test_resolve_follows_insertion_order() {
        // The first value introduces a token that the second pass then replaces.
        let params = Parameters::new().with("a", "@b").with("b", 2);
        assert_eq!(resolve_statement("x=@a", &params), "x=2");
    }

    proptest! {
        #[test]
        fn prop_resolve_removes_plain_tokens(id in any::<i64>(), name in "[a-z]{1,8}") {
            let params = Parameters::new().with("id", id).with("label", name.clone());
            let text = resolve_statement("SELECT * FROM t WHERE id=@id AND label='@label'", &params);
            prop_assert!(!text.contains('@'));
            let expected_id = format!("id={}", id);
            let expected_label = format!("'{}'", name);
            prop_assert!(text.contains(&expected_id));
            prop_assert!(text.contains(&expected_label));
        }
    }

    #[traced_test]
    #[test]
    fn test_failure_line_is_terse_without_debug() {
        failure(
            "NonQuery",
            &DriverError::with_code(1062, "Duplicate entry"),
            false,
            || "INSERT secret".to_string(),
        );

        assert!(logs_contain("[Failed NonQuery] #1062 Duplicate entry"));
        assert!(!logs_contain("INSERT secret"));
    }

    #[traced_test]
    #[test]
    fn test_failure_line_is_verbose_with_debug() {
        failure(
            "Scalar",
            &DriverError::with_code(1146, "Table 'x' doesn't exist"),
            true,
            || "SELECT * FROM x".to_string(),
        );

        assert!(logs_contain("[Failed Scalar]"));
        assert!(logs_contain("SELECT * FROM x"));
        assert!(logs_contain("1146"));
    }
}
