//! Conversion of loosely typed input into typed parameters and commands.
//!
//! Hosts that receive statements from a scripting runtime usually get JSON.
//! Parameter maps are forgiving: anything malformed is logged and treated
//! as "no parameters", so the statement still runs. Transaction command
//! lists are strict, since running the wrong set of statements atomically
//! is worse than not running them.

use serde_json::Value as Json;

use crate::common::{Error, Result};
use crate::db::{Parameters, Value};

/// Convert a JSON object into [`Parameters`].
///
/// Keys may be given with or without their `@` sigil. Scalars map to the
/// matching [`Value`]; nested arrays or objects are rejected. `null`
/// means no parameters and is not logged. Keys keep the order they have
/// in the input object.
///
/// # Example
/// ```
/// use dispatchsql::facade::input::parameters_from_json;
/// use dispatchsql::Value;
///
/// let params = parameters_from_json(&serde_json::json!({ "id": 5, "@name": "bob" })).unwrap();
/// assert_eq!(params.get("@id"), Some(&Value::Int(5)));
/// assert_eq!(params.get("name"), Some(&Value::from("bob")));
/// ```
pub fn parameters_from_json(input: &Json) -> Option<Parameters> {
    let map = match input {
        Json::Null => return None,
        Json::Object(map) => map,
        other => {
            tracing::warn!(
                kind = json_kind(other),
                "parameters must be an object; running without parameters"
            );
            return None;
        }
    };

    let mut params = Parameters::new();
    for (key, raw) in map {
        match value_from_json(raw) {
            Some(value) => params.insert(key, value),
            None => {
                tracing::warn!(
                    parameter = %key,
                    kind = json_kind(raw),
                    "unsupported parameter value; running without parameters"
                );
                return None;
            }
        }
    }
    Some(params)
}

/// Convert a JSON array of strings into transaction commands.
///
/// # Errors
/// - `Error::InvalidCommands` if `input` is not an array or any element is
///   not a string
pub fn commands_from_json(input: &Json) -> Result<Vec<String>> {
    let items = input.as_array().ok_or_else(|| {
        Error::InvalidCommands(format!("expected an array, got {}", json_kind(input)))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                Error::InvalidCommands(format!(
                    "command {} is {}, not a string",
                    index,
                    json_kind(item)
                ))
            })
        })
        .collect()
}

fn value_from_json(raw: &Json) -> Option<Value> {
    match raw {
        Json::Null => Some(Value::Null),
        Json::Bool(b) => Some(Value::Bool(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float)),
        Json::String(s) => Some(Value::Text(s.clone())),
        Json::Array(_) | Json::Object(_) => None,
    }
}

fn json_kind(raw: &Json) -> &'static str {
    match raw {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}
