//! Typed values for statement parameters and result cells.

use std::fmt;

use serde::{Serialize, Serializer};

/// A single database value.
///
/// The closed set of types a parameter can carry and a result cell can
/// hold. `Null` is SQL NULL.
///
/// # Example
/// ```
/// use dispatchsql::Value;
///
/// assert_eq!(Value::from(5), Value::Int(5));
/// assert_eq!(Value::from("abc"), Value::Text("abc".into()));
/// assert_eq!(Value::from(None::<i64>), Value::Null);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl Value {
    /// Whether this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            Value::Text(v) => Some(v.as_bytes()),
            _ => None,
        }
    }
}

/// The textual form used when a value is spliced into a logged statement.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Bytes(v) => {
                write!(f, "0x")?;
                for byte in v {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(v) => serializer.serialize_str(v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Bytes(v) => serializer.serialize_bytes(v),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

/// Named statement parameters, in insertion order.
///
/// Keys are stored as the placeholder token that appears in the SQL text.
/// A key given without a sigil gets `@` prepended, so `"id"` and `"@id"`
/// name the same parameter. Inserting an existing key replaces its value
/// in place.
///
/// # Example
/// ```
/// use dispatchsql::{Parameters, Value};
///
/// let params = Parameters::new().with("id", 5).with("@name", "bob");
/// assert_eq!(params.get("@id"), Some(&Value::Int(5)));
/// assert_eq!(params.get("name"), Some(&Value::Text("bob".into())));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, Value)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a parameter.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<Value>) {
        let token = placeholder_token(key.as_ref());
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == token) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((token, value)),
        }
    }

    /// Look up a parameter by key, with or without its sigil.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let token = placeholder_token(key);
        self.entries
            .iter()
            .find(|(k, _)| *k == token)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(placeholder token, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl<K: AsRef<str>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Parameters {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// The placeholder token for a parameter key.
pub fn placeholder_token(key: &str) -> String {
    if key.starts_with('@') || key.starts_with(':') {
        key.to_string()
    } else {
        format!("@{}", key)
    }
}

/// A placeholder token without its sigil (`@id` → `id`).
pub fn bare_name(token: &str) -> &str {
    token.trim_start_matches(&['@', ':'][..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(7u8), Value::Int(7));
        assert_eq!(Value::from(-3i32), Value::Int(-3));
        assert_eq!(Value::from(1.5f64), Value::Float(1.5));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(vec![1u8, 2]), Value::Bytes(vec![1, 2]));
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
        assert_eq!(Value::from(None::<String>), Value::Null);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(4).as_i64(), Some(4));
        assert_eq!(Value::Int(4).as_f64(), Some(4.0));
        assert_eq!(Value::Int(0).as_bool(), Some(false));
        assert_eq!(Value::Text("hi".into()).as_str(), Some("hi"));
        assert_eq!(Value::Null.as_i64(), None);
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(5).to_string(), "5");
        assert_eq!(Value::Text("bob".into()).to_string(), "bob");
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_string(), "0xdead");
        assert_eq!(Value::Null.to_string(), "NULL");
    }

    #[test]
    fn test_serialize_json() {
        let json = serde_json::to_string(&vec![
            Value::Int(1),
            Value::Null,
            Value::Text("a".into()),
            Value::Bool(false),
        ])
        .unwrap();
        assert_eq!(json, r#"[1,null,"a",false]"#);
    }

    #[test]
    fn test_parameters_normalize_keys() {
        let params = Parameters::new().with("id", 1).with("@id", 2).with(":x", 3);
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some(&Value::Int(2)));
        assert_eq!(params.get(":x"), Some(&Value::Int(3)));

        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["@id", ":x"]);
    }

    #[test]
    fn test_parameters_from_array() {
        let params = Parameters::from([("a", 1), ("b", 2)]);
        assert_eq!(params.get("@b"), Some(&Value::Int(2)));
        assert!(!params.is_empty());
        assert!(Parameters::new().is_empty());
    }

    #[test]
    fn test_bare_name() {
        assert_eq!(bare_name("@id"), "id");
        assert_eq!(bare_name(":id"), "id");
        assert_eq!(bare_name("id"), "id");
    }
}
