//! Result rows and result sets.

use std::ops::Index;
use std::sync::Arc;
use std::time::Instant;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::driver::RowSink;
use super::value::Value;

/// One result row: column name → value, in result-set column order.
///
/// All rows of a result set share one column list.
///
/// # Example
/// ```ignore
/// let rows = facade.query_result("SELECT 1 AS a, NULL AS b", None)?.wait()?;
/// let row = &rows[0];
/// assert_eq!(row.columns(), ["a", "b"]);
/// assert_eq!(row.get("a"), Some(&Value::Int(1)));
/// assert!(row.get("b").unwrap().is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row. Missing trailing values are NULL, extras are dropped.
    pub fn new(columns: Arc<[String]>, mut values: Vec<Value>) -> Self {
        values.resize(columns.len(), Value::Null);
        Self { columns, values }
    }

    /// Column names in result-set order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Value of the named column, `None` if the column doesn't exist.
    ///
    /// The first column wins if a name repeats.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Value at a column index.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

// Serialized as a map so column order survives into JSON.
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// The rows a reader produced, in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl Index<usize> for ResultSet {
    type Output = Row;

    fn index(&self, index: usize) -> &Row {
        &self.rows[index]
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl FromIterator<Row> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

/// Collects streamed rows into a [`ResultSet`].
///
/// Remembers when the column header arrived, which is where statement
/// execution ends and reading begins.
pub(crate) struct ResultSetBuilder {
    columns: Arc<[String]>,
    rows: Vec<Row>,
    header_at: Option<Instant>,
}

impl ResultSetBuilder {
    pub(crate) fn new() -> Self {
        Self {
            columns: Arc::from(Vec::new()),
            rows: Vec::new(),
            header_at: None,
        }
    }

    /// When the driver reported the columns, if it did.
    pub(crate) fn header_at(&self) -> Option<Instant> {
        self.header_at
    }

    pub(crate) fn finish(self) -> ResultSet {
        ResultSet { rows: self.rows }
    }
}

impl RowSink for ResultSetBuilder {
    fn columns(&mut self, names: Vec<String>) {
        self.header_at.get_or_insert_with(Instant::now);
        self.columns = Arc::from(names);
    }

    fn row(&mut self, values: Vec<Value>) {
        self.rows.push(Row::new(Arc::clone(&self.columns), values));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Arc<[String]> {
        names.iter().map(|s| s.to_string()).collect::<Vec<_>>().into()
    }

    #[test]
    fn test_row_lookup() {
        let row = Row::new(columns(&["a", "b"]), vec![Value::Int(1), Value::Null]);

        assert_eq!(row.columns(), ["a".to_string(), "b".to_string()]);
        assert_eq!(row.get("a"), Some(&Value::Int(1)));
        assert_eq!(row.get("b"), Some(&Value::Null));
        assert_eq!(row.get("c"), None);
        assert_eq!(row.get_index(1), Some(&Value::Null));
    }

    #[test]
    fn test_row_pads_missing_values() {
        let row = Row::new(columns(&["a", "b", "c"]), vec![Value::Int(1)]);
        assert_eq!(row.len(), 3);
        assert!(row.get("c").unwrap().is_null());
    }

    #[test]
    fn test_row_serializes_in_column_order() {
        let row = Row::new(
            columns(&["z", "a"]),
            vec![Value::Text("last".into()), Value::Int(2)],
        );
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"z":"last","a":2}"#);
    }

    #[test]
    fn test_builder_collects_rows() {
        let mut builder = ResultSetBuilder::new();
        assert!(builder.header_at().is_none());

        builder.columns(vec!["id".into()]);
        builder.row(vec![Value::Int(1)]);
        builder.row(vec![Value::Int(2)]);
        assert!(builder.header_at().is_some());

        let set = builder.finish();
        assert_eq!(set.len(), 2);
        assert_eq!(set[1].get("id"), Some(&Value::Int(2)));
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"[{"id":1},{"id":2}]"#
        );
    }
}
