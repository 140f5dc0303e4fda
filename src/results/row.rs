use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::ColumnValue;

/// Column names of one statement execution, shared by every row it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    names: Vec<String>,
    // Later duplicates win, matching how a name-keyed row overwrites earlier slots.
    index: HashMap<String, usize>,
}

impl Columns {
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Self { names, index }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Whether slot `idx` is the one its name resolves to.
    fn is_winner(&self, idx: usize) -> bool {
        self.names
            .get(idx)
            .is_some_and(|name| self.position(name) == Some(idx))
    }
}

/// One materialized result row: an ordered mapping from column name to value.
///
/// NULL columns have no entry, so [`Row::get`] returns `None` for them just as
/// it does for unknown names.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Columns>,
    values: Vec<Option<ColumnValue>>,
}

impl Row {
    #[must_use]
    pub fn new(columns: Arc<Columns>, values: Vec<Option<ColumnValue>>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.columns
            .position(column)
            .and_then(|idx| self.get_by_index(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&ColumnValue> {
        self.values.get(index).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Column names of the producing statement, including NULL columns.
    #[must_use]
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Non-null entries in column order. A repeated name yields only its last slot.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnValue)> {
        self.columns
            .names()
            .iter()
            .zip(&self.values)
            .enumerate()
            .filter(|(idx, _)| self.columns.is_winner(*idx))
            .filter_map(|(_, (name, value))| value.as_ref().map(|value| (name.as_str(), value)))
    }

    /// Number of non-null entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        let columns = Arc::new(Columns::new(vec!["id".into(), "note".into(), "score".into()]));
        Row::new(
            columns,
            vec![
                Some(ColumnValue::Integer(1)),
                None,
                Some(ColumnValue::Float(0.5)),
            ],
        )
    }

    #[test]
    fn null_columns_are_absent() {
        let row = sample();
        assert_eq!(row.get("id"), Some(&ColumnValue::Integer(1)));
        assert!(!row.contains("note"));
        assert_eq!(row.len(), 2);
        assert_eq!(row.columns().len(), 3);
    }

    #[test]
    fn iteration_keeps_column_order() {
        let names: Vec<_> = sample().iter().map(|(name, _)| name.to_owned()).collect();
        assert_eq!(names, vec!["id", "score"]);
    }

    #[test]
    fn serializes_as_json_object() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"{"id":1,"score":0.5}"#);
    }

    #[test]
    fn repeated_name_keeps_last_slot() {
        let columns = Arc::new(Columns::new(vec!["a".into(), "a".into()]));
        let row = Row::new(
            Arc::clone(&columns),
            vec![Some(ColumnValue::Integer(1)), Some(ColumnValue::Integer(2))],
        );
        assert_eq!(row.get("a"), Some(&ColumnValue::Integer(2)));
        assert_eq!(row.len(), 1);
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"a":2}"#);

        let row = Row::new(columns, vec![Some(ColumnValue::Integer(1)), None]);
        assert_eq!(row.get("a"), None);
        assert!(row.is_empty());
        assert_eq!(serde_json::to_string(&row).unwrap(), "{}");
    }
}
