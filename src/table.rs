//! In-memory tabular schema and row lifecycle.
//!
//! A [`Table`] is an ordered set of [`Column`]s plus zero or more [`Row`]s.
//! Column order is stable and drives the order in which SQL clauses and
//! parameters are emitted. Rows track a lifecycle state and, once modified or
//! deleted, an original-value snapshot that feeds the optimistic-lock
//! predicate.

use crate::types::{SemanticType, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Semantic type of the column's values
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,

    /// Whether the database generates this column's value (identity column)
    #[serde(default)]
    pub auto_generated: bool,

    /// Whether this column is part of the primary key
    #[serde(default)]
    pub primary_key: bool,
}

impl Column {
    /// Create a new plain column.
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            auto_generated: false,
            primary_key: false,
        }
    }

    /// Create a primary-key column.
    pub fn primary_key(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            auto_generated: false,
            primary_key: true,
        }
    }

    /// Create an auto-generated primary-key column (identity column).
    pub fn auto_key(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            auto_generated: true,
            primary_key: true,
        }
    }
}

/// Lifecycle state of a row since it was attached to its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    /// Row matches the database (fetched or accepted)
    Unchanged,
    /// Row exists only in memory and must be inserted
    Added,
    /// Row was changed in memory and must be updated
    Modified,
    /// Row was deleted in memory and must be deleted in the database
    Deleted,
}

/// A single row of a table.
///
/// Values are keyed by column name; a missing binding reads as `Value::Null`.
/// The original snapshot is taken on the first modification or deletion of an
/// `Unchanged` row and is what the optimistic-lock predicate binds against.
#[derive(Debug, Clone)]
pub struct Row {
    values: HashMap<String, Value>,
    original: Option<HashMap<String, Value>>,
    state: RowState,
}

impl Row {
    fn new(values: HashMap<String, Value>, state: RowState) -> Self {
        Self {
            values,
            original: None,
            state,
        }
    }

    /// Current value of a column, `Null` if unbound.
    pub fn value(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&Value::Null)
    }

    /// Original (pre-modification) value of a column.
    ///
    /// Falls back to the current value when no snapshot exists, which is the
    /// case for rows that were never modified.
    pub fn original_value(&self, column: &str) -> &Value {
        match &self.original {
            Some(snapshot) => snapshot.get(column).unwrap_or(&Value::Null),
            None => self.value(column),
        }
    }

    /// Lifecycle state of this row.
    pub fn state(&self) -> RowState {
        self.state
    }

    fn snapshot_originals(&mut self) {
        if self.original.is_none() {
            self.original = Some(self.values.clone());
        }
    }
}

/// An in-memory table: named, ordered columns plus rows.
#[derive(Debug, Clone, Default)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Create a table with a declared column schema.
    pub fn with_columns(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Table name as used in synthesized SQL (before dialect quoting).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declared order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Append a column to the schema.
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Replace the column schema, e.g. with one discovered from a result set.
    pub fn replace_columns(&mut self, columns: Vec<Column>) {
        self.columns = columns;
    }

    /// Whether the schema has no columns yet.
    pub fn schema_is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Primary-key columns in declared order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    /// Columns not part of the primary key, in declared order.
    pub fn non_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.primary_key)
    }

    /// Whether the table declares at least one primary-key column.
    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.primary_key)
    }

    /// Rows in insertion order, including deleted ones.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows, including deleted ones.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Add a new in-memory row in `Added` state.
    pub fn add_row<I, S>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        self.push_row(values, RowState::Added)
    }

    /// Attach a row in `Unchanged` state, as done when filling from a result
    /// set.
    pub fn attach_row<I, S>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        self.push_row(values, RowState::Unchanged)
    }

    fn push_row<I, S>(&mut self, values: I, state: RowState) -> usize
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        self.rows.push(Row::new(values, state));
        self.rows.len() - 1
    }

    /// Set a column value on a row.
    ///
    /// An `Unchanged` row gets its original values snapshotted and moves to
    /// `Modified`; `Added` rows stay `Added`. Setting values on a `Deleted`
    /// row is an error.
    pub fn set_value(
        &mut self,
        row: usize,
        column: &str,
        value: Value,
    ) -> crate::error::Result<()> {
        let row = self
            .rows
            .get_mut(row)
            .ok_or_else(|| crate::error::Error::execution(format!("row index {row} out of range")))?;
        match row.state {
            RowState::Deleted => {
                return Err(crate::error::Error::execution(
                    "cannot modify a deleted row",
                ))
            }
            RowState::Unchanged => {
                row.snapshot_originals();
                row.state = RowState::Modified;
            }
            RowState::Added | RowState::Modified => {}
        }
        row.values.insert(column.to_string(), value);
        Ok(())
    }

    /// Mark a row deleted.
    ///
    /// `Added` rows are removed outright since the database never saw them;
    /// other rows snapshot their originals and move to `Deleted`.
    pub fn delete_row(&mut self, row: usize) -> crate::error::Result<()> {
        let state = self
            .rows
            .get(row)
            .map(|r| r.state)
            .ok_or_else(|| crate::error::Error::execution(format!("row index {row} out of range")))?;
        match state {
            RowState::Added => {
                self.rows.remove(row);
            }
            _ => {
                let row = &mut self.rows[row];
                row.snapshot_originals();
                row.state = RowState::Deleted;
            }
        }
        Ok(())
    }

    /// Write a value into a row without touching its lifecycle state.
    ///
    /// Used for refresh-after-write: database-computed values (generated keys,
    /// trigger effects) are copied back into the row before it is accepted.
    pub(crate) fn write_back(&mut self, row: usize, column: &str, value: Value) {
        if let Some(row) = self.rows.get_mut(row) {
            row.values.insert(column.to_string(), value);
        }
    }

    /// Accept a single row's pending change: `Added`/`Modified` become
    /// `Unchanged` with the snapshot cleared; `Deleted` rows are removed.
    pub fn accept_row(&mut self, row: usize) {
        if let Some(r) = self.rows.get_mut(row) {
            match r.state {
                RowState::Deleted => {
                    self.rows.remove(row);
                }
                _ => {
                    r.state = RowState::Unchanged;
                    r.original = None;
                }
            }
        }
    }

    /// Accept all pending changes.
    pub fn accept_changes(&mut self) {
        self.rows.retain(|r| r.state != RowState::Deleted);
        for row in &mut self.rows {
            row.state = RowState::Unchanged;
            row.original = None;
        }
    }

    /// Drop all rows, keeping the column schema.
    pub fn clear_rows(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee_table() -> Table {
        Table::with_columns(
            "Employee",
            vec![
                Column::auto_key("Id", SemanticType::Int32),
                Column::new("Name", SemanticType::String),
                Column::new("Salary", SemanticType::Double),
            ],
        )
    }

    #[test]
    fn test_modify_snapshots_originals() {
        let mut table = employee_table();
        let idx = table.attach_row(vec![
            ("Id", Value::Int32(1)),
            ("Name", Value::from("Ann")),
            ("Salary", Value::Double(1000.0)),
        ]);

        table.set_value(idx, "Salary", Value::Double(1200.0)).unwrap();

        let row = &table.rows()[idx];
        assert_eq!(row.state(), RowState::Modified);
        assert_eq!(row.value("Salary"), &Value::Double(1200.0));
        assert_eq!(row.original_value("Salary"), &Value::Double(1000.0));
        // Untouched columns keep the same original
        assert_eq!(row.original_value("Name"), &Value::from("Ann"));
    }

    #[test]
    fn test_added_row_stays_added_on_modify() {
        let mut table = employee_table();
        let idx = table.add_row(vec![("Name", Value::from("Bob"))]);
        table.set_value(idx, "Salary", Value::Double(900.0)).unwrap();
        assert_eq!(table.rows()[idx].state(), RowState::Added);
    }

    #[test]
    fn test_delete_added_row_removes_it() {
        let mut table = employee_table();
        let idx = table.add_row(vec![("Name", Value::from("Bob"))]);
        table.delete_row(idx).unwrap();
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_delete_unchanged_row_keeps_snapshot() {
        let mut table = employee_table();
        let idx = table.attach_row(vec![
            ("Id", Value::Int32(1)),
            ("Name", Value::from("Ann")),
        ]);
        table.delete_row(idx).unwrap();
        let row = &table.rows()[idx];
        assert_eq!(row.state(), RowState::Deleted);
        assert_eq!(row.original_value("Name"), &Value::from("Ann"));
    }

    #[test]
    fn test_accept_changes() {
        let mut table = employee_table();
        table.attach_row(vec![("Id", Value::Int32(1))]);
        let modified = table.attach_row(vec![("Id", Value::Int32(2))]);
        table.set_value(modified, "Name", Value::from("Cy")).unwrap();
        table.delete_row(0).unwrap();

        table.accept_changes();

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows()[0].state(), RowState::Unchanged);
        assert_eq!(table.rows()[0].original_value("Name"), &Value::from("Cy"));
    }

    #[test]
    fn test_modify_deleted_row_fails() {
        let mut table = employee_table();
        let idx = table.attach_row(vec![("Id", Value::Int32(1))]);
        table.delete_row(idx).unwrap();
        assert!(table.set_value(idx, "Name", Value::from("x")).is_err());
    }

    #[test]
    fn test_key_column_partition_preserves_order() {
        let table = employee_table();
        let keys: Vec<_> = table.primary_key_columns().map(|c| c.name.as_str()).collect();
        let non_keys: Vec<_> = table.non_key_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(keys, vec!["Id"]);
        assert_eq!(non_keys, vec!["Name", "Salary"]);
    }
}
