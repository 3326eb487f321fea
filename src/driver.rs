//! Driver capability traits.
//!
//! The crate never talks to a database directly: all I/O goes through a
//! [`Driver`] supplied by the embedding application, one implementation per
//! database product. The traits are synchronous and blocking, mirroring the
//! call model of the facade. Driver implementations report failures as
//! [`crate::error::Error`], wrapping their native errors via
//! [`crate::error::Error::wrapped`] so the cause is retained.

use crate::command::Command;
use crate::error::Result;
use crate::table::Column;
use crate::types::{SemanticType, Value};

/// A fully resolved parameter, ready to hand to a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverParameter {
    /// Parameter name as it appears in the command text (token included)
    pub name: String,
    /// Semantic type of the value
    pub semantic_type: SemanticType,
    /// Dialect-mapped driver type name
    pub driver_type: &'static str,
    /// The value to bind
    pub value: Value,
}

/// Result of a write command.
#[derive(Debug, Clone, Default)]
pub struct WriteOutcome {
    /// Rows affected by the write statement itself
    pub affected: u64,
    /// Values produced by a trailing refresh re-select, in the command's
    /// select-list order, when the command carried one and a row came back
    pub refreshed: Option<Vec<Value>>,
}

/// A query result: discovered column schema plus rows of values.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// Result columns, in select-list order
    pub columns: Vec<Column>,
    /// Rows, each aligned with `columns`
    pub rows: Vec<Vec<Value>>,
}

/// An open driver connection.
///
/// Owns at most one active transaction; `begin`/`commit`/`rollback` bracket
/// it. A connection is closed exactly once, by whichever call opened it.
pub trait DriverConnection {
    /// Begin a transaction on this connection.
    fn begin(&mut self) -> Result<()>;

    /// Commit the active transaction.
    fn commit(&mut self) -> Result<()>;

    /// Roll back the active transaction.
    fn rollback(&mut self) -> Result<()>;

    /// Execute a write command, returning the affected count and any
    /// refresh-select results.
    fn execute(&mut self, command: &Command, parameters: &[DriverParameter])
        -> Result<WriteOutcome>;

    /// Execute a query command, returning rows and their column schema.
    fn query(&mut self, command: &Command, parameters: &[DriverParameter]) -> Result<ResultSet>;

    /// Execute a query command, returning the first column of the first row,
    /// or `Value::Null` for an empty result.
    fn query_scalar(&mut self, command: &Command, parameters: &[DriverParameter]) -> Result<Value>;

    /// Close the connection.
    fn close(&mut self) -> Result<()>;
}

/// Opens connections for one database product.
pub trait Driver {
    /// Open a connection using the given connection string.
    fn open(&self, connection_string: &str) -> Result<Box<dyn DriverConnection>>;
}
