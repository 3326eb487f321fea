//! Accessor facade.
//!
//! [`DataAccessor`] is the entry point: it owns the configuration, the
//! dialect, the driver, and the ambient transaction scope, and orchestrates
//! Fill, Update, ExecuteNonQuery, ExecuteScalar, and ExecuteInTransaction.
//! Command construction is delegated to [`CommandSynthesizer`]; all I/O goes
//! through the [`Driver`] capability.
//!
//! Connection ownership follows one rule: whichever call opens a connection
//! closes it. A call issued inside an ambient transaction runs against the
//! transaction's shared connection and leaves it open.

use crate::command::{Command, CommandSynthesizer};
use crate::config::Config;
use crate::dialect::DialectProvider;
use crate::driver::{Driver, DriverConnection};
use crate::error::{Error, Result};
use crate::statement::{ParameterList, Statement};
use crate::table::{RowState, Table};
use crate::transaction::{TransactionContext, TransactionScope};
use crate::types::Value;
use std::rc::Rc;

/// How column metadata discovered in a result set is applied to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaHandling {
    /// Always replace the table's columns with the result-set schema
    Always,
    /// Replace only when the table declares no columns yet
    #[default]
    OnEmptySchema,
    /// Never touch the table's columns
    Never,
}

/// Locking strategy for write-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locking {
    /// Write by primary key only
    None,
    /// Add the optimistic-lock predicate to updates and deletes
    Optimistic,
}

/// What a fill reads from.
#[derive(Debug)]
pub enum FillSource<'a> {
    /// An explicit (registry or inline) statement
    Statement {
        /// The statement to execute
        statement: &'a Statement,
        /// Values for its declared parameters
        parameters: &'a ParameterList,
    },
    /// A synthesized select with an exact-equality filter
    Filter(&'a ParameterList),
}

/// Configuration-driven data accessor for one database.
pub struct DataAccessor {
    config: Config,
    dialect: DialectProvider,
    driver: Box<dyn Driver>,
    scope: TransactionScope,
}

impl DataAccessor {
    /// Create an accessor, selecting the dialect from the configured
    /// database type.
    pub fn new(config: Config, driver: Box<dyn Driver>) -> Self {
        let dialect = DialectProvider::for_database(config.database_type);
        Self::with_dialect(config, dialect, driver)
    }

    /// Create an accessor over a custom dialect.
    pub fn with_dialect(config: Config, dialect: DialectProvider, driver: Box<dyn Driver>) -> Self {
        Self {
            config,
            dialect,
            driver,
            scope: TransactionScope::new(),
        }
    }

    /// The dialect this accessor synthesizes commands for.
    pub fn dialect(&self) -> &DialectProvider {
        &self.dialect
    }

    /// The configuration, including the statement registry.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The ambient transaction scope of this accessor.
    pub fn scope(&self) -> &TransactionScope {
        &self.scope
    }

    /// Execute a select and populate the table with the result.
    ///
    /// Fetched rows are attached in `Unchanged` state; existing rows are kept.
    /// Returns the number of rows fetched.
    pub fn fill(
        &self,
        table: &mut Table,
        source: FillSource<'_>,
        schema_handling: SchemaHandling,
    ) -> Result<usize> {
        let synthesizer = CommandSynthesizer::new(&self.dialect);
        let command = match source {
            FillSource::Statement {
                statement,
                parameters,
            } => {
                let resolved = statement.resolve(&self.config, parameters)?;
                synthesizer.build_statement(&resolved, parameters)?
            }
            FillSource::Filter(filter) => synthesizer.build_select(table, filter)?,
        };
        self.log_sql(&command);
        let parameters = command.bind(None)?;
        let result = self.with_connection(|conn| conn.query(&command, &parameters))?;

        let apply_schema = match schema_handling {
            SchemaHandling::Always => true,
            SchemaHandling::OnEmptySchema => table.schema_is_empty(),
            SchemaHandling::Never => false,
        };
        if apply_schema {
            table.replace_columns(result.columns.clone());
        }

        let fetched = result.rows.len();
        for row in result.rows {
            table.attach_row(
                result
                    .columns
                    .iter()
                    .map(|c| c.name.clone())
                    .zip(row),
            );
        }
        Ok(fetched)
    }

    /// Write the table's pending row changes back to the database.
    ///
    /// Rows are processed strictly in order: `Added` rows are inserted,
    /// `Modified` updated, `Deleted` deleted, `Unchanged` skipped. An update
    /// or delete that affects zero rows raises [`Error::Concurrency`] and
    /// stops the batch; rows already written stay written (and accepted)
    /// unless an enclosing transaction rolls them back. Returns the total
    /// affected-row count.
    pub fn update(&self, table: &mut Table, locking: Locking, refresh: bool) -> Result<u64> {
        let optimistic = locking == Locking::Optimistic;
        let synthesizer = CommandSynthesizer::new(&self.dialect);
        let insert = synthesizer.build_insert(table, refresh)?;
        let update = synthesizer.build_update(table, optimistic, refresh)?;
        let delete = synthesizer.build_delete(table, optimistic)?;

        if self.config.log_sql {
            for (state, command) in [
                (RowState::Added, &insert),
                (RowState::Modified, &update),
                (RowState::Deleted, &delete),
            ] {
                if table.rows().iter().any(|r| r.state() == state) {
                    self.log_sql(command);
                }
            }
        }

        let column_names: Vec<String> =
            table.columns().iter().map(|c| c.name.clone()).collect();

        let mut accepted: Vec<usize> = Vec::new();
        let mut total = 0u64;
        let result = self.with_connection(|conn| {
            apply_rows(
                conn,
                table,
                &insert,
                &update,
                &delete,
                &column_names,
                &mut accepted,
                &mut total,
            )
        });

        // Reverse order: removing an accepted deleted row only shifts rows
        // after it.
        for idx in accepted.iter().rev() {
            table.accept_row(*idx);
        }

        result.map(|()| total)
    }

    /// Resolve and execute a statement, returning the affected-row count.
    ///
    /// Opens a connection when no ambient transaction exists and closes it
    /// afterwards.
    pub fn execute_non_query(
        &self,
        statement: &Statement,
        parameters: &ParameterList,
    ) -> Result<u64> {
        let command = self.statement_command(statement, parameters)?;
        self.log_sql(&command);
        let bound = command.bind(None)?;
        self.with_connection(|conn| conn.execute(&command, &bound).map(|o| o.affected))
    }

    /// Resolve and execute a statement, returning the first column of the
    /// first result row, `Value::Null` for an empty result.
    pub fn execute_scalar(
        &self,
        statement: &Statement,
        parameters: &ParameterList,
    ) -> Result<Value> {
        let command = self.statement_command(statement, parameters)?;
        self.log_sql(&command);
        let bound = command.bind(None)?;
        self.with_connection(|conn| conn.query_scalar(&command, &bound))
    }

    /// Run a callback inside a transaction.
    ///
    /// With no ambient transaction: opens a connection, begins, installs the
    /// transaction as ambient, commits on `Ok`, rolls back on `Err`, and
    /// always clears the slot and closes the connection it opened. A callback
    /// error is wrapped as [`Error::Execution`] with the original failure
    /// retained as its source; this includes concurrency violations raised
    /// inside the transaction. With an ambient transaction already installed
    /// the callback simply joins it; commit and close remain the owner's job.
    pub fn execute_in_transaction<T>(
        &self,
        callback: impl FnOnce(&Self) -> Result<T>,
    ) -> Result<T> {
        if self.scope.current().is_some() {
            return callback(self);
        }

        let mut connection = self.driver.open(&self.config.connection_string)?;
        if let Err(err) = connection.begin() {
            let _ = connection.close();
            return Err(err);
        }
        let context = Rc::new(TransactionContext::new(connection));
        self.scope.set_current(Some(Rc::clone(&context)))?;

        let result = callback(self)
            .map_err(|err| Error::wrapped(format!("transaction failed: {err}"), Box::new(err)));
        let finish = match &result {
            Ok(_) => context.with_connection(|conn| conn.commit()),
            Err(_) => context.with_connection(|conn| conn.rollback()),
        };
        self.scope.clear();
        let closed = context.with_connection(|conn| conn.close());

        let value = result?;
        finish?;
        closed?;
        Ok(value)
    }

    fn statement_command(
        &self,
        statement: &Statement,
        parameters: &ParameterList,
    ) -> Result<Command> {
        let resolved = statement.resolve(&self.config, parameters)?;
        CommandSynthesizer::new(&self.dialect).build_statement(&resolved, parameters)
    }

    /// Run a closure against the ambient transaction's connection, or a
    /// freshly opened one that is closed before returning.
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut dyn DriverConnection) -> Result<T>,
    ) -> Result<T> {
        if let Some(context) = self.scope.current() {
            return context.with_connection(f);
        }
        let mut connection = self.driver.open(&self.config.connection_string)?;
        let result = f(connection.as_mut());
        let closed = connection.close();
        match result {
            Ok(value) => closed.map(|()| value),
            Err(err) => Err(err),
        }
    }

    fn log_sql(&self, command: &Command) {
        if self.config.log_sql {
            tracing::info!(sql = %command.text, "executing statement");
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_rows(
    conn: &mut dyn DriverConnection,
    table: &mut Table,
    insert: &Command,
    update: &Command,
    delete: &Command,
    column_names: &[String],
    accepted: &mut Vec<usize>,
    total: &mut u64,
) -> Result<()> {
    for idx in 0..table.row_count() {
        let state = table.rows()[idx].state();
        let (command, check_affected) = match state {
            RowState::Added => (insert, false),
            RowState::Modified => (update, true),
            RowState::Deleted => (delete, true),
            RowState::Unchanged => continue,
        };

        let parameters = command.bind(Some(&table.rows()[idx]))?;
        let outcome = conn.execute(command, &parameters)?;

        if check_affected && outcome.affected == 0 {
            return Err(Error::Concurrency(format!(
                "row {idx} in table [{}] was changed concurrently: write affected zero rows",
                table.name()
            )));
        }

        *total += outcome.affected;
        if let Some(values) = outcome.refreshed {
            for (column, value) in column_names.iter().zip(values) {
                table.write_back(idx, column, value);
            }
        }
        accepted.push(idx);
    }
    Ok(())
}
