//! Command synthesis.
//!
//! A [`Command`] is an ephemeral pairing of SQL text with ordered parameter
//! *descriptors*: each bound parameter names the value source it is filled
//! from (a literal, or a column of the row being written at either its
//! current or original version). The [`CommandSynthesizer`] builds commands
//! from a table schema and a dialect; [`Command::bind`] resolves the
//! descriptors against a concrete row into driver-ready parameters.

use crate::dialect::DialectProvider;
use crate::driver::DriverParameter;
use crate::error::{Error, Result};
use crate::locking;
use crate::statement::{ParameterList, ResolvedStatement, StatementKind};
use crate::table::{Column, Row, Table};
use crate::types::{SemanticType, Value};

/// Which version of a row's column value a parameter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowVersion {
    /// The current in-memory value
    Current,
    /// The original snapshot taken before modification
    Original,
}

/// Where a bound parameter's value comes from at bind time.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSource {
    /// A fixed value captured at synthesis time
    Literal(Value),
    /// A column of the row the command is executed against
    Column {
        /// Source column name
        column: String,
        /// Row version to read
        version: RowVersion,
    },
}

/// An ordered parameter descriptor of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    /// Logical name, without the dialect token prefix
    pub name: String,
    /// Name as it appears in command text, token included
    pub placeholder: String,
    /// Semantic type of the bound values
    pub semantic_type: SemanticType,
    /// Dialect-mapped driver type name
    pub driver_type: &'static str,
    /// Value source
    pub source: ParameterSource,
}

/// A synthesized command: SQL text, kind, ordered parameters.
#[derive(Debug, Clone)]
pub struct Command {
    /// SQL text or stored-procedure name
    pub text: String,
    /// Kind of the text
    pub kind: StatementKind,
    /// Parameters in binding order
    pub parameters: Vec<BoundParameter>,
}

impl Command {
    fn new(kind: StatementKind) -> Self {
        Self {
            text: String::new(),
            kind,
            parameters: Vec::new(),
        }
    }

    /// Resolve all parameter sources into driver-ready parameters.
    ///
    /// Column-sourced parameters need `row`; binding them without one is an
    /// execution error.
    pub fn bind(&self, row: Option<&Row>) -> Result<Vec<DriverParameter>> {
        self.parameters
            .iter()
            .map(|param| {
                let value = match &param.source {
                    ParameterSource::Literal(value) => value.clone(),
                    ParameterSource::Column { column, version } => {
                        let row = row.ok_or_else(|| {
                            Error::execution(format!(
                                "parameter [{}] must be bound against a row",
                                param.name
                            ))
                        })?;
                        match version {
                            RowVersion::Current => row.value(column).clone(),
                            RowVersion::Original => row.original_value(column).clone(),
                        }
                    }
                };
                Ok(DriverParameter {
                    name: param.placeholder.clone(),
                    semantic_type: param.semantic_type,
                    driver_type: param.driver_type,
                    value,
                })
            })
            .collect()
    }
}

/// Builds commands for one dialect.
pub struct CommandSynthesizer<'a> {
    dialect: &'a DialectProvider,
}

impl<'a> CommandSynthesizer<'a> {
    /// Create a synthesizer over a dialect.
    pub fn new(dialect: &'a DialectProvider) -> Self {
        Self { dialect }
    }

    /// `SELECT <cols|*> FROM <table> [WHERE <filter equalities>]`.
    ///
    /// The column list follows the table's declared order; an empty filter
    /// omits the WHERE clause. Filter names must match declared columns.
    pub fn build_select(&self, table: &Table, filter: &ParameterList) -> Result<Command> {
        let mut command = Command::new(StatementKind::Text);
        let mut text = format!(
            "SELECT {} FROM {}",
            self.select_list(table),
            self.dialect.quote_identifier(table.name())
        );

        if !filter.is_empty() {
            let mut clauses = Vec::with_capacity(filter.len());
            for param in filter.iter() {
                let column = table.column(&param.name).ok_or_else(|| {
                    Error::execution(format!(
                        "unknown parameter [{}]: table [{}] has no such column",
                        param.name,
                        table.name()
                    ))
                })?;
                clauses.push(format!(
                    "{} = {}",
                    self.dialect.quote_identifier(&column.name),
                    self.dialect.parameter_token(&column.name)
                ));
                let mut bound = self.column_parameter(column, RowVersion::Current, None)?;
                bound.source = ParameterSource::Literal(param.value.clone());
                self.push_parameter(&mut command, bound);
            }
            text.push_str(" WHERE ");
            text.push_str(&clauses.join(" AND "));
        }

        command.text = text;
        Ok(command)
    }

    /// `INSERT INTO <table> (<non-auto cols>) VALUES (<tokens>)`, optionally
    /// followed by a refresh re-select.
    ///
    /// The re-select is appended when the table has an auto-generated primary
    /// key and the dialect exposes an identity expression, or when `refresh`
    /// is requested. It selects by the identity expression when an
    /// auto-generated key exists, by primary-key equality otherwise.
    pub fn build_insert(&self, table: &Table, refresh: bool) -> Result<Command> {
        if refresh && !self.dialect.supports_refresh() {
            return Err(Error::execution("refresh after update not supported"));
        }

        let mut command = Command::new(StatementKind::Text);

        let mut columns = Vec::new();
        let mut tokens = Vec::new();
        for column in table.columns().iter().filter(|c| !c.auto_generated) {
            columns.push(self.dialect.quote_identifier(&column.name));
            tokens.push(self.dialect.parameter_token(&column.name));
            let bound = self.column_parameter(column, RowVersion::Current, None)?;
            self.push_parameter(&mut command, bound);
        }

        let mut text = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.dialect.quote_identifier(table.name()),
            columns.join(", "),
            tokens.join(", ")
        );

        let identity_column = self.dialect.identity_expression().and_then(|expr| {
            table
                .primary_key_columns()
                .find(|c| c.auto_generated)
                .map(|c| (c, expr))
        });

        if identity_column.is_some() || refresh {
            text.push_str(";\n");
            text.push_str(&format!(
                "SELECT {} FROM {} WHERE ",
                self.select_list(table),
                self.dialect.quote_identifier(table.name())
            ));
            match identity_column {
                // The identity expression is only valid right after the
                // insert, which is why both statements share one command.
                Some((column, expression)) => {
                    text.push_str(&format!(
                        "{} = {}",
                        self.dialect.quote_identifier(&column.name),
                        expression
                    ));
                }
                None => {
                    let clause = self.key_equality(table, &mut command)?;
                    text.push_str(&clause);
                }
            }
        }

        command.text = text;
        Ok(command)
    }

    /// `UPDATE <table> SET <non-key cols> WHERE <pk> [AND (<lock>)]`,
    /// optionally followed by a refresh re-select by primary key.
    pub fn build_update(&self, table: &Table, optimistic: bool, refresh: bool) -> Result<Command> {
        if refresh && !self.dialect.supports_refresh() {
            return Err(Error::execution("refresh after update not supported"));
        }
        if !table.has_primary_key() {
            return Err(Error::execution(format!(
                "primary key missing in table [{}]",
                table.name()
            )));
        }

        let mut command = Command::new(StatementKind::Text);

        let mut assignments = Vec::new();
        for column in table
            .non_key_columns()
            .filter(|c| !c.auto_generated)
        {
            assignments.push(format!(
                "{} = {}",
                self.dialect.quote_identifier(&column.name),
                self.dialect.parameter_token(&column.name)
            ));
            let bound = self.column_parameter(column, RowVersion::Current, None)?;
            self.push_parameter(&mut command, bound);
        }

        let mut text = format!(
            "UPDATE {} SET {} WHERE ",
            self.dialect.quote_identifier(table.name()),
            assignments.join(", ")
        );
        let key_clause = self.key_equality(table, &mut command)?;
        text.push_str(&key_clause);

        if optimistic {
            let predicate = locking::build_predicate(table, self.dialect)?;
            // A key-only table has nothing to compare; skip the empty clause.
            if !predicate.clause.is_empty() {
                text.push_str(&format!(" AND ({})", predicate.clause));
                for parameter in predicate.parameters {
                    self.push_parameter(&mut command, parameter);
                }
            }
        }

        if refresh {
            text.push_str(";\n");
            text.push_str(&format!(
                "SELECT {} FROM {} WHERE ",
                self.select_list(table),
                self.dialect.quote_identifier(table.name())
            ));
            let clause = self.key_equality(table, &mut command)?;
            text.push_str(&clause);
        }

        command.text = text;
        Ok(command)
    }

    /// `DELETE FROM <table> WHERE <pk> [AND (<lock>)]`.
    pub fn build_delete(&self, table: &Table, optimistic: bool) -> Result<Command> {
        if !table.has_primary_key() {
            return Err(Error::execution(format!(
                "primary key missing in table [{}]",
                table.name()
            )));
        }

        let mut command = Command::new(StatementKind::Text);
        let mut text = format!(
            "DELETE FROM {} WHERE ",
            self.dialect.quote_identifier(table.name())
        );
        let key_clause = self.key_equality(table, &mut command)?;
        text.push_str(&key_clause);

        if optimistic {
            let predicate = locking::build_predicate(table, self.dialect)?;
            if !predicate.clause.is_empty() {
                text.push_str(&format!(" AND ({})", predicate.clause));
                for parameter in predicate.parameters {
                    self.push_parameter(&mut command, parameter);
                }
            }
        }

        command.text = text;
        Ok(command)
    }

    /// Command from a resolved statement and a value list.
    ///
    /// Every declared parameter must be present in `values`.
    pub fn build_statement(
        &self,
        statement: &ResolvedStatement,
        values: &ParameterList,
    ) -> Result<Command> {
        let mut command = Command::new(statement.kind);
        command.text = statement.text.clone();
        for declared in &statement.parameters {
            let value = values.get(&declared.name).ok_or_else(|| {
                Error::execution(format!(
                    "parameter [{}] does not exist in parameter list",
                    declared.name
                ))
            })?;
            command.parameters.push(BoundParameter {
                name: declared.name.clone(),
                placeholder: self.dialect.parameter_token(&declared.name),
                semantic_type: declared.semantic_type,
                driver_type: self.dialect.map_type(declared.semantic_type)?,
                source: ParameterSource::Literal(value.value.clone()),
            });
        }
        Ok(command)
    }

    /// Primary-key equality AND-chain; pushes one current-version parameter
    /// per key column.
    fn key_equality(&self, table: &Table, command: &mut Command) -> Result<String> {
        let mut clauses = Vec::new();
        for column in table.primary_key_columns() {
            clauses.push(format!(
                "{} = {}",
                self.dialect.quote_identifier(&column.name),
                self.dialect.parameter_token(&column.name)
            ));
            let bound = self.column_parameter(column, RowVersion::Current, None)?;
            self.push_parameter(command, bound);
        }
        Ok(clauses.join(" AND "))
    }

    /// Select list over the declared columns, `*` when the schema is empty.
    fn select_list(&self, table: &Table) -> String {
        if table.schema_is_empty() {
            return "*".to_string();
        }
        table
            .columns()
            .iter()
            .map(|c| self.dialect.quote_identifier(&c.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parameter descriptor reading a column of the executed row.
    pub(crate) fn column_parameter(
        &self,
        column: &Column,
        version: RowVersion,
        name: Option<&str>,
    ) -> Result<BoundParameter> {
        let name = name.unwrap_or(&column.name).to_string();
        Ok(BoundParameter {
            placeholder: self.dialect.parameter_token(&name),
            name,
            semantic_type: column.semantic_type,
            driver_type: self.dialect.map_type(column.semantic_type)?,
            source: ParameterSource::Column {
                column: column.name.clone(),
                version,
            },
        })
    }

    /// Add a parameter unless one with the same name is already bound.
    ///
    /// Dialects that require one parameter object per textual occurrence get
    /// the duplicate anyway. All same-named parameters a single command can
    /// produce carry the same value except the optimistic predicate's
    /// current-name/original-version binding, which suppression deliberately
    /// resolves in favor of the earlier current-version one.
    fn push_parameter(&self, command: &mut Command, parameter: BoundParameter) {
        if self.dialect.requires_duplicate_parameters()
            || !command.parameters.iter().any(|p| p.name == parameter.name)
        {
            command.parameters.push(parameter);
        }
    }
}
