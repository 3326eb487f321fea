//! Optimistic-lock predicate synthesis.
//!
//! The predicate compares every non-key column against the row's original
//! value, tolerating NULL-to-NULL matches that a plain `=` would reject under
//! SQL's three-valued logic. Zero affected rows after applying it means the
//! row was changed concurrently since it was read.

use crate::command::{BoundParameter, RowVersion};
use crate::dialect::DialectProvider;
use crate::error::Result;
use crate::table::Table;

/// A synthesized lock predicate: clause text plus the shadow parameters that
/// feed it, all sourced from the row's original values.
#[derive(Debug, Clone)]
pub struct LockPredicate {
    /// Parenthesized AND-chain over the non-key columns
    pub clause: String,
    /// Two parameters per non-key column: one under the column's own name,
    /// one under the synthesized `Original_<col>` name
    pub parameters: Vec<BoundParameter>,
}

/// Build the NULL-safe comparison predicate for a table.
///
/// For each column not in the primary key the clause is
/// `(<col> = <tok> OR (<col> IS NULL AND <tok> IS NULL))` with `<tok>` the
/// dialect token for `Original_<col>`.
pub fn build_predicate(table: &Table, dialect: &DialectProvider) -> Result<LockPredicate> {
    let synthesizer = crate::command::CommandSynthesizer::new(dialect);
    let mut clauses = Vec::new();
    let mut parameters = Vec::new();

    for column in table.non_key_columns() {
        let sql_column = dialect.quote_identifier(&column.name);
        let shadow_name = format!("Original_{}", column.name);
        let sql_token = dialect.parameter_token(&shadow_name);
        clauses.push(format!(
            "({sql_column} = {sql_token} OR ({sql_column} IS NULL AND {sql_token} IS NULL))"
        ));

        parameters.push(synthesizer.column_parameter(column, RowVersion::Original, None)?);
        parameters.push(synthesizer.column_parameter(
            column,
            RowVersion::Original,
            Some(&shadow_name),
        )?);
    }

    Ok(LockPredicate {
        clause: clauses.join(" AND "),
        parameters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ParameterSource;
    use crate::table::Column;
    use crate::types::SemanticType;

    fn employee_table() -> Table {
        Table::with_columns(
            "Employee",
            vec![
                Column::primary_key("Id", SemanticType::Int32),
                Column::new("Name", SemanticType::String),
                Column::new("Salary", SemanticType::Double),
            ],
        )
    }

    #[test]
    fn test_clause_shape() {
        let dialect = DialectProvider::generic();
        let predicate = build_predicate(&employee_table(), &dialect).unwrap();
        assert_eq!(
            predicate.clause,
            "(Name = @Original_Name OR (Name IS NULL AND @Original_Name IS NULL)) \
             AND (Salary = @Original_Salary OR (Salary IS NULL AND @Original_Salary IS NULL))"
        );
    }

    #[test]
    fn test_two_original_sourced_parameters_per_column() {
        let dialect = DialectProvider::generic();
        let predicate = build_predicate(&employee_table(), &dialect).unwrap();

        assert_eq!(predicate.parameters.len(), 4);
        let names: Vec<_> = predicate.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Original_Name", "Salary", "Original_Salary"]);
        for parameter in &predicate.parameters {
            assert!(matches!(
                &parameter.source,
                ParameterSource::Column {
                    version: RowVersion::Original,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_key_only_table_yields_empty_predicate() {
        let table = Table::with_columns(
            "Link",
            vec![
                Column::primary_key("A", SemanticType::Int32),
                Column::primary_key("B", SemanticType::Int32),
            ],
        );
        let predicate = build_predicate(&table, &DialectProvider::generic()).unwrap();
        assert!(predicate.clause.is_empty());
        assert!(predicate.parameters.is_empty());
    }
}
