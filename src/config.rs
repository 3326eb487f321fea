//! Configuration and statement registry.
//!
//! The configuration carries the connection string, the target database
//! type, the SQL-logging flag, and the named statements that make up the
//! statement registry. It is loaded from YAML; the connection string is
//! supplied separately by the caller so the same statement file can serve
//! several environments.
//!
//! ```yaml
//! database_type: sql_server
//! log_sql: true
//! statements:
//!   - id: employee_by_dept
//!     kind: text
//!     text: "SELECT * FROM Employee WHERE DeptId = @DeptId"
//!     parameters:
//!       - name: DeptId
//!         type: int32
//! ```

use crate::dialect::DatabaseType;
use crate::error::{Error, Result};
use crate::statement::{DeclaredParameter, StatementKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A configured, named statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementDefinition {
    /// Logical id used to refer to this statement
    pub id: String,

    /// Kind of the statement text
    pub kind: StatementKind,

    /// SQL text or stored-procedure name
    pub text: String,

    /// Declared parameters, in binding order
    #[serde(default)]
    pub parameters: Vec<DeclaredParameter>,
}

/// Data-access configuration plus the statement registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Driver connection string
    #[serde(default)]
    pub connection_string: String,

    /// Target database product
    pub database_type: DatabaseType,

    /// Whether synthesized SQL text is logged before execution
    #[serde(default)]
    pub log_sql: bool,

    /// Named statements
    #[serde(default)]
    pub statements: Vec<StatementDefinition>,
}

impl Config {
    /// Create a configuration with no statements.
    pub fn new(connection_string: impl Into<String>, database_type: DatabaseType) -> Self {
        Self {
            connection_string: connection_string.into(),
            database_type,
            log_sql: false,
            statements: Vec::new(),
        }
    }

    /// Load from a YAML string, setting the connection string afterwards.
    pub fn from_yaml_str(yaml: &str, connection_string: impl Into<String>) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::configuration(format!("failed to parse configuration: {e}")))?;
        config.connection_string = connection_string.into();
        Ok(config)
    }

    /// Load from a YAML file, setting the connection string afterwards.
    pub fn from_yaml_file(
        path: impl AsRef<Path>,
        connection_string: impl Into<String>,
    ) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::configuration(format!(
                "failed to read configuration file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_yaml_str(&contents, connection_string)
    }

    /// Register a statement.
    pub fn add_statement(&mut self, statement: StatementDefinition) {
        self.statements.push(statement);
    }

    /// Look up a statement by id.
    pub fn statement(&self, id: &str) -> Result<&StatementDefinition> {
        self.statements
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::configuration(format!("statement [{id}] does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SemanticType;

    const SAMPLE: &str = r#"
database_type: sql_server
log_sql: true
statements:
  - id: employee_by_dept
    kind: text
    text: "SELECT * FROM Employee WHERE DeptId = @DeptId"
    parameters:
      - name: DeptId
        type: int32
  - id: archive_employees
    kind: stored_procedure
    text: "sp_archive_employees"
"#;

    #[test]
    fn test_yaml_round_trip() {
        let config = Config::from_yaml_str(SAMPLE, "server=localhost").unwrap();
        assert_eq!(config.database_type, DatabaseType::SqlServer);
        assert!(config.log_sql);
        assert_eq!(config.connection_string, "server=localhost");

        let stmt = config.statement("employee_by_dept").unwrap();
        assert_eq!(stmt.kind, StatementKind::Text);
        assert_eq!(stmt.parameters.len(), 1);
        assert_eq!(stmt.parameters[0].semantic_type, SemanticType::Int32);

        let proc = config.statement("archive_employees").unwrap();
        assert_eq!(proc.kind, StatementKind::StoredProcedure);
        assert!(proc.parameters.is_empty());
    }

    #[test]
    fn test_unknown_statement_id() {
        let config = Config::from_yaml_str(SAMPLE, "").unwrap();
        let err = config.statement("nope").unwrap_err();
        assert!(err.to_string().contains("[nope] does not exist"));
    }

    #[test]
    fn test_missing_database_type_is_a_configuration_error() {
        let err = Config::from_yaml_str("log_sql: false", "").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
