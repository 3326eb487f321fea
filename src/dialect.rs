//! Per-dialect SQL rules as immutable data.
//!
//! A [`DialectProvider`] captures everything the command synthesizer needs to
//! know about a database product: how semantic types map to driver type
//! names, how parameters and identifiers are spelled, whether the product can
//! report the last generated identity value, whether a trailing re-select is
//! permitted, and whether the driver wants one parameter object per textual
//! occurrence. Dialects are values, not code paths: the built-in products are
//! preset constructors over the same struct, and a custom product is just
//! another value.

use crate::error::{Error, Result};
use crate::types::SemanticType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Database product selector, as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseType {
    /// Microsoft SQL Server
    SqlServer,
    /// Oracle
    Oracle,
    /// Generic OLEDB-style driver
    Generic,
}

/// Identifier quoting style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// Emit identifiers as-is
    None,
    /// Bracket-quote identifiers: `[name]`
    Brackets,
}

/// Immutable per-product SQL rules.
///
/// Built once (at accessor construction) and treated as read-only
/// configuration from then on.
#[derive(Debug, Clone)]
pub struct DialectProvider {
    /// Character prefixed to parameter names in command text (`@` or `:`)
    pub parameter_prefix: char,
    /// How table and column names are quoted
    pub quote_style: QuoteStyle,
    /// Expression reading the last auto-generated key right after an insert,
    /// when the product has one
    pub identity_expression: Option<&'static str>,
    /// Whether a trailing re-select after a write is permitted
    pub supports_refresh: bool,
    /// Whether the driver needs a fresh parameter per textual occurrence of a
    /// name (instead of rejecting duplicates)
    pub requires_duplicate_parameters: bool,
    /// Semantic type to driver-native type name
    pub type_map: HashMap<SemanticType, &'static str>,
    /// Whether an unmapped semantic type falls back to the variant mapping
    pub variant_fallback: bool,
}

impl DialectProvider {
    /// Build the provider for a configured database type.
    pub fn for_database(db: DatabaseType) -> Self {
        match db {
            DatabaseType::SqlServer => Self::sql_server(),
            DatabaseType::Oracle => Self::oracle(),
            DatabaseType::Generic => Self::generic(),
        }
    }

    /// SQL Server: `@` parameters, bracket quoting, `@@IDENTITY`, refresh
    /// supported.
    pub fn sql_server() -> Self {
        Self {
            parameter_prefix: '@',
            quote_style: QuoteStyle::Brackets,
            identity_expression: Some("@@IDENTITY"),
            supports_refresh: true,
            requires_duplicate_parameters: false,
            type_map: HashMap::from([
                (SemanticType::Boolean, "BIT"),
                (SemanticType::Byte, "CHAR"),
                (SemanticType::ByteArray, "IMAGE"),
                (SemanticType::DateTime, "DATETIME"),
                (SemanticType::Decimal, "DECIMAL"),
                (SemanticType::Double, "FLOAT"),
                (SemanticType::Guid, "UNIQUEIDENTIFIER"),
                (SemanticType::Int16, "SMALLINT"),
                (SemanticType::Int32, "INT"),
                (SemanticType::Int64, "BIGINT"),
                (SemanticType::String, "NVARCHAR"),
                (SemanticType::Variant, "SQL_VARIANT"),
            ]),
            variant_fallback: false,
        }
    }

    /// Oracle: `:` parameters, no quoting, no identity expression, no
    /// refresh.
    pub fn oracle() -> Self {
        Self {
            parameter_prefix: ':',
            quote_style: QuoteStyle::None,
            identity_expression: None,
            supports_refresh: false,
            requires_duplicate_parameters: false,
            type_map: HashMap::from([
                (SemanticType::Boolean, "BYTE"),
                (SemanticType::Byte, "BYTE"),
                (SemanticType::ByteArray, "RAW"),
                (SemanticType::DateTime, "DATETIME"),
                (SemanticType::Decimal, "NUMBER"),
                (SemanticType::Double, "DOUBLE"),
                (SemanticType::Guid, "RAW"),
                (SemanticType::Int16, "INT16"),
                (SemanticType::Int32, "INT32"),
                (SemanticType::Int64, "NUMBER"),
                (SemanticType::String, "NVARCHAR2"),
                (SemanticType::Variant, "NVARCHAR2"),
            ]),
            variant_fallback: false,
        }
    }

    /// Generic OLEDB-style driver: `@` parameters, no quoting, duplicate
    /// parameter objects required, unknown types fall back to variant.
    pub fn generic() -> Self {
        Self {
            parameter_prefix: '@',
            quote_style: QuoteStyle::None,
            identity_expression: None,
            supports_refresh: false,
            requires_duplicate_parameters: true,
            type_map: HashMap::from([
                (SemanticType::Boolean, "BOOLEAN"),
                (SemanticType::Byte, "TINYINT"),
                (SemanticType::ByteArray, "BINARY"),
                (SemanticType::DateTime, "DATE"),
                (SemanticType::Decimal, "DECIMAL"),
                (SemanticType::Double, "DOUBLE"),
                (SemanticType::Guid, "GUID"),
                (SemanticType::Int16, "SMALLINT"),
                (SemanticType::Int32, "INTEGER"),
                (SemanticType::Int64, "BIGINT"),
                (SemanticType::String, "VARWCHAR"),
                (SemanticType::Variant, "VARIANT"),
            ]),
            variant_fallback: true,
        }
    }

    /// Map a semantic type to this product's driver type name.
    ///
    /// An unmapped type uses the variant mapping when the dialect has that
    /// fallback, otherwise the lookup fails with a configuration error.
    pub fn map_type(&self, semantic: SemanticType) -> Result<&'static str> {
        if let Some(name) = self.type_map.get(&semantic) {
            return Ok(name);
        }
        if self.variant_fallback {
            if let Some(name) = self.type_map.get(&SemanticType::Variant) {
                return Ok(name);
            }
        }
        Err(Error::configuration(format!(
            "no driver type mapping for semantic type {semantic:?}"
        )))
    }

    /// Parameter token as it appears in command text, e.g. `@Name`.
    pub fn parameter_token(&self, name: &str) -> String {
        format!("{}{name}", self.parameter_prefix)
    }

    /// Quote a table or column identifier per this product's rules.
    pub fn quote_identifier(&self, name: &str) -> String {
        match self.quote_style {
            QuoteStyle::None => name.to_string(),
            QuoteStyle::Brackets => format!("[{name}]"),
        }
    }

    /// Expression reading the last auto-generated key after an insert.
    pub fn identity_expression(&self) -> Option<&'static str> {
        self.identity_expression
    }

    /// Whether a trailing re-select after a write is permitted.
    pub fn supports_refresh(&self) -> bool {
        self.supports_refresh
    }

    /// Whether the same parameter name must be bound once per textual
    /// occurrence.
    pub fn requires_duplicate_parameters(&self) -> bool {
        self.requires_duplicate_parameters
    }
}
