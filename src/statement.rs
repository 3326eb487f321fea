//! Statements and parameter lists.
//!
//! A [`Statement`] is either a reference into the statement registry (a
//! logical id resolved through [`crate::config::Config`] at execution time)
//! or an inline SQL text with a kind and, optionally, declared parameter
//! types. Resolution produces an immutable [`ResolvedStatement`]; a statement
//! that declares no parameter types has them inferred once from the runtime
//! types of the bound values, instead of mutating the statement in place.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{SemanticType, Value};
use serde::{Deserialize, Serialize};

/// Kind of a statement's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Plain SQL text
    Text,
    /// Stored procedure name
    StoredProcedure,
}

/// A declared parameter of a configured statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredParameter {
    /// Parameter name, without any dialect token prefix
    pub name: String,

    /// Semantic type of the values bound under this name
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
}

impl DeclaredParameter {
    /// Create a declared parameter.
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
        }
    }
}

/// A single name→value binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name, without any dialect token prefix
    pub name: String,
    /// Bound value
    pub value: Value,
}

impl Parameter {
    /// Create a parameter binding.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered list of parameters with unique names.
///
/// Binding the same name twice replaces the earlier binding; order of first
/// insertion is preserved and drives parameter-type inference order.
#[derive(Debug, Clone, Default)]
pub struct ParameterList {
    parameters: Vec<Parameter>,
}

impl ParameterList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list from parameters, later duplicates replacing earlier ones.
    pub fn from_parameters<I>(parameters: I) -> Self
    where
        I: IntoIterator<Item = Parameter>,
    {
        let mut list = Self::new();
        for param in parameters {
            list.set(param);
        }
        list
    }

    /// Insert or replace a binding.
    pub fn set(&mut self, parameter: Parameter) {
        match self.parameters.iter_mut().find(|p| p.name == parameter.name) {
            Some(existing) => *existing = parameter,
            None => self.parameters.push(parameter),
        }
    }

    /// Whether a binding with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }

    /// Look up a binding by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// A statement as handed to the accessor facade.
#[derive(Debug, Clone)]
pub enum Statement {
    /// Logical id resolved through the statement registry at execution time.
    Registry {
        /// Configured statement id
        id: String,
    },
    /// Inline statement text.
    Inline {
        /// Kind of the text
        kind: StatementKind,
        /// SQL text or procedure name
        text: String,
        /// Declared parameters; `None` requests inference from bound values
        parameters: Option<Vec<DeclaredParameter>>,
    },
}

/// A statement resolved to immutable, command-ready form.
#[derive(Debug, Clone)]
pub struct ResolvedStatement {
    /// Kind of the text
    pub kind: StatementKind,
    /// SQL text or procedure name
    pub text: String,
    /// Declared parameters, possibly inferred
    pub parameters: Vec<DeclaredParameter>,
}

impl Statement {
    /// Statement referring to a configured registry entry.
    pub fn from_registry(id: impl Into<String>) -> Self {
        Self::Registry { id: id.into() }
    }

    /// Inline statement with parameter types inferred from the first bound
    /// values.
    pub fn text(kind: StatementKind, text: impl Into<String>) -> Self {
        Self::Inline {
            kind,
            text: text.into(),
            parameters: None,
        }
    }

    /// Inline statement with explicitly declared parameters.
    pub fn with_parameters(
        kind: StatementKind,
        text: impl Into<String>,
        parameters: Vec<DeclaredParameter>,
    ) -> Self {
        Self::Inline {
            kind,
            text: text.into(),
            parameters: Some(parameters),
        }
    }

    /// Attach declared parameters to an inline statement that has none yet.
    ///
    /// Declaring parameters on a statement that already carries a parameter
    /// list is a configuration error; a registry statement's parameters are
    /// owned by the configuration and cannot be redeclared either.
    pub fn declare_parameters(self, parameters: Vec<DeclaredParameter>) -> Result<Self> {
        match self {
            Self::Inline {
                kind,
                text,
                parameters: None,
            } => Ok(Self::Inline {
                kind,
                text,
                parameters: Some(parameters),
            }),
            Self::Inline { .. } => Err(Error::configuration(
                "statement already has a parameter list",
            )),
            Self::Registry { .. } => Err(Error::configuration(
                "registry statement parameters are declared in configuration",
            )),
        }
    }

    /// Resolve to an immutable command-ready form.
    ///
    /// Registry statements are looked up in the configuration. Inline
    /// statements without declared parameters have them inferred from
    /// `values`, in binding order; a null value cannot be inferred from and
    /// fails with an execution error.
    pub fn resolve(&self, config: &Config, values: &ParameterList) -> Result<ResolvedStatement> {
        match self {
            Self::Registry { id } => {
                let def = config.statement(id)?;
                Ok(ResolvedStatement {
                    kind: def.kind,
                    text: def.text.clone(),
                    parameters: def.parameters.clone(),
                })
            }
            Self::Inline {
                kind,
                text,
                parameters,
            } => {
                let parameters = match parameters {
                    Some(declared) => declared.clone(),
                    None => infer_parameters(values)?,
                };
                Ok(ResolvedStatement {
                    kind: *kind,
                    text: text.clone(),
                    parameters,
                })
            }
        }
    }
}

/// Infer declared parameters from bound values' runtime types.
fn infer_parameters(values: &ParameterList) -> Result<Vec<DeclaredParameter>> {
    values
        .iter()
        .map(|param| {
            if param.value.is_null() {
                return Err(Error::execution(format!(
                    "statement parameter [{}] can not be null",
                    param.name
                )));
            }
            Ok(DeclaredParameter::new(
                param.name.clone(),
                param.value.semantic_type(),
            ))
        })
        .collect()
}
