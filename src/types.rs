//! Semantic types and runtime values.
//!
//! [`SemanticType`] is the type universe shared by every dialect: each dialect
//! maps a semantic type to its own driver-native type name. [`Value`] is the
//! runtime representation of a single column or parameter value, and is the
//! basis for parameter-type inference when a statement declares no parameter
//! types of its own.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Semantic data type of a column or parameter.
///
/// Dialect-neutral: each database product defines its own mapping from
/// `SemanticType` to a driver type name in [`crate::dialect::DialectProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// 8-bit unsigned integer
    Byte,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit IEEE 754 floating point
    Double,
    /// Boolean value
    Boolean,
    /// Date/time with timezone
    DateTime,
    /// Unicode string
    String,
    /// UUID/GUID value
    Guid,
    /// Exact decimal
    Decimal,
    /// Binary data
    ByteArray,
    /// Untyped/unknown value
    Variant,
}

/// Runtime value bound to a column or parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    /// 8-bit unsigned integer
    Byte(u8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point
    Double(f64),
    /// Boolean value
    Boolean(bool),
    /// Date/time with timezone
    DateTime(DateTime<Utc>),
    /// Unicode string
    String(String),
    /// UUID/GUID value
    Guid(Uuid),
    /// Exact decimal
    Decimal(Decimal),
    /// Binary data
    Bytes(Vec<u8>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The semantic type this value's runtime representation corresponds to.
    ///
    /// Used for parameter-type inference on statements that declare no
    /// parameter types. `Null` infers as [`SemanticType::Variant`].
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            Self::Null => SemanticType::Variant,
            Self::Byte(_) => SemanticType::Byte,
            Self::Int16(_) => SemanticType::Int16,
            Self::Int32(_) => SemanticType::Int32,
            Self::Int64(_) => SemanticType::Int64,
            Self::Double(_) => SemanticType::Double,
            Self::Boolean(_) => SemanticType::Boolean,
            Self::DateTime(_) => SemanticType::DateTime,
            Self::String(_) => SemanticType::String,
            Self::Guid(_) => SemanticType::Guid,
            Self::Decimal(_) => SemanticType::Decimal,
            Self::Bytes(_) => SemanticType::ByteArray,
        }
    }

    /// Try to get this value as an i64, widening smaller integers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Byte(b) => Some(*b as i64),
            Self::Int16(i) => Some(*i as i64),
            Self::Int32(i) => Some(*i as i64),
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Guid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}
