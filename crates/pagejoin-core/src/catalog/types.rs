//! Column type definitions.

use std::fmt;

use pagejoin_proto::Value;
use serde::{Deserialize, Serialize};

/// Fixed-width column types.
///
/// Every type has a fixed on-page size, which makes a schema's record size
/// (and therefore the number of records per page) a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    /// Boolean, 1 byte.
    Bool,
    /// 32-bit signed integer, 4 bytes.
    Int32,
    /// 64-bit signed integer, 8 bytes.
    Int64,
    /// 32-bit float, 4 bytes.
    Float32,
    /// 64-bit float, 8 bytes.
    Float64,
    /// String of at most `length` bytes, stored padded to `length`.
    String {
        /// Maximum length in bytes.
        length: usize,
    },
}

impl ColumnType {
    /// Create a fixed-length string type.
    pub fn string(length: usize) -> Self {
        ColumnType::String { length }
    }

    /// On-page size of a value of this type.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            ColumnType::Bool => 1,
            ColumnType::Int32 | ColumnType::Float32 => 4,
            ColumnType::Int64 | ColumnType::Float64 => 8,
            ColumnType::String { length } => *length,
        }
    }

    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Int32 | ColumnType::Int64 | ColumnType::Float32 | ColumnType::Float64
        )
    }

    /// Whether values of `self` and `other` can be compared for a join.
    ///
    /// Numeric types compare with each other; strings compare regardless of
    /// declared length.
    pub fn comparable_with(&self, other: &ColumnType) -> bool {
        match (self, other) {
            (ColumnType::Bool, ColumnType::Bool) => true,
            (ColumnType::String { .. }, ColumnType::String { .. }) => true,
            (a, b) => a.is_numeric() && b.is_numeric(),
        }
    }

    /// Whether a non-null value is a valid instance of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ColumnType::Bool, Value::Bool(_)) => true,
            (ColumnType::Int32, Value::Int32(_)) => true,
            (ColumnType::Int64, Value::Int64(_) | Value::Int32(_)) => true,
            (ColumnType::Float32, Value::Float32(_)) => true,
            (ColumnType::Float64, Value::Float64(_) | Value::Float32(_)) => true,
            (ColumnType::String { length }, Value::String(s)) => s.len() <= *length,
            _ => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Bool => write!(f, "bool"),
            ColumnType::Int32 => write!(f, "int32"),
            ColumnType::Int64 => write!(f, "int64"),
            ColumnType::Float32 => write!(f, "float32"),
            ColumnType::Float64 => write!(f, "float64"),
            ColumnType::String { length } => write!(f, "string({})", length),
        }
    }
}
