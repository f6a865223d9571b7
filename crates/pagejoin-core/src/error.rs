//! Core error types.

use thiserror::Error;

/// Errors raised by operators, iterators, and configuration checks.
#[derive(Debug, Error)]
pub enum Error {
    /// A record was requested from an iterator with nothing left to yield.
    #[error("iterator exhausted")]
    Exhausted,

    /// Operator configuration cannot be satisfied (page budget, page size).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A column name did not resolve against a schema.
    #[error("column not found: {column}")]
    ColumnNotFound { column: String },

    /// An unqualified column name matched more than one field.
    #[error("ambiguous column: {column}")]
    AmbiguousColumn { column: String },

    /// Join columns whose types can never compare equal.
    #[error("cannot join {left} ({left_type}) with {right} ({right_type})")]
    IncomparableColumns {
        left: String,
        left_type: String,
        right: String,
        right_type: String,
    },

    /// A record does not conform to its schema.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The operator cannot produce a backtracking iterator.
    #[error("operator {operator} does not support backtracking")]
    BacktrackingUnsupported { operator: String },

    /// Failure reported by an underlying record source.
    #[error("source error: {0}")]
    Source(String),

    /// The iterator was used again after an earlier failure aborted it.
    #[error("join aborted by an earlier failure")]
    Aborted,
}
