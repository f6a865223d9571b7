//! PageJoin Core - page-budgeted join execution.
//!
//! This crate provides the block nested loop join operator along with the
//! schema, iterator, page layout, and metrics pieces it runs on.

pub mod catalog;
pub mod error;
pub mod iterator;
pub mod metrics;
pub mod query;
pub mod storage;

pub use catalog::{ColumnType, Field, Schema};
pub use error::Error;
pub use iterator::{ArrayBacktrackingIterator, BacktrackingIterator, RecordIterator};
pub use metrics::{new_shared_metrics, JoinMetrics, JoinMetricsSnapshot, SharedJoinMetrics};
pub use query::{
    explain, materialize, BnljIterator, BnljOperator, CostEstimate, ExecutionContext,
    MaterializeOperator, MemorySource, QueryOperator, TableStats,
};
pub use storage::{ExecutionConfig, NullEquality};

/// Re-export record types.
pub use pagejoin_proto as proto;
