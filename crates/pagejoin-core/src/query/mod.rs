//! Query operators for PageJoin.
//!
//! This module implements the block nested loop join together with the
//! operators and utilities it is built from: in-memory sources, relation
//! materialization, join conditions, statistics, and the cost model.

mod bnlj;
mod context;
mod cost;
mod explain;
mod join;
mod materialize;
mod operator;
mod source;
mod statistics;

pub use bnlj::{BnljIterator, BnljOperator};
pub use context::ExecutionContext;
pub use cost::{estimate_bnlj_io_cost, estimate_nested_loop_comparisons, CostEstimate};
pub use explain::explain;
pub use join::{compare_values, JoinCondition};
pub use materialize::{materialize, MaterializeOperator};
pub use operator::QueryOperator;
pub use source::MemorySource;
pub use statistics::TableStats;
