//! PageJoin Benchmark Suite
//!
//! Criterion benchmarks for the block nested loop join.
//!
//! # Benchmark Categories
//!
//! - **Work memory**: join time as the page budget grows
//! - **Selectivity**: join time as the key domain shrinks and matches grow
//! - **Nesting**: a three-way join built from two block nested loop joins

pub mod fixtures;

pub use fixtures::{generate_relation, Scale};
