//! PageJoin value and record types.
//!
//! This crate defines the runtime values and records that flow between query
//! operators, using rkyv for their byte encoding.
//!
//! # Modules
//!
//! - [`value`] - Column values
//! - [`record`] - Ordered tuples of values
//! - [`error`] - Encoding error types

pub mod error;
pub mod record;
pub mod value;

pub use error::Error;
pub use record::Record;
pub use value::Value;
