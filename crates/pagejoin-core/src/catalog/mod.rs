//! Schema and column type definitions.

mod schema;
mod types;

pub use schema::{Field, Schema};
pub use types::ColumnType;
