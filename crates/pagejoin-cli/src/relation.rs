//! Loading relations from JSON files.
//!
//! ```json
//! {
//!   "name": "users",
//!   "columns": [
//!     {"name": "id", "type": "int32"},
//!     {"name": "name", "type": "string", "length": 16, "nullable": true}
//!   ],
//!   "rows": [[1, "Alice"], [2, null]]
//! }
//! ```
//!
//! Columns are qualified with the relation name, so `id` above becomes
//! `users.id` and can be referenced either way.

use std::path::Path;

use anyhow::{bail, Context};
use pagejoin_core::catalog::{ColumnType, Field, Schema};
use pagejoin_core::proto::{Record, Value};
use pagejoin_core::query::{ExecutionContext, MemorySource};
use serde::Deserialize;

/// On-disk relation description.
#[derive(Debug, Deserialize)]
pub struct RelationFile {
    pub name: String,
    pub columns: Vec<Field>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl RelationFile {
    /// Schema with every column qualified by the relation name.
    pub fn schema(&self) -> Schema {
        Schema::from_fields(self.columns.clone()).qualified(&self.name)
    }

    /// Convert the JSON rows into typed records.
    pub fn records(&self) -> anyhow::Result<Vec<Record>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() != self.columns.len() {
                    bail!(
                        "row {} of '{}' has {} values, expected {}",
                        i,
                        self.name,
                        row.len(),
                        self.columns.len()
                    );
                }
                let values = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(field, json)| {
                        json_to_value(json, &field.column_type).with_context(|| {
                            format!("row {} of '{}', column '{}'", i, self.name, field.name)
                        })
                    })
                    .collect::<anyhow::Result<Vec<Value>>>()?;
                Ok(Record::new(values))
            })
            .collect()
    }

    /// Build a scannable relation laid out with the context's page size.
    pub fn into_source(self, ctx: &ExecutionContext) -> anyhow::Result<MemorySource> {
        let schema = self.schema();
        let records = self.records()?;
        let source = MemorySource::with_context(self.name.as_str(), schema, records, ctx)
            .with_context(|| format!("invalid relation '{}'", self.name))?;
        Ok(source)
    }
}

/// Parse a relation from JSON text.
pub fn parse_relation(text: &str) -> anyhow::Result<RelationFile> {
    let relation: RelationFile = serde_json::from_str(text)?;
    if relation.name.is_empty() {
        bail!("relation name must not be empty");
    }
    if relation.columns.is_empty() {
        bail!("relation '{}' has no columns", relation.name);
    }
    Ok(relation)
}

/// Read a relation file and turn it into a scannable source.
pub fn load_relation(path: &Path, ctx: &ExecutionContext) -> anyhow::Result<MemorySource> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let relation =
        parse_relation(&text).with_context(|| format!("failed to parse {}", path.display()))?;

    tracing::debug!(
        relation = %relation.name,
        columns = relation.columns.len(),
        rows = relation.rows.len(),
        "Loaded relation file"
    );

    relation.into_source(ctx)
}

/// Convert one JSON value to a value of the given column type.
///
/// `null` is passed through; nullability is checked against the schema later.
fn json_to_value(json: &serde_json::Value, column_type: &ColumnType) -> anyhow::Result<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }

    let value = match column_type {
        ColumnType::Bool => json.as_bool().map(Value::Bool),
        ColumnType::Int32 => json
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::Int32),
        ColumnType::Int64 => json.as_i64().map(Value::Int64),
        ColumnType::Float32 => json.as_f64().map(|f| Value::Float32(f as f32)),
        ColumnType::Float64 => json.as_f64().map(Value::Float64),
        ColumnType::String { .. } => json.as_str().map(|s| Value::String(s.to_string())),
    };

    match value {
        Some(v) => Ok(v),
        None => bail!("expected {}, found {}", column_type, json),
    }
}
