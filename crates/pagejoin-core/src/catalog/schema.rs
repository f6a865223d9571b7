//! Record schemas: ordered, named, typed columns.

use std::fmt;

use pagejoin_proto::Record;
use serde::{Deserialize, Serialize};

use super::types::ColumnType;
use crate::error::Error;

/// A single named column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name, optionally qualified as `table.column`.
    pub name: String,
    /// Column type.
    #[serde(flatten)]
    pub column_type: ColumnType,
    /// Whether the column admits `Null`.
    #[serde(default)]
    pub nullable: bool,
}

impl Field {
    /// Create a non-nullable field.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
        }
    }

    /// Create a nullable field.
    pub fn nullable(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
        }
    }

    /// The name without any `table.` qualifier.
    pub fn unqualified_name(&self) -> &str {
        unqualified(&self.name)
    }

    fn matches(&self, column: &str) -> bool {
        if self.name == column {
            return true;
        }
        // `t.col` asked, `col` stored: match on the column part.
        // `col` asked, `t.col` stored: match on the stored column part.
        if column.contains('.') {
            !self.name.contains('.') && unqualified(column) == self.name
        } else {
            self.unqualified_name() == column
        }
    }
}

fn unqualified(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, col)| col).unwrap_or(name)
}

/// An ordered list of fields, immutable once handed to an operator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schema from a list of fields.
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Add a non-nullable column.
    pub fn with_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.fields.push(Field::new(name, column_type));
        self
    }

    /// Add a nullable column.
    pub fn with_nullable_column(
        mut self,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        self.fields.push(Field::nullable(name, column_type));
        self
    }

    /// All fields in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field at a position.
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fixed size of one record of this schema.
    ///
    /// `None` when the column sizes overflow `usize`.
    pub fn size_in_bytes(&self) -> Option<usize> {
        self.fields
            .iter()
            .try_fold(0usize, |acc, f| acc.checked_add(f.column_type.size_in_bytes()))
    }

    /// Resolve a column name to its position.
    ///
    /// Accepts exact names and `table.column` qualified names. An unqualified
    /// name that matches several qualified fields is ambiguous.
    pub fn field_index(&self, column: &str) -> Result<usize, Error> {
        if let Some(idx) = self.fields.iter().position(|f| f.name == column) {
            return Ok(idx);
        }

        let mut matches = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.matches(column))
            .map(|(i, _)| i);

        match (matches.next(), matches.next()) {
            (Some(idx), None) => Ok(idx),
            (Some(_), Some(_)) => Err(Error::AmbiguousColumn {
                column: column.to_string(),
            }),
            (None, _) => Err(Error::ColumnNotFound {
                column: column.to_string(),
            }),
        }
    }

    /// Schema of `self` followed by `other`, as produced by a join.
    pub fn concat(&self, other: &Schema) -> Schema {
        let mut fields = Vec::with_capacity(self.fields.len() + other.fields.len());
        fields.extend_from_slice(&self.fields);
        fields.extend_from_slice(&other.fields);
        Schema { fields }
    }

    /// Copy of this schema with every field qualified by `table`.
    ///
    /// Already-qualified fields are left untouched.
    pub fn qualified(&self, table: &str) -> Schema {
        let fields = self
            .fields
            .iter()
            .map(|f| {
                let mut f = f.clone();
                if !f.name.contains('.') {
                    f.name = format!("{}.{}", table, f.name);
                }
                f
            })
            .collect();
        Schema { fields }
    }

    /// Check that a record fits this schema: width, types, nullability.
    pub fn verify(&self, record: &Record) -> Result<(), Error> {
        if record.len() != self.fields.len() {
            return Err(Error::SchemaMismatch(format!(
                "expected {} columns, record has {}",
                self.fields.len(),
                record.len()
            )));
        }

        for (field, value) in self.fields.iter().zip(record.values()) {
            if value.is_null() {
                if !field.nullable {
                    return Err(Error::SchemaMismatch(format!(
                        "column '{}' is not nullable",
                        field.name
                    )));
                }
                continue;
            }
            if !field.column_type.accepts(value) {
                return Err(Error::SchemaMismatch(format!(
                    "column '{}' of type {} cannot hold {} value {}",
                    field.name,
                    field.column_type,
                    value.kind(),
                    value
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field.name, field.column_type)?;
            if field.nullable {
                write!(f, "?")?;
            }
        }
        write!(f, ")")
    }
}
