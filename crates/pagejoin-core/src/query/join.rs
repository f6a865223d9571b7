//! Equijoin conditions and key comparison.

use std::cmp::Ordering;

use pagejoin_proto::{Record, Value};

use crate::catalog::Schema;
use crate::error::Error;
use crate::storage::NullEquality;

/// A resolved `left.column = right.column` join predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCondition {
    left_column: String,
    right_column: String,
    left_index: usize,
    right_index: usize,
    null_equality: NullEquality,
}

impl JoinCondition {
    /// Resolve both column names and check their types can compare.
    pub fn resolve(
        left_schema: &Schema,
        right_schema: &Schema,
        left_column: &str,
        right_column: &str,
        null_equality: NullEquality,
    ) -> Result<Self, Error> {
        let left_index = left_schema.field_index(left_column)?;
        let right_index = right_schema.field_index(right_column)?;

        // Both indices were just resolved, so the fields exist.
        let left_field = &left_schema.fields()[left_index];
        let right_field = &right_schema.fields()[right_index];
        if !left_field.column_type.comparable_with(&right_field.column_type) {
            return Err(Error::IncomparableColumns {
                left: left_field.name.clone(),
                left_type: left_field.column_type.to_string(),
                right: right_field.name.clone(),
                right_type: right_field.column_type.to_string(),
            });
        }

        Ok(Self {
            left_column: left_column.to_string(),
            right_column: right_column.to_string(),
            left_index,
            right_index,
            null_equality,
        })
    }

    /// Left join column as given.
    pub fn left_column(&self) -> &str {
        &self.left_column
    }

    /// Right join column as given.
    pub fn right_column(&self) -> &str {
        &self.right_column
    }

    /// Position of the join column in left records.
    pub fn left_index(&self) -> usize {
        self.left_index
    }

    /// Position of the join column in right records.
    pub fn right_index(&self) -> usize {
        self.right_index
    }

    /// Null semantics in effect.
    pub fn null_equality(&self) -> NullEquality {
        self.null_equality
    }

    /// Three-way comparison of the two records' join keys.
    ///
    /// `None` means the keys are incomparable (null under `Distinct`
    /// semantics, NaN, or mismatched kinds) and therefore never match.
    pub fn compare(&self, left: &Record, right: &Record) -> Option<Ordering> {
        let l = left.get(self.left_index)?;
        let r = right.get(self.right_index)?;
        compare_values(l, r, self.null_equality)
    }

    /// Whether the two records join.
    pub fn matches(&self, left: &Record, right: &Record) -> bool {
        self.compare(left, right) == Some(Ordering::Equal)
    }
}

/// Compare two join key values.
///
/// Numeric values compare exactly across widths and between integers and
/// floats; NaN compares with nothing. Nulls are only ever equal to each
/// other, and only under [`NullEquality::Match`].
pub fn compare_values(a: &Value, b: &Value, nulls: NullEquality) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => match nulls {
            NullEquality::Match => Some(Ordering::Equal),
            NullEquality::Distinct => None,
        },
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (x, y) => match (x.as_i64(), y.as_i64()) {
            (Some(i), Some(j)) => Some(i.cmp(&j)),
            (Some(i), None) => compare_int_float(i, y.as_f64()?),
            (None, Some(j)) => compare_int_float(j, x.as_f64()?).map(Ordering::reverse),
            (None, None) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
    }
}

/// Exact comparison of an integer with a float, without rounding the integer.
fn compare_int_float(i: i64, f: f64) -> Option<Ordering> {
    // 2^63, the first float above every i64
    const I64_END: f64 = 9_223_372_036_854_775_808.0;

    if f.is_nan() {
        return None;
    }
    if f >= I64_END {
        return Some(Ordering::Less);
    }
    if f < -I64_END {
        return Some(Ordering::Greater);
    }

    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)),
        ord => Some(ord),
    }
}
