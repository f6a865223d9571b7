//! Records: ordered tuples of column values.

use rkyv::{Archive, Deserialize, Serialize};

use crate::error::Error;
use crate::value::Value;

/// An ordered tuple of values conforming to some schema.
#[derive(Debug, Clone, PartialEq, Default, Archive, Serialize, Deserialize)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    /// Create a record from its values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// All values in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at the given column position.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Concatenate `other` after this record's columns.
    pub fn concat(&self, other: &Record) -> Record {
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        values.extend_from_slice(&self.values);
        values.extend_from_slice(&other.values);
        Record { values }
    }

    /// Consume the record, returning its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Serialize the record to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a record from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

impl From<Vec<Value>> for Record {
    fn from(values: Vec<Value>) -> Self {
        Record::new(values)
    }
}

/// Build a record from a list of expressions convertible into [`Value`].
///
/// ```
/// use pagejoin_proto::{record, Value};
///
/// let r = record![1, "a"];
/// assert_eq!(r.get(1), Some(&Value::from("a")));
/// ```
#[macro_export]
macro_rules! record {
    ($($value:expr),* $(,)?) => {
        $crate::Record::new(vec![$($crate::Value::from($value)),*])
    };
}
