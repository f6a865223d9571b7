//! Test data generation for benchmarks.
//!
//! Generators are seeded so every run joins the same data.

use pagejoin_core::catalog::{ColumnType, Schema};
use pagejoin_core::query::{ExecutionContext, MemorySource};
use pagejoin_core::Error;
use pagejoin_proto::{Record, Value};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Scale factor for benchmark data generation.
#[derive(Clone, Copy, Debug, Default)]
pub enum Scale {
    /// 100 records per relation
    Tiny,
    /// 1,000 records per relation
    #[default]
    Small,
    /// 10,000 records per relation
    Medium,
}

impl Scale {
    /// Records per generated relation.
    pub fn count(&self) -> usize {
        match self {
            Scale::Tiny => 100,
            Scale::Small => 1_000,
            Scale::Medium => 10_000,
        }
    }
}

/// Schema of generated relations: `(key: int64, payload: string(16))`,
/// qualified with the relation name.
pub fn relation_schema(name: &str) -> Schema {
    Schema::new()
        .with_column("key", ColumnType::Int64)
        .with_column("payload", ColumnType::string(16))
        .qualified(name)
}

/// Generate `count` records whose keys are drawn from `0..key_domain`.
pub fn generate_records(count: usize, key_domain: i64, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let key = rng.gen_range(0..key_domain.max(1));
            let payload: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(16)
                .map(char::from)
                .collect();
            Record::new(vec![Value::Int64(key), Value::String(payload)])
        })
        .collect()
}

/// Generate a named relation laid out with the context's page size.
pub fn generate_relation(
    name: &str,
    scale: Scale,
    key_domain: i64,
    seed: u64,
    ctx: &ExecutionContext,
) -> Result<MemorySource, Error> {
    let records = generate_records(scale.count(), key_domain, seed);
    MemorySource::with_context(name, relation_schema(name), records, ctx)
}
