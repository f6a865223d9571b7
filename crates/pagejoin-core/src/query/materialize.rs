//! Relation materialization.
//!
//! Turns any operator into one that supports unlimited backtracking rescans by
//! copying its full output into an immutable in-memory snapshot.

use std::sync::Arc;

use pagejoin_proto::Record;
use tracing::debug;

use crate::catalog::Schema;
use crate::error::Error;
use crate::iterator::{
    collect_records, ArrayBacktrackingIterator, BacktrackingIterator, RecordIterator,
};
use crate::storage::records_per_page;

use super::context::ExecutionContext;
use super::cost::CostEstimate;
use super::operator::QueryOperator;
use super::statistics::TableStats;

/// An operator backed by a one-time copy of its source's output.
pub struct MaterializeOperator {
    source: Box<dyn QueryOperator>,
    records: Arc<[Record]>,
    records_per_page: usize,
}

/// Eagerly materialize `source`.
///
/// The source is scanned exactly once, here. Any failure during that scan is
/// returned unchanged.
pub fn materialize(
    source: Box<dyn QueryOperator>,
    ctx: &ExecutionContext,
) -> Result<MaterializeOperator, Error> {
    let records_per_page = records_per_page(ctx.page_size(), source.schema())?;
    let records = {
        let mut iter = source.iter()?;
        collect_records(&mut iter)?
    };

    debug!(
        source = %source.describe(),
        records = records.len(),
        pages = crate::storage::pages_for(records.len() as u64, records_per_page),
        "Materialized relation"
    );

    Ok(MaterializeOperator {
        source,
        records: records.into(),
        records_per_page,
    })
}

impl MaterializeOperator {
    /// The operator that was materialized.
    pub fn source(&self) -> &dyn QueryOperator {
        self.source.as_ref()
    }

    /// Number of materialized records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl QueryOperator for MaterializeOperator {
    fn name(&self) -> &str {
        "Materialize"
    }

    fn schema(&self) -> &Schema {
        self.source.schema()
    }

    fn iter(&self) -> Result<Box<dyn RecordIterator + '_>, Error> {
        Ok(Box::new(ArrayBacktrackingIterator::shared(self.records.clone())))
    }

    fn backtracking_iter(&self) -> Result<Box<dyn BacktrackingIterator + '_>, Error> {
        Ok(Box::new(ArrayBacktrackingIterator::shared(self.records.clone())))
    }

    fn supports_backtracking(&self) -> bool {
        true
    }

    fn estimate_stats(&self) -> TableStats {
        TableStats::new(self.records.len() as u64, self.records_per_page)
    }

    // Re-reading the snapshot costs what producing the source costs.
    fn estimate_io_cost(&self) -> u64 {
        self.source.estimate_io_cost()
    }

    fn estimate_cost(&self) -> CostEstimate {
        let source = self.source.estimate_cost();
        CostEstimate::new(self.records.len() as u64, source.io_cost, source.cpu_cost)
    }

    fn children(&self) -> Vec<&dyn QueryOperator> {
        vec![self.source.as_ref()]
    }
}
