//! In-memory relation scan.

use std::sync::Arc;

use pagejoin_proto::Record;

use crate::catalog::Schema;
use crate::error::Error;
use crate::iterator::{ArrayBacktrackingIterator, BacktrackingIterator, RecordIterator};
use crate::storage::records_per_page;

use super::context::ExecutionContext;
use super::operator::QueryOperator;
use super::statistics::TableStats;

/// A named relation held in memory, scanned page by page.
///
/// Every record is checked against the schema at construction.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    schema: Schema,
    records: Arc<[Record]>,
    records_per_page: usize,
}

impl MemorySource {
    /// Create a relation with the given page size.
    pub fn new(
        name: impl Into<String>,
        schema: Schema,
        records: Vec<Record>,
        page_size: usize,
    ) -> Result<Self, Error> {
        for record in &records {
            schema.verify(record)?;
        }
        let records_per_page = records_per_page(page_size, &schema)?;

        Ok(Self {
            name: name.into(),
            schema,
            records: records.into(),
            records_per_page,
        })
    }

    /// Create a relation using the context's page size.
    pub fn with_context(
        name: impl Into<String>,
        schema: Schema,
        records: Vec<Record>,
        ctx: &ExecutionContext,
    ) -> Result<Self, Error> {
        Self::new(name, schema, records, ctx.page_size())
    }

    /// Relation name.
    pub fn relation_name(&self) -> &str {
        &self.name
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the relation holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that fit in one page.
    pub fn records_per_page(&self) -> usize {
        self.records_per_page
    }
}

impl QueryOperator for MemorySource {
    fn name(&self) -> &str {
        "Scan"
    }

    fn schema(&self) -> &Schema {
        &self.schema
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

    fn estimate_io_cost(&self) -> u64 {
        self.estimate_stats().num_pages()
    }

    fn describe(&self) -> String {
        format!("Scan {}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColumnType;
    use crate::iterator::collect_records;
    use pagejoin_proto::record;

    fn schema() -> Schema {
        Schema::new()
            .with_column("id", ColumnType::Int32)
            .with_column("tag", ColumnType::Int32)
    }

    #[test]
    fn test_scan_and_stats() {
        let records = (0..5).map(|i| record![i, i * 10]).collect();
        let source = MemorySource::new("t", schema(), records, 17).unwrap();

        assert_eq!(source.records_per_page(), 2);
        assert_eq!(source.estimate_stats().num_pages(), 3);
        assert_eq!(source.estimate_io_cost(), 3);

        let mut iter = source.iter().unwrap();
        let scanned = collect_records(&mut iter).unwrap();
        assert_eq!(scanned.len(), 5);
        assert_eq!(scanned[4], record![4, 40]);
    }

    #[test]
    fn test_rejects_bad_record() {
        let records = vec![record![1, 2], record![3]];
        let result = MemorySource::new("t", schema(), records, 4096);
        assert!(matches!(result, Err(Error::SchemaMismatch(_))));
    }

    #[test]
    fn test_rejects_page_size_overflow() {
        let ctx = ExecutionContext::new(
            crate::storage::ExecutionConfig::new(3).with_page_size(usize::MAX),
        );
        let result = MemorySource::with_context("t", schema(), vec![record![1, 2]], &ctx);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_backtracking_scan() {
        let records = (0..3).map(|i| record![i, i]).collect();
        let source = MemorySource::new("t", schema(), records, 4096).unwrap();
        assert!(source.supports_backtracking());

        let mut iter = source.backtracking_iter().unwrap();
        iter.mark_next();
        let first = iter.next_record().unwrap();
        iter.next_record().unwrap();
        iter.reset();
        assert_eq!(iter.next_record().unwrap(), first);
    }
}
