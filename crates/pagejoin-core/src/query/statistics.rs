//! Cardinality statistics used by the cost model.

use crate::storage::pages_for;

/// Estimated size of an operator's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableStats {
    /// Estimated number of records.
    pub num_records: u64,
    /// Records that fit in one page of the operator's schema.
    pub records_per_page: usize,
}

impl TableStats {
    /// Create statistics for `num_records` records.
    pub fn new(num_records: u64, records_per_page: usize) -> Self {
        Self {
            num_records,
            records_per_page,
        }
    }

    /// Estimated number of pages.
    pub fn num_pages(&self) -> u64 {
        pages_for(self.num_records, self.records_per_page)
    }

    /// Estimate the output of an equijoin of `left` and `right`.
    ///
    /// Assumes the join key is unique on the larger input, so each record of
    /// the smaller side matches about one record of the larger:
    /// `|L| * |R| / max(|L|, |R|)`.
    pub fn join_estimate(left: &TableStats, right: &TableStats, records_per_page: usize) -> Self {
        let larger = left.num_records.max(right.num_records);
        let num_records = if larger == 0 {
            0
        } else {
            let product = left.num_records as u128 * right.num_records as u128;
            (product / larger as u128) as u64
        };
        Self::new(num_records, records_per_page)
    }
}
