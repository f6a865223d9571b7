//! The query operator interface.

use crate::catalog::Schema;
use crate::error::Error;
use crate::iterator::{BacktrackingIterator, RecordIterator};

use super::cost::CostEstimate;
use super::statistics::TableStats;

/// A node of a lazily evaluated query plan.
///
/// Operators describe their output (schema, statistics, cost) and hand out
/// iterators over it. Iterators borrow the operator, so the plan must outlive
/// any scan of it.
pub trait QueryOperator {
    /// Short operator name, e.g. `"Scan"` or `"BNLJ"`.
    fn name(&self) -> &str;

    /// Output schema.
    fn schema(&self) -> &Schema;

    /// Start a forward scan of the output.
    fn iter(&self) -> Result<Box<dyn RecordIterator + '_>, Error>;

    /// Start a scan that can be marked and reset.
    fn backtracking_iter(&self) -> Result<Box<dyn BacktrackingIterator + '_>, Error> {
        Err(Error::BacktrackingUnsupported {
            operator: self.name().to_string(),
        })
    }

    /// Whether [`QueryOperator::backtracking_iter`] is available.
    fn supports_backtracking(&self) -> bool {
        false
    }

    /// Estimated output size.
    fn estimate_stats(&self) -> TableStats;

    /// Estimated page I/Os to produce the full output once.
    fn estimate_io_cost(&self) -> u64;

    /// Combined cost estimate.
    fn estimate_cost(&self) -> CostEstimate {
        CostEstimate::new(self.estimate_stats().num_records, self.estimate_io_cost(), 0)
    }

    /// Input operators, left to right.
    fn children(&self) -> Vec<&dyn QueryOperator> {
        Vec::new()
    }

    /// One-line label used by explain output.
    fn describe(&self) -> String {
        self.name().to_string()
    }
}
