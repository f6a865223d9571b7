//! Cost model for planning.
//!
//! Estimates are planning aids, not exact counts of runtime page reads: they
//! ignore any caching of pages across block boundaries.

/// Cost estimate for an operator subtree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostEstimate {
    /// Estimated number of output records.
    pub estimated_rows: u64,
    /// Estimated page I/Os.
    pub io_cost: u64,
    /// Estimated record comparisons.
    pub cpu_cost: u64,
    /// Weighted total (io_cost * IO_WEIGHT + cpu_cost * CPU_WEIGHT).
    pub total_cost: f64,
}

impl CostEstimate {
    /// Weight for I/O operations in total cost calculation.
    pub const IO_WEIGHT: f64 = 10.0;
    /// Weight for CPU operations in total cost calculation.
    pub const CPU_WEIGHT: f64 = 1.0;

    /// Create a new cost estimate.
    pub fn new(estimated_rows: u64, io_cost: u64, cpu_cost: u64) -> Self {
        let total_cost = (io_cost as f64 * Self::IO_WEIGHT) + (cpu_cost as f64 * Self::CPU_WEIGHT);
        Self {
            estimated_rows,
            io_cost,
            cpu_cost,
            total_cost,
        }
    }

    /// Create a zero-cost estimate.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Page I/Os of a block nested loop join.
///
/// The left input is read once (`left_cost`) and cut into
/// `ceil(left_pages / usable_pages)` blocks; the right input is produced once
/// per block (`right_cost` each).
///
/// `usable_pages` below 1 is treated as 1.
pub fn estimate_bnlj_io_cost(
    left_pages: u64,
    usable_pages: usize,
    right_cost: u64,
    left_cost: u64,
) -> u64 {
    let usable = usable_pages.max(1) as u64;
    let blocks = left_pages.div_ceil(usable);
    blocks.saturating_mul(right_cost).saturating_add(left_cost)
}

/// Record comparisons of a nested loop join: every left record meets every
/// right record once.
pub fn estimate_nested_loop_comparisons(left_records: u64, right_records: u64) -> u64 {
    left_records.saturating_mul(right_records)
}
