//! Block nested loop join.
//!
//! Algorithm, with `B` pages of working memory:
//! 1. Read up to `B - 2` pages of the left input into a block.
//! 2. Scan the (materialized) right input one page at a time.
//! 3. For each right page, compare every record of the block against every
//!    record of the page, emitting concatenations of matching pairs.
//! 4. When the right input is exhausted, read the next left block and rescan
//!    the right input from its start.
//!
//! The left input is read exactly once; the right input is rescanned once per
//! left block.

use pagejoin_proto::Record;
use tracing::{debug, trace, warn};

use crate::catalog::Schema;
use crate::error::Error;
use crate::iterator::{
    block_iterator, ArrayBacktrackingIterator, BacktrackingIterator, RecordIterator,
};
use crate::metrics::SharedJoinMetrics;
use crate::storage::{pages_for, records_per_page, RESERVED_PAGES};

use super::context::ExecutionContext;
use super::cost::{estimate_bnlj_io_cost, estimate_nested_loop_comparisons, CostEstimate};
use super::join::JoinCondition;
use super::materialize::{materialize, MaterializeOperator};
use super::operator::QueryOperator;
use super::statistics::TableStats;

/// Equijoin of two operators using the block nested loop algorithm.
///
/// The right input is materialized at construction so it can be rescanned
/// once per left block.
pub struct BnljOperator {
    left: Box<dyn QueryOperator>,
    right: MaterializeOperator,
    condition: JoinCondition,
    output_schema: Schema,
    num_buffers: usize,
    page_size: usize,
    left_records_per_page: usize,
    metrics: SharedJoinMetrics,
    stats: TableStats,
}

impl BnljOperator {
    /// Build a join of `left.left_column = right.right_column`.
    ///
    /// Fails without touching either input when the page budget in `ctx` is
    /// below three pages, a record of either input (or of the output) does not
    /// fit in a page, or the join columns do not resolve to comparable types.
    /// Otherwise the right input is fully materialized before returning.
    pub fn new(
        left: Box<dyn QueryOperator>,
        right: Box<dyn QueryOperator>,
        left_column: &str,
        right_column: &str,
        ctx: &ExecutionContext,
    ) -> Result<Self, Error> {
        ctx.config().validate()?;

        let condition = JoinCondition::resolve(
            left.schema(),
            right.schema(),
            left_column,
            right_column,
            ctx.null_equality(),
        )?;

        let page_size = ctx.page_size();
        let left_records_per_page = records_per_page(page_size, left.schema())?;
        records_per_page(page_size, right.schema())?;
        let output_schema = left.schema().concat(right.schema());
        let output_records_per_page = records_per_page(page_size, &output_schema)?;

        let right = materialize(right, ctx)?;
        let stats = TableStats::join_estimate(
            &left.estimate_stats(),
            &right.estimate_stats(),
            output_records_per_page,
        );

        Ok(Self {
            left,
            right,
            condition,
            output_schema,
            num_buffers: ctx.work_mem_pages(),
            page_size,
            left_records_per_page,
            metrics: ctx.metrics().clone(),
            stats,
        })
    }

    /// Start a join scan.
    pub fn join_iter(&self) -> Result<BnljIterator<'_>, Error> {
        BnljIterator::new(self)
    }

    /// The left input.
    pub fn left(&self) -> &dyn QueryOperator {
        self.left.as_ref()
    }

    /// The materialized right input.
    pub fn right(&self) -> &MaterializeOperator {
        &self.right
    }

    /// The join predicate.
    pub fn condition(&self) -> &JoinCondition {
        &self.condition
    }

    /// Working memory in pages.
    pub fn num_buffers(&self) -> usize {
        self.num_buffers
    }

    /// Pages available to each left block.
    pub fn usable_pages(&self) -> usize {
        self.num_buffers - RESERVED_PAGES
    }

    /// Metrics sink this join reports into.
    pub fn metrics(&self) -> &SharedJoinMetrics {
        &self.metrics
    }
}

impl QueryOperator for BnljOperator {
    fn name(&self) -> &str {
        "BNLJ"
    }

    fn schema(&self) -> &Schema {
        &self.output_schema
    }

    fn iter(&self) -> Result<Box<dyn RecordIterator + '_>, Error> {
        Ok(Box::new(self.join_iter()?))
    }

    fn estimate_stats(&self) -> TableStats {
        self.stats
    }

    fn estimate_io_cost(&self) -> u64 {
        estimate_bnlj_io_cost(
            self.left.estimate_stats().num_pages(),
            self.usable_pages(),
            self.right.estimate_io_cost(),
            self.left.estimate_io_cost(),
        )
    }

    fn estimate_cost(&self) -> CostEstimate {
        let comparisons = estimate_nested_loop_comparisons(
            self.left.estimate_stats().num_records,
            self.right.estimate_stats().num_records,
        );
        let inputs_cpu = self.left.estimate_cost().cpu_cost + self.right.estimate_cost().cpu_cost;
        CostEstimate::new(
            self.stats.num_records,
            self.estimate_io_cost(),
            comparisons.saturating_add(inputs_cpu),
        )
    }

    fn children(&self) -> Vec<&dyn QueryOperator> {
        vec![self.left.as_ref(), &self.right as &dyn QueryOperator]
    }

    fn describe(&self) -> String {
        format!(
            "BNLJ on {} = {} (buffers: {})",
            self.condition.left_column(),
            self.condition.right_column(),
            self.num_buffers
        )
    }
}

/// Which cursor moves next, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Compare the current left record with the next record of the right page.
    CompareRight,
    /// Move to the next record of the left block and rewind the right page.
    AdvanceLeftRecord,
    /// Rewind the left block and load the next right page.
    AdvanceRightPage,
    /// Load the next left block and restart the right scan.
    AdvanceLeftBlock,
    /// Every cursor is exhausted.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Exhausted,
    Failed,
}

/// Pull-based iterator over a [`BnljOperator`]'s output.
///
/// Holds four cursors (left source, right source, left block, right page) and
/// at most one cached output record.
pub struct BnljIterator<'a> {
    op: &'a BnljOperator,
    left_source: Box<dyn RecordIterator + 'a>,
    right_source: Box<dyn BacktrackingIterator + 'a>,
    left_block: ArrayBacktrackingIterator,
    right_page: ArrayBacktrackingIterator,
    left_record: Option<Record>,
    cached: Option<Record>,
    state: State,
    blocks_fetched: u64,
    pages_fetched: u64,
    emitted: u64,
}

impl<'a> BnljIterator<'a> {
    fn new(op: &'a BnljOperator) -> Result<Self, Error> {
        let left_source = op.left.iter()?;
        let mut right_source = op.right.backtracking_iter()?;
        right_source.mark_next();

        let mut iter = Self {
            op,
            left_source,
            right_source,
            left_block: ArrayBacktrackingIterator::new(Vec::new()),
            right_page: ArrayBacktrackingIterator::new(Vec::new()),
            left_record: None,
            cached: None,
            state: State::Running,
            blocks_fetched: 0,
            pages_fetched: 0,
            emitted: 0,
        };

        debug!(
            join = %op.describe(),
            usable_pages = op.usable_pages(),
            right_records = op.right.len(),
            "Starting block nested loop join"
        );

        // Nothing can match an empty right side; leave the left input unread.
        if op.right.is_empty() {
            iter.finish();
            return Ok(iter);
        }

        iter.fetch_next_left_block()?;
        if iter.left_record.is_none() {
            iter.finish();
            return Ok(iter);
        }

        op.metrics.record_right_scan();
        iter.fetch_next_right_page()?;
        Ok(iter)
    }

    /// Load up to `B - 2` pages of the left input and take its first record.
    fn fetch_next_left_block(&mut self) -> Result<(), Error> {
        if !self.left_source.has_next()? {
            self.left_record = None;
            return Ok(());
        }

        let mut block = block_iterator(
            &mut self.left_source,
            self.op.left.schema(),
            self.op.usable_pages(),
            self.op.page_size,
        )?;
        block.mark_next();

        let pages = pages_for(block.len() as u64, self.op.left_records_per_page);
        self.blocks_fetched += 1;
        self.op.metrics.record_left_block(pages);
        debug!(
            block = self.blocks_fetched,
            records = block.len(),
            pages,
            "Fetched left block"
        );

        self.left_record = block.next_ref().cloned();
        self.left_block = block;
        Ok(())
    }

    /// Load the next page of the right input.
    fn fetch_next_right_page(&mut self) -> Result<(), Error> {
        if !self.right_source.has_next()? {
            self.right_page = ArrayBacktrackingIterator::new(Vec::new());
            return Ok(());
        }

        let mut page = block_iterator(
            &mut self.right_source,
            self.op.right.schema(),
            1,
            self.op.page_size,
        )?;
        page.mark_next();

        self.pages_fetched += 1;
        self.op.metrics.record_right_page();
        trace!(
            block = self.blocks_fetched,
            records = page.len(),
            "Fetched right page"
        );

        self.right_page = page;
        Ok(())
    }

    /// Pick the innermost cursor that can still move.
    fn next_step(&mut self) -> Result<Step, Error> {
        if self.right_page.has_next()? {
            Ok(Step::CompareRight)
        } else if self.left_block.has_next()? {
            Ok(Step::AdvanceLeftRecord)
        } else if self.right_source.has_next()? {
            Ok(Step::AdvanceRightPage)
        } else if self.left_source.has_next()? {
            Ok(Step::AdvanceLeftBlock)
        } else {
            Ok(Step::Done)
        }
    }

    /// Advance the state machine until a match is found or all input is used.
    fn fetch_next_record(&mut self) -> Result<Option<Record>, Error> {
        loop {
            match self.next_step()? {
                Step::CompareRight => {
                    let Some(right) = self.right_page.next_ref() else {
                        continue;
                    };
                    let Some(left) = self.left_record.as_ref() else {
                        continue;
                    };
                    self.op.metrics.record_comparison();
                    if self.op.condition.matches(left, right) {
                        return Ok(Some(left.concat(right)));
                    }
                }
                Step::AdvanceLeftRecord => {
                    self.left_record = self.left_block.next_ref().cloned();
                    self.right_page.reset();
                }
                Step::AdvanceRightPage => {
                    self.left_block.reset();
                    self.left_record = self.left_block.next_ref().cloned();
                    self.fetch_next_right_page()?;
                }
                Step::AdvanceLeftBlock => {
                    self.fetch_next_left_block()?;
                    self.right_source.reset();
                    self.op.metrics.record_right_scan();
                    self.fetch_next_right_page()?;
                }
                Step::Done => return Ok(None),
            }
        }
    }

    /// Enter the terminal state and release the block and page buffers.
    fn finish(&mut self) {
        self.state = State::Exhausted;
        self.left_block = ArrayBacktrackingIterator::new(Vec::new());
        self.right_page = ArrayBacktrackingIterator::new(Vec::new());
        self.left_record = None;

        debug!(
            emitted = self.emitted,
            left_blocks = self.blocks_fetched,
            right_pages = self.pages_fetched,
            "Block nested loop join completed"
        );
    }

    /// Whether the join has produced all of its output.
    pub fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }
}

impl RecordIterator for BnljIterator<'_> {
    fn has_next(&mut self) -> Result<bool, Error> {
        match self.state {
            State::Exhausted => return Ok(false),
            State::Failed => return Err(Error::Aborted),
            State::Running => {}
        }
        if self.cached.is_some() {
            return Ok(true);
        }

        match self.fetch_next_record() {
            Ok(Some(record)) => {
                self.emitted += 1;
                self.op.metrics.record_emitted();
                self.cached = Some(record);
                Ok(true)
            }
            Ok(None) => {
                self.finish();
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, emitted = self.emitted, "Block nested loop join aborted");
                self.state = State::Failed;
                Err(e)
            }
        }
    }

    fn next_record(&mut self) -> Result<Record, Error> {
        if !self.has_next()? {
            return Err(Error::Exhausted);
        }
        self.cached.take().ok_or(Error::Exhausted)
    }
}

impl Iterator for BnljIterator<'_> {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Failed {
            return None;
        }
        match self.has_next() {
            Ok(true) => Some(self.next_record()),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
