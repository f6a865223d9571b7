//! Block materialization: copy up to N pages of records out of a stream.

use crate::catalog::Schema;
use crate::error::Error;
use crate::storage::records_per_page;

use super::{ArrayBacktrackingIterator, BacktrackingIterator, RecordIterator};

/// Pull up to `max_pages` pages worth of records from `source` into memory.
///
/// The page capacity comes from `schema` and `page_size`. The returned
/// iterator is positioned at its first record and already marked there, so
/// `reset` rewinds to the start of the block. Records beyond the budget stay
/// in `source`. An exhausted source yields an empty block.
pub fn block_iterator<I: RecordIterator + ?Sized>(
    source: &mut I,
    schema: &Schema,
    max_pages: usize,
    page_size: usize,
) -> Result<ArrayBacktrackingIterator, Error> {
    let per_page = records_per_page(page_size, schema)?;
    let max_records = per_page.saturating_mul(max_pages);

    let mut records = Vec::with_capacity(max_records.min(4096));
    while records.len() < max_records && source.has_next()? {
        records.push(source.next_record()?);
    }

    let mut block = ArrayBacktrackingIterator::new(records);
    block.mark_next();
    Ok(block)
}
