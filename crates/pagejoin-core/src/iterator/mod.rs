//! Record iterators.
//!
//! Operators hand out [`RecordIterator`]s. Some also hand out
//! [`BacktrackingIterator`]s, which can rewind to a marked position so the
//! same records can be scanned repeatedly without reading them again from
//! their source.

mod backtracking;
mod block;

pub use backtracking::ArrayBacktrackingIterator;
pub use block::block_iterator;

use pagejoin_proto::Record;

use crate::error::Error;

/// A fallible, pull-based stream of records.
pub trait RecordIterator {
    /// Whether another record is available.
    ///
    /// May do work (and fail) to find out. Calling it repeatedly without
    /// consuming a record returns the same answer.
    fn has_next(&mut self) -> Result<bool, Error>;

    /// Take the next record.
    ///
    /// Fails with [`Error::Exhausted`] when there is none.
    fn next_record(&mut self) -> Result<Record, Error>;
}

/// An iterator that can rewind to a marked position.
pub trait BacktrackingIterator: RecordIterator {
    /// Mark the record most recently returned by `next_record`, so that
    /// `reset` makes it the next record again. No-op before the first record.
    fn mark_prev(&mut self);

    /// Mark the record that `next_record` would return next.
    fn mark_next(&mut self);

    /// Rewind to the mark. No-op when nothing has been marked.
    fn reset(&mut self);
}

impl<T: RecordIterator + ?Sized> RecordIterator for Box<T> {
    fn has_next(&mut self) -> Result<bool, Error> {
        (**self).has_next()
    }

    fn next_record(&mut self) -> Result<Record, Error> {
        (**self).next_record()
    }
}

impl<T: BacktrackingIterator + ?Sized> BacktrackingIterator for Box<T> {
    fn mark_prev(&mut self) {
        (**self).mark_prev()
    }

    fn mark_next(&mut self) {
        (**self).mark_next()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Drain every remaining record from an iterator.
pub fn collect_records<I: RecordIterator + ?Sized>(iter: &mut I) -> Result<Vec<Record>, Error> {
    let mut records = Vec::new();
    while iter.has_next()? {
        records.push(iter.next_record()?);
    }
    Ok(records)
}
