//! Backtracking iterator over an in-memory record arena.

use std::sync::Arc;

use pagejoin_proto::Record;

use super::{BacktrackingIterator, RecordIterator};
use crate::error::Error;

/// Backtracking iterator over a shared slice of records.
///
/// Positions are plain indices into the arena, so marks are cheap and
/// several iterators may scan the same records independently.
#[derive(Debug, Clone)]
pub struct ArrayBacktrackingIterator {
    records: Arc<[Record]>,
    next_index: usize,
    prev_index: Option<usize>,
    mark_index: Option<usize>,
}

impl ArrayBacktrackingIterator {
    /// Iterate over owned records.
    pub fn new(records: Vec<Record>) -> Self {
        Self::shared(records.into())
    }

    /// Iterate over a shared arena.
    pub fn shared(records: Arc<[Record]>) -> Self {
        Self {
            records,
            next_index: 0,
            prev_index: None,
            mark_index: None,
        }
    }

    /// Total records in the arena, consumed or not.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the arena holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow the next record without cloning it.
    pub fn next_ref(&mut self) -> Option<&Record> {
        let index = self.next_index;
        let record = self.records.get(index)?;
        self.prev_index = Some(index);
        self.next_index += 1;
        Some(record)
    }
}

impl RecordIterator for ArrayBacktrackingIterator {
    fn has_next(&mut self) -> Result<bool, Error> {
        Ok(self.next_index < self.records.len())
    }

    fn next_record(&mut self) -> Result<Record, Error> {
        self.next_ref().cloned().ok_or(Error::Exhausted)
    }
}

impl BacktrackingIterator for ArrayBacktrackingIterator {
    fn mark_prev(&mut self) {
        if let Some(prev) = self.prev_index {
            self.mark_index = Some(prev);
        }
    }

    fn mark_next(&mut self) {
        self.mark_index = Some(self.next_index);
    }

    fn reset(&mut self) {
        if let Some(mark) = self.mark_index {
            self.next_index = mark;
            self.prev_index = None;
        }
    }
}
