//! Join execution metrics.
//!
//! Counters are updated by join iterators as they run and can be read at any
//! time through a [`JoinMetricsSnapshot`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters describing the work done by block nested loop joins.
#[derive(Debug, Default)]
pub struct JoinMetrics {
    left_blocks_fetched: AtomicU64,
    right_pages_fetched: AtomicU64,
    right_scans: AtomicU64,
    comparisons: AtomicU64,
    records_emitted: AtomicU64,
    max_block_pages: AtomicU64,
}

/// Shared handle to join metrics.
pub type SharedJoinMetrics = Arc<JoinMetrics>;

/// Create a new shared metrics handle.
pub fn new_shared_metrics() -> SharedJoinMetrics {
    Arc::new(JoinMetrics::new())
}

impl JoinMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a left block fetch spanning `pages` pages.
    pub fn record_left_block(&self, pages: u64) {
        self.left_blocks_fetched.fetch_add(1, Ordering::Relaxed);
        self.max_block_pages.fetch_max(pages, Ordering::Relaxed);
    }

    /// Record a right page fetch.
    pub fn record_right_page(&self) {
        self.right_pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the start of a full scan of the right relation.
    pub fn record_right_scan(&self) {
        self.right_scans.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a key comparison.
    pub fn record_comparison(&self) {
        self.comparisons.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an emitted output record.
    pub fn record_emitted(&self) {
        self.records_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> JoinMetricsSnapshot {
        JoinMetricsSnapshot {
            left_blocks_fetched: self.left_blocks_fetched.load(Ordering::Relaxed),
            right_pages_fetched: self.right_pages_fetched.load(Ordering::Relaxed),
            right_scans: self.right_scans.load(Ordering::Relaxed),
            comparisons: self.comparisons.load(Ordering::Relaxed),
            records_emitted: self.records_emitted.load(Ordering::Relaxed),
            max_block_pages: self.max_block_pages.load(Ordering::Relaxed),
        }
    }

    /// Zero all counters.
    pub fn reset(&self) {
        self.left_blocks_fetched.store(0, Ordering::Relaxed);
        self.right_pages_fetched.store(0, Ordering::Relaxed);
        self.right_scans.store(0, Ordering::Relaxed);
        self.comparisons.store(0, Ordering::Relaxed);
        self.records_emitted.store(0, Ordering::Relaxed);
        self.max_block_pages.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`JoinMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoinMetricsSnapshot {
    /// Left blocks materialized.
    pub left_blocks_fetched: u64,
    /// Right pages materialized, across all right scans.
    pub right_pages_fetched: u64,
    /// Full scans of the right relation started.
    pub right_scans: u64,
    /// Join key comparisons performed.
    pub comparisons: u64,
    /// Output records produced.
    pub records_emitted: u64,
    /// Largest left block seen, in pages.
    pub max_block_pages: u64,
}
