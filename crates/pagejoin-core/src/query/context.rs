//! Execution context handed to operators at construction.

use crate::metrics::{new_shared_metrics, SharedJoinMetrics};
use crate::storage::{ExecutionConfig, NullEquality};

/// Per-query execution context.
///
/// Carries the configuration (page budget, page size, null semantics) and the
/// metrics sink shared by every operator built from this context.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    config: ExecutionConfig,
    metrics: SharedJoinMetrics,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(ExecutionConfig::default())
    }
}

impl ExecutionContext {
    /// Create a context with fresh metrics.
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            config,
            metrics: new_shared_metrics(),
        }
    }

    /// Create a context granting `work_mem_pages` pages, other settings default.
    pub fn with_work_mem(work_mem_pages: usize) -> Self {
        Self::new(ExecutionConfig::new(work_mem_pages))
    }

    /// Report into an existing metrics sink.
    pub fn with_metrics(mut self, metrics: SharedJoinMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Working memory in pages.
    pub fn work_mem_pages(&self) -> usize {
        self.config.work_mem_pages
    }

    /// Page size in bytes.
    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Null join key semantics.
    pub fn null_equality(&self) -> NullEquality {
        self.config.null_equality
    }

    /// The metrics sink.
    pub fn metrics(&self) -> &SharedJoinMetrics {
        &self.metrics
    }
}
