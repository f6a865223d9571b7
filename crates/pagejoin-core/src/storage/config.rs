//! Execution configuration.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default page size in bytes.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Default working memory, in pages, granted to a join.
pub const DEFAULT_WORK_MEM_PAGES: usize = 5;

/// Pages a block nested loop join keeps for itself: one right input page and
/// one output page.
pub const RESERVED_PAGES: usize = 2;

/// Smallest budget that leaves at least one page for the left block.
pub const MIN_WORK_MEM_PAGES: usize = RESERVED_PAGES + 1;

/// How null join keys compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullEquality {
    /// Null never equals anything, including another null.
    #[default]
    Distinct,
    /// Null equals null, and nothing else.
    Match,
}

/// Configuration for operator execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Working memory granted to each operator, in pages.
    pub work_mem_pages: usize,

    /// Page size in bytes.
    pub page_size: usize,

    /// Null semantics for join keys.
    pub null_equality: NullEquality,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            work_mem_pages: DEFAULT_WORK_MEM_PAGES,
            page_size: DEFAULT_PAGE_SIZE,
            null_equality: NullEquality::default(),
        }
    }
}

impl ExecutionConfig {
    /// Create a configuration with the given working memory.
    pub fn new(work_mem_pages: usize) -> Self {
        Self {
            work_mem_pages,
            ..Default::default()
        }
    }

    /// Set the working memory in pages.
    pub fn with_work_mem_pages(mut self, pages: usize) -> Self {
        self.work_mem_pages = pages;
        self
    }

    /// Set the page size in bytes.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the null join key semantics.
    pub fn with_null_equality(mut self, null_equality: NullEquality) -> Self {
        self.null_equality = null_equality;
        self
    }

    /// Pages left for a join's left block after the reserved pages.
    ///
    /// Zero when the budget is below [`MIN_WORK_MEM_PAGES`].
    pub fn usable_pages(&self) -> usize {
        self.work_mem_pages.saturating_sub(RESERVED_PAGES)
    }

    /// Check the settings a block nested loop join depends on.
    pub fn validate(&self) -> Result<(), Error> {
        if self.work_mem_pages < MIN_WORK_MEM_PAGES {
            return Err(Error::InvalidConfiguration(format!(
                "work memory of {} pages is below the minimum of {} ({} reserved + 1 block page)",
                self.work_mem_pages, MIN_WORK_MEM_PAGES, RESERVED_PAGES
            )));
        }
        if self.page_size == 0 {
            return Err(Error::InvalidConfiguration(
                "page size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
