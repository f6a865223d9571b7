//! Execution configuration and page layout.

mod config;
pub mod page;

pub use config::{
    ExecutionConfig, NullEquality, DEFAULT_PAGE_SIZE, DEFAULT_WORK_MEM_PAGES,
    MIN_WORK_MEM_PAGES, RESERVED_PAGES,
};
pub use page::{pages_for, records_per_page};
