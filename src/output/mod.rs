//! Output module for crawl reports and dataset statistics
//!
//! This module handles:
//! - Summarizing a crawl run, stage by stage, so gaps are visible
//! - Computing statistics over an already persisted metadata tree

mod report;
pub mod stats;

pub use report::{format_report, print_report, CrawlReport, StageReport};
pub use stats::{load_statistics, print_statistics, DatasetStatistics};
