//! Output module for run reports and record export
//!
//! This module handles:
//! - Per-run event counters and the end-of-run summary
//! - Statistics about the pages already held by the page store
//! - Exporting extracted records as JSON lines

mod records;
pub mod stats;
mod summary;

pub use records::{export_records, ExportReport};
pub use stats::{load_statistics, print_statistics, RunStats, StatsSnapshot, StoreStatistics};
pub use summary::{format_summary, EndReason, RunSummary};
