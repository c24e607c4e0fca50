//! End-of-run summary
//!
//! The coordinator builds a [`RunSummary`] when a run reaches `Stopped`; the
//! CLI logs it and prints the formatted report.

use crate::output::stats::StatsSnapshot;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Why the coordinator ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The progress counter reached the configured target
    TargetReached,

    /// Nothing left to fetch and no worker holding an entry
    Exhausted,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TargetReached => "target reached",
            Self::Exhausted => "frontier exhausted",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one harvest run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub end_reason: EndReason,

    /// When seeding began
    pub started_at: DateTime<Utc>,

    /// Wall time from seeding to the last worker exit
    pub elapsed: Duration,

    /// Progress counter at the end of the run (offset included)
    pub final_count: u64,

    /// Configured target count
    pub target: u64,

    /// Size of the explored set at the end of the run
    pub explored: usize,

    /// Counters collected while the run was live
    pub stats: StatsSnapshot,
}

impl RunSummary {
    /// Pages saved by this run alone
    pub fn saved_this_run(&self) -> u64 {
        self.stats.pages_saved
    }
}

/// Formats a run summary as a plain-text report
pub fn format_summary(summary: &RunSummary) -> String {
    let stats = &summary.stats;
    let mut out = String::new();

    out.push_str("=== Harvest Summary ===\n\n");
    out.push_str(&format!("Started: {}\n", summary.started_at.to_rfc3339()));
    out.push_str(&format!(
        "Elapsed: {:.1} seconds\n",
        summary.elapsed.as_secs_f64()
    ));
    out.push_str(&format!("Ended: {}\n\n", summary.end_reason));

    out.push_str(&format!(
        "Progress: {} / {} ({} saved this run)\n",
        summary.final_count, summary.target, stats.pages_saved
    ));
    out.push_str(&format!("Explored URLs: {}\n\n", summary.explored));

    out.push_str("Pages:\n");
    out.push_str(&format!("  Fetched: {}\n", stats.pages_fetched));
    out.push_str(&format!("  Out of scope: {}\n", stats.out_of_scope));
    if stats.saves_skipped > 0 {
        out.push_str(&format!("  Skipped while stopping: {}\n", stats.saves_skipped));
    }

    out.push_str("Failures:\n");
    out.push_str(&format!("  Fetch: {}\n", stats.fetch_failures));
    out.push_str(&format!("  Page processing: {}\n", stats.page_errors));
    out.push_str(&format!("  Persist: {}\n", stats.persist_failures));

    out.push_str("Coordinator:\n");
    out.push_str(&format!("  Batches merged: {}\n", stats.batches_merged));
    out.push_str(&format!("  URLs enqueued: {}\n", stats.urls_enqueued));

    out
}
