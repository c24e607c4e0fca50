//! Run and storage statistics
//!
//! `RunStats` counts worker and coordinator events while a run is live;
//! `StoreStatistics` describes what the page store holds between runs.

use crate::storage::PageStore;
use crate::HarvestError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Event counters for one harvest run
#[derive(Debug, Default)]
pub struct RunStats {
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    out_of_scope: AtomicU64,
    page_errors: AtomicU64,
    persist_failures: AtomicU64,
    pages_saved: AtomicU64,
    saves_skipped: AtomicU64,
    batches_merged: AtomicU64,
    urls_enqueued: AtomicU64,
}

/// Point-in-time copy of [`RunStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Pages fetched with a success status
    pub pages_fetched: u64,
    /// Transport errors and non-success statuses
    pub fetch_failures: u64,
    /// Fetched pages the classifier rejected
    pub out_of_scope: u64,
    /// Classifier or link extractor failures
    pub page_errors: u64,
    /// In-scope pages the store refused
    pub persist_failures: u64,
    /// In-scope pages saved during this run
    pub pages_saved: u64,
    /// In-scope pages not saved because the run was already stopping
    pub saves_skipped: u64,
    /// Discovery batches merged by the coordinator
    pub batches_merged: u64,
    /// URLs pushed onto the frontier (entry page survivors included)
    pub urls_enqueued: u64,
}

impl RunStats {
    pub fn page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn page_out_of_scope(&self) {
        self.out_of_scope.fetch_add(1, Ordering::Relaxed);
    }

    pub fn page_error(&self) {
        self.page_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn persist_failed(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn page_saved(&self) {
        self.pages_saved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn save_skipped(&self) {
        self.saves_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn batch_merged(&self) {
        self.batches_merged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn urls_enqueued(&self, n: usize) {
        self.urls_enqueued.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            out_of_scope: self.out_of_scope.load(Ordering::Relaxed),
            page_errors: self.page_errors.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
            pages_saved: self.pages_saved.load(Ordering::Relaxed),
            saves_skipped: self.saves_skipped.load(Ordering::Relaxed),
            batches_merged: self.batches_merged.load(Ordering::Relaxed),
            urls_enqueued: self.urls_enqueued.load(Ordering::Relaxed),
        }
    }
}

/// What the page store currently holds
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Human-readable store location
    pub location: String,

    /// Number of saved pages
    pub saved_pages: u64,

    /// Smallest and largest saved item ids, compared numerically
    pub id_range: Option<(String, String)>,
}

/// Loads statistics from a page store
pub fn load_statistics(store: &dyn PageStore) -> Result<StoreStatistics, HarvestError> {
    let ids = store.list_saved_ids()?;

    let id_range = {
        let mut numeric: Vec<(u128, &String)> = ids
            .iter()
            .filter_map(|id| id.parse::<u128>().ok().map(|n| (n, id)))
            .collect();
        numeric.sort();
        match (numeric.first(), numeric.last()) {
            (Some(lo), Some(hi)) => Some((lo.1.clone(), hi.1.clone())),
            _ => None,
        }
    };

    Ok(StoreStatistics {
        location: store.describe(),
        saved_pages: ids.len() as u64,
        id_range,
    })
}

/// Prints store statistics to stdout
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Harvest Statistics ===\n");
    println!("Store: {}", stats.location);
    println!("  Saved pages: {}", stats.saved_pages);
    if let Some((lo, hi)) = &stats.id_range {
        println!("  Item ids: {} .. {}", lo, hi);
    }
}
