//! State module for the process-wide crawl state
//!
//! Everything that the coordinator and the workers share lives here, each
//! piece behind its own synchronization primitive and exposed only through
//! atomic operations.
//!
//! # Components
//!
//! - `ExploredSet`: mutex-guarded set of every URL ever enqueued or seeded
//! - `ProgressCounter`: atomic count of in-scope pages saved
//! - `TerminationFlag`: one-way stop signal raised by the coordinator
//! - `SaveClaim`: a reserved save slot, so concurrent workers never save past
//!   the target
//! - `RunPhase`: the run lifecycle state machine

mod explored;
mod progress;
mod run_phase;

// Re-export main types
pub use explored::ExploredSet;
pub use progress::{ProgressCounter, TerminationFlag};
pub use run_phase::RunPhase;

use crate::output::RunStats;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared state of one harvest run
#[derive(Debug)]
pub struct CrawlState {
    /// URLs that must never be enqueued again
    pub explored: ExploredSet,

    /// Saved in-scope pages, seeded with the configured offset
    pub progress: ProgressCounter,

    /// Raised once by the coordinator, observed by every worker
    pub termination: TerminationFlag,

    /// Per-run event counters
    pub stats: RunStats,

    /// Frontier entries not yet fully processed by a worker
    pending: AtomicUsize,

    /// Saved pages plus saves in progress; never exceeds `target`
    claimed: AtomicU64,

    target: u64,
}

impl CrawlState {
    /// Creates the shared state for a run
    ///
    /// # Arguments
    ///
    /// * `counter_offset` - Starting value of the progress counter
    /// * `target` - Counter value at which the run stops
    pub fn new(counter_offset: u64, target: u64) -> Arc<Self> {
        Arc::new(Self {
            explored: ExploredSet::new(),
            progress: ProgressCounter::new(counter_offset),
            termination: TerminationFlag::new(),
            stats: RunStats::default(),
            pending: AtomicUsize::new(0),
            claimed: AtomicU64::new(counter_offset),
            target,
        })
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn target_reached(&self) -> bool {
        self.progress.read() >= self.target
    }

    /// True once the flag is raised or the target is met
    pub fn should_stop(&self) -> bool {
        self.termination.is_set() || self.target_reached()
    }

    /// Records one URL about to be pushed onto the frontier
    pub fn mark_enqueued(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    /// Takes over one popped frontier entry
    ///
    /// The entry stays pending until the guard is dropped, which a worker
    /// does only after pushing the page's discovery batch. A pending count of
    /// zero with an empty discovery channel therefore means nothing further
    /// can ever be enqueued.
    pub fn start_job(&self) -> JobGuard<'_> {
        JobGuard { state: self }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Reserves one of the saves still missing to reach the target
    ///
    /// Returns `None` once the flag is raised or every remaining save is
    /// already reserved by another worker. The progress counter moves only
    /// when the claim is committed; a dropped claim frees its slot.
    pub fn claim_save(&self) -> Option<SaveClaim<'_>> {
        if self.termination.is_set() {
            return None;
        }

        self.claimed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |claimed| {
                (claimed < self.target).then_some(claimed + 1)
            })
            .ok()?;

        Some(SaveClaim {
            state: self,
            committed: false,
        })
    }
}

/// A reserved save slot
///
/// Commit it after a successful save; dropping it uncommitted returns the
/// slot.
#[derive(Debug)]
pub struct SaveClaim<'a> {
    state: &'a CrawlState,
    committed: bool,
}

impl SaveClaim<'_> {
    /// Counts the save and returns the new counter value
    pub fn commit(mut self) -> u64 {
        self.committed = true;
        self.state.progress.add(1)
    }
}

impl Drop for SaveClaim<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.state.claimed.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Releases one pending frontier entry on drop
#[derive(Debug)]
pub struct JobGuard<'a> {
    state: &'a CrawlState,
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.state.pending.fetch_sub(1, Ordering::SeqCst);
    }
}
