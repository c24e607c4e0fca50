use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Number of in-scope pages saved so far, including earlier runs
#[derive(Debug, Default)]
pub struct ProgressCounter {
    value: AtomicU64,
}

impl ProgressCounter {
    /// Creates a counter starting at `offset`
    pub fn new(offset: u64) -> Self {
        Self {
            value: AtomicU64::new(offset),
        }
    }

    /// Adds `n` and returns the new value
    pub fn add(&self, n: u64) -> u64 {
        self.value.fetch_add(n, Ordering::SeqCst) + n
    }

    pub fn read(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }
}

/// One-way stop signal raised by the coordinator
#[derive(Debug, Default)]
pub struct TerminationFlag {
    raised: AtomicBool,
}

impl TerminationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag; returns true only for the call that flipped it
    pub fn set(&self) -> bool {
        !self.raised.swap(true, Ordering::SeqCst)
    }

    pub fn is_set(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}
