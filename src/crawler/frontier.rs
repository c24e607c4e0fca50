//! Frontier: the job queue of URLs awaiting fetch
//!
//! The coordinator is the only producer; every worker consumes. Each entry is
//! delivered to exactly one worker.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Unbounded multi-consumer FIFO of canonical URLs
#[derive(Debug, Clone)]
pub struct Frontier {
    tx: Sender<String>,
    rx: Receiver<String>,
}

impl Frontier {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Enqueues `url`
    pub fn push(&self, url: String) {
        // Both ends live in `self`, so the channel cannot be disconnected here.
        let _ = self.tx.send(url);
    }

    /// Takes the next URL without waiting
    pub fn try_pop(&self) -> Option<String> {
        match self.rx.try_recv() {
            Ok(url) => Some(url),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Takes the next URL, waiting up to `timeout` for one to be pushed
    pub fn pop_timeout(&self, timeout: Duration) -> Option<String> {
        match self.rx.recv_timeout(timeout) {
            Ok(url) => Some(url),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}
