use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Every URL that has ever been enqueued or seeded from saved pages
///
/// Grows monotonically. The only mutation is [`ExploredSet::add_if_absent`],
/// which checks and inserts under a single lock acquisition.
#[derive(Debug, Default)]
pub struct ExploredSet {
    urls: Mutex<HashSet<String>>,
}

impl ExploredSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url` and returns true if it was not already present
    pub fn add_if_absent(&self, url: &str) -> bool {
        let mut urls = self.lock();
        if urls.contains(url) {
            false
        } else {
            urls.insert(url.to_string())
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panicking holder cannot leave the set half-updated, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_add_if_absent() {
        let set = ExploredSet::new();
        assert!(set.is_empty());

        assert!(set.add_if_absent("https://x.test/?uItem=1"));
        assert!(!set.add_if_absent("https://x.test/?uItem=1"));
        assert!(set.contains("https://x.test/?uItem=1"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_concurrent_inserts_admit_each_url_once() {
        let set = Arc::new(ExploredSet::new());
        let admitted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let set = set.clone();
                let admitted = admitted.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        if set.add_if_absent(&format!("https://x.test/?uItem={}", i)) {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 100);
        assert_eq!(set.len(), 100);
    }
}
