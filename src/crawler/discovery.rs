use crossbeam_channel::{unbounded, Receiver, Sender};

/// Raw outbound links of one fetched page
pub type LinkBatch = Vec<String>;

/// Queue of link batches from workers, drained by the coordinator
#[derive(Debug, Clone)]
pub struct DiscoveryChannel {
    tx: Sender<LinkBatch>,
    rx: Receiver<LinkBatch>,
}

impl DiscoveryChannel {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn push(&self, batch: LinkBatch) {
        let _ = self.tx.send(batch);
    }

    pub fn try_pop(&self) -> Option<LinkBatch> {
        self.rx.try_recv().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }
}

impl Default for DiscoveryChannel {
    fn default() -> Self {
        Self::new()
    }
}
