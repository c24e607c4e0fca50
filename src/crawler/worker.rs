//! Fetch workers
//!
//! Each worker is a named OS thread running the fetch loop:
//! 1. Exit once the termination flag is raised or the target is met
//! 2. Pop a URL from the frontier, waiting up to the idle interval
//! 3. Fetch it; failures are logged and the URL is dropped
//! 4. Classify the page and, if in scope, reserve a save slot, save it and
//!    bump the progress counter
//! 5. Extract the page's links and push them to the discovery channel
//!
//! Errors and panics from one iteration are logged and counted; the worker
//! moves on to the next URL.
//!
//! Fetches run on the shared tokio runtime through a `Handle`, so a worker
//! blocks on exactly one request at a time.

use crate::crawler::discovery::DiscoveryChannel;
use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::frontier::Frontier;
use crate::page::{LinkExtractor, PageClassifier};
use crate::state::CrawlState;
use crate::storage::PageStore;
use crate::url::SiteScope;
use crate::HarvestError;
use reqwest::Client;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::runtime::Handle;

/// Everything a worker touches, cloned once per thread
#[derive(Clone)]
pub struct WorkerContext {
    pub state: Arc<CrawlState>,
    pub frontier: Frontier,
    pub discovery: DiscoveryChannel,
    pub scope: Arc<SiteScope>,
    pub classifier: Arc<dyn PageClassifier>,
    pub links: Arc<dyn LinkExtractor>,
    pub store: Arc<dyn PageStore>,
    pub client: Client,
    pub runtime: Handle,
    pub idle: Duration,
}

/// A fixed-size pool of fetch worker threads
#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<(usize, JoinHandle<()>)>,
}

impl WorkerPool {
    /// Spawns `size` workers sharing `context`
    pub fn spawn(size: usize, context: WorkerContext) -> Result<Self, HarvestError> {
        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            let context = context.clone();
            let handle = thread::Builder::new()
                .name(format!("harvest-worker-{}", id))
                .spawn(move || run_worker(id, context))?;
            workers.push((id, handle));
        }

        tracing::info!("Started {} fetch workers", size);
        Ok(Self { workers })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Waits for every worker to exit
    ///
    /// All workers are joined even if one of them panicked; the first panic
    /// is reported.
    pub fn join(self) -> Result<(), HarvestError> {
        let mut first_panic = None;

        for (id, handle) in self.workers {
            if handle.join().is_err() {
                tracing::error!("Worker {} panicked", id);
                first_panic.get_or_insert(id);
            }
        }

        match first_panic {
            Some(id) => Err(HarvestError::WorkerPanicked(id)),
            None => Ok(()),
        }
    }
}

fn run_worker(id: usize, ctx: WorkerContext) {
    let span = tracing::info_span!("worker", id);
    let _enter = span.enter();
    tracing::debug!("Worker started");

    while !ctx.state.should_stop() {
        let Some(url) = ctx.frontier.pop_timeout(ctx.idle) else {
            tracing::trace!("Empty frontier, waiting");
            continue;
        };
        if ctx.state.should_stop() {
            break;
        }

        let _job = ctx.state.start_job();
        match panic::catch_unwind(AssertUnwindSafe(|| process_url(&ctx, &url))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!("Failed to process {}: {}", url, e);
                ctx.state.stats.page_error();
            }
            Err(payload) => {
                tracing::error!(
                    "Panic while processing {}: {}",
                    url,
                    panic_message(&*payload)
                );
                ctx.state.stats.page_error();
            }
        }
    }

    tracing::debug!("Worker exiting");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// One worker iteration for a popped URL
///
/// Fetch failures are contained here; classifier and link extractor errors
/// are returned to the loop.
fn process_url(ctx: &WorkerContext, url: &str) -> Result<(), HarvestError> {
    let body = match ctx.runtime.block_on(fetch_url(&ctx.client, url)) {
        FetchResult::Success { body, .. } => {
            ctx.state.stats.page_fetched();
            body
        }
        FetchResult::HttpError { status_code } => {
            tracing::warn!("Fetch failed for {}: HTTP {}", url, status_code);
            ctx.state.stats.fetch_failed();
            return Ok(());
        }
        FetchResult::NetworkError { error } => {
            tracing::warn!("Fetch failed for {}: {}", url, error);
            ctx.state.stats.fetch_failed();
            return Ok(());
        }
    };

    if ctx.classifier.is_in_scope(&body)? {
        persist(ctx, url, &body);
    } else {
        tracing::debug!("Link miss {}", url);
        ctx.state.stats.page_out_of_scope();
    }

    let links = ctx.links.extract_links(&body)?;
    tracing::trace!("Found {} links on {}", links.len(), url);
    ctx.discovery.push(links);

    Ok(())
}

fn persist(ctx: &WorkerContext, url: &str, body: &str) {
    let Some(id) = ctx.scope.item_id(url) else {
        tracing::warn!("In-scope page has no item id, not saving: {}", url);
        return;
    };

    // Every remaining save up to the target may already be taken.
    let Some(claim) = ctx.state.claim_save() else {
        tracing::debug!("Run is stopping, not saving item {}", id);
        ctx.state.stats.save_skipped();
        return;
    };

    match ctx.store.save(&id, body) {
        Ok(()) => {
            ctx.state.stats.page_saved();
            let count = claim.commit();
            tracing::info!("Saved item {}, count is now {}", id, count);
        }
        Err(e) => {
            tracing::error!("Failed to save item {}: {}", id, e);
            ctx.state.stats.persist_failed();
        }
    }
}
