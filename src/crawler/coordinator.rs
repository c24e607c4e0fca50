//! Harvest coordinator - main run orchestration logic
//!
//! The coordinator is the only writer of the explored set and the only
//! producer for the frontier. It:
//! - Seeds the explored set from pages saved by earlier runs
//! - Fetches the entry page and enqueues its in-scope links
//! - Merges worker discovery batches into the frontier
//! - Raises the termination flag once the target is reached or nothing is left
//! - Drains the worker pool and reports a `RunSummary`

use crate::config::{Config, CrawlerConfig};
use crate::crawler::discovery::DiscoveryChannel;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::frontier::Frontier;
use crate::crawler::worker::{WorkerContext, WorkerPool};
use crate::output::{EndReason, RunSummary};
use crate::page::{CatalogClassifier, LinkExtractor, PageClassifier, ScopedLinkExtractor};
use crate::state::{CrawlState, RunPhase};
use crate::storage::{open_store, PageStore};
use crate::url::{filter_batch, SiteScope};
use crate::HarvestError;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;

/// The pluggable per-page pieces a run is wired with
#[derive(Clone)]
pub struct Collaborators {
    pub classifier: Arc<dyn PageClassifier>,
    pub links: Arc<dyn LinkExtractor>,
    pub store: Arc<dyn PageStore>,
}

impl Collaborators {
    /// Builds the catalog classifier, scoped link extractor and configured store
    pub fn from_config(config: &Config, scope: &SiteScope) -> Result<Self, HarvestError> {
        Ok(Self {
            classifier: Arc::new(CatalogClassifier::from_config(&config.classifier)?),
            links: Arc::new(ScopedLinkExtractor::new(
                &config.site.link_scope,
                scope.domain(),
            )?),
            store: open_store(&config.output)?,
        })
    }
}

/// Main harvest coordinator structure
pub struct Coordinator {
    crawler: CrawlerConfig,
    entry_url: String,
    scope: Arc<SiteScope>,
    state: Arc<CrawlState>,
    frontier: Frontier,
    discovery: DiscoveryChannel,
    client: Client,
    collaborators: Collaborators,
    phase: RunPhase,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `collaborators` - Classifier, link extractor and page store to use
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Invalid site scope or HTTP client setup failure
    pub fn new(config: &Config, collaborators: Collaborators) -> Result<Self, HarvestError> {
        let scope = SiteScope::from_config(&config.site)?;
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;

        Ok(Self {
            crawler: config.crawler.clone(),
            entry_url: config.site.entry_url.clone(),
            scope: Arc::new(scope),
            state: CrawlState::new(config.crawler.counter_offset, config.crawler.target_count),
            frontier: Frontier::new(),
            discovery: DiscoveryChannel::new(),
            client,
            collaborators,
            phase: RunPhase::Seeding,
        })
    }

    /// Creates a coordinator wired with the default collaborators
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let scope = SiteScope::from_config(&config.site)?;
        let collaborators = Collaborators::from_config(config, &scope)?;
        Self::new(config, collaborators)
    }

    pub fn state(&self) -> &Arc<CrawlState> {
        &self.state
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn discovery(&self) -> &DiscoveryChannel {
        &self.discovery
    }

    pub fn scope(&self) -> &SiteScope {
        &self.scope
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Marks every previously saved item as explored
    ///
    /// Saved ids are rebuilt into canonical detail URLs, so links to those
    /// items are filtered out and never re-queued. Nothing is enqueued here.
    ///
    /// # Returns
    ///
    /// The number of URLs added to the explored set
    pub fn seed_explored(&self) -> Result<usize, HarvestError> {
        let ids = self.collaborators.store.list_saved_ids()?;

        let seeded = ids
            .iter()
            .filter(|id| self.state.explored.add_if_absent(&self.scope.detail_url(id)))
            .count();

        tracing::info!(
            "Seeded explored set with {} saved items from {}",
            seeded,
            self.collaborators.store.describe()
        );
        Ok(seeded)
    }

    /// Fetches the entry page and enqueues its in-scope links
    ///
    /// When the entry is itself a listing or detail page it is marked
    /// explored, so links back to it are not fetched again.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of URLs pushed onto the frontier
    /// * `Err(HarvestError::EntryFetch)` - The entry page could not be fetched
    pub async fn seed_from_entry(&self) -> Result<usize, HarvestError> {
        tracing::info!("Fetching entry page {}", self.entry_url);

        let body = match fetch_url(&self.client, &self.entry_url).await {
            FetchResult::Success { body, .. } => body,
            FetchResult::HttpError { status_code } => {
                return Err(HarvestError::EntryFetch {
                    url: self.entry_url.clone(),
                    reason: format!("HTTP {}", status_code),
                })
            }
            FetchResult::NetworkError { error } => {
                return Err(HarvestError::EntryFetch {
                    url: self.entry_url.clone(),
                    reason: error,
                })
            }
        };

        if let Some(entry) = self.scope.canonicalize(&self.entry_url) {
            self.state.explored.add_if_absent(&entry);
        }

        let links = self.collaborators.links.extract_links(&body)?;
        let enqueued = self.merge_batch(links);
        tracing::info!("Entry page yielded {} jobs", enqueued);
        Ok(enqueued)
    }

    /// Filters a raw link batch and enqueues the URLs not explored before
    ///
    /// Each survivor goes through `add_if_absent`, so a URL discovered by
    /// several workers is pushed exactly once.
    ///
    /// # Returns
    ///
    /// The number of URLs pushed onto the frontier
    pub fn merge_batch<I, S>(&self, batch: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let explored = &self.state.explored;
        let survivors = filter_batch(batch, &self.scope, |url| explored.contains(url));

        let mut enqueued = 0;
        for url in survivors {
            if explored.add_if_absent(&url) {
                self.state.mark_enqueued();
                self.frontier.push(url);
                enqueued += 1;
            }
        }

        self.state.stats.urls_enqueued(enqueued);
        tracing::debug!(
            "Explored total of {} links, created {} jobs",
            explored.len(),
            enqueued
        );
        enqueued
    }

    /// Runs the harvest to completion
    ///
    /// Moves through `Seeding → Running → Draining → Stopped`. Workers are
    /// always drained gracefully: the flag is raised and every worker finishes
    /// its current iteration before the summary is built.
    pub async fn run(mut self) -> Result<RunSummary, HarvestError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        tracing::info!(
            "Starting harvest of {} with {} workers, counter {} / {}",
            self.entry_url,
            self.crawler.pool_size,
            self.state.progress.read(),
            self.state.target()
        );

        self.seed_explored()?;
        self.seed_from_entry().await?;

        let (pool, end_reason) = if self.state.target_reached() {
            tracing::info!("Counter offset already meets the target, nothing to fetch");
            self.phase = self.phase.transition(RunPhase::Draining)?;
            self.state.termination.set();
            (None, EndReason::TargetReached)
        } else {
            let pool = WorkerPool::spawn(self.crawler.pool_size, self.worker_context())?;
            self.phase = self.phase.transition(RunPhase::Running)?;
            let end_reason = self.merge_loop().await;
            self.phase = self.phase.transition(RunPhase::Draining)?;
            (Some(pool), end_reason)
        };

        self.state.termination.set();
        if let Some(pool) = pool {
            tracing::info!("Waiting for {} workers to finish", pool.size());
            match tokio::task::spawn_blocking(move || pool.join()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("{}", e),
                Err(e) => tracing::error!("Failed to join worker pool: {}", e),
            }
        }
        self.phase = self.phase.transition(RunPhase::Stopped)?;

        Ok(RunSummary {
            end_reason,
            started_at,
            elapsed: clock.elapsed(),
            final_count: self.state.progress.read(),
            target: self.state.target(),
            explored: self.state.explored.len(),
            stats: self.state.stats.snapshot(),
        })
    }

    /// Merges discovery batches until the target is met or nothing is left
    async fn merge_loop(&self) -> EndReason {
        loop {
            if self.state.target_reached() {
                if self.state.termination.set() {
                    tracing::info!(
                        "Target of {} reached, stopping workers",
                        self.state.target()
                    );
                }
                return EndReason::TargetReached;
            }

            match self.discovery.try_pop() {
                Some(batch) => {
                    self.state.stats.batch_merged();
                    self.merge_batch(batch);
                }
                None => {
                    // Workers release a job only after pushing its batch, so
                    // this order leaves no batch unseen.
                    if self.state.pending() == 0 && self.discovery.is_empty() {
                        tracing::warn!(
                            "Frontier exhausted at {} / {}, stopping workers",
                            self.state.progress.read(),
                            self.state.target()
                        );
                        self.state.termination.set();
                        return EndReason::Exhausted;
                    }

                    tracing::trace!("Empty discovery channel, sleeping");
                    tokio::time::sleep(self.crawler.coordinator_idle()).await;
                }
            }
        }
    }

    fn worker_context(&self) -> WorkerContext {
        WorkerContext {
            state: self.state.clone(),
            frontier: self.frontier.clone(),
            discovery: self.discovery.clone(),
            scope: self.scope.clone(),
            classifier: self.collaborators.classifier.clone(),
            links: self.collaborators.links.clone(),
            store: self.collaborators.store.clone(),
            client: self.client.clone(),
            runtime: Handle::current(),
            idle: self.crawler.worker_idle(),
        }
    }
}

/// Runs a complete harvest with the default collaborators
///
/// # Arguments
///
/// * `config` - The harvester configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Run ended with the target reached or the frontier exhausted
/// * `Err(HarvestError)` - Setup failed or the entry page could not be fetched
pub async fn run_crawl(config: &Config) -> Result<RunSummary, HarvestError> {
    Coordinator::from_config(config)?.run().await
}
