//! Crawler module for the concurrent harvest engine
//!
//! This module contains the coordination engine, including:
//! - The frontier (job queue) and discovery channel (link queue)
//! - HTTP fetching
//! - The fetch worker pool
//! - Overall run coordination and termination

mod coordinator;
mod discovery;
mod fetcher;
mod frontier;
mod worker;

pub use coordinator::{run_crawl, Collaborators, Coordinator};
pub use discovery::{DiscoveryChannel, LinkBatch};
pub use fetcher::{build_http_client, fetch_url, user_agent_string, FetchResult};
pub use frontier::Frontier;
pub use worker::{WorkerContext, WorkerPool};

pub use crate::output::{EndReason, RunSummary};
