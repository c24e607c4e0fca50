//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the Catalog-Harvest page harvester.

use anyhow::Context;
use catalog_harvest::config::{load_config_with_hash, Config, StorageBackend};
use catalog_harvest::crawler::{run_crawl, EndReason};
use catalog_harvest::output::{
    export_records, format_summary, load_statistics, print_statistics,
};
use catalog_harvest::page::BookExtractor;
use catalog_harvest::storage::open_store;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: a concurrent catalog page harvester
///
/// Catalog-Harvest crawls a single catalog site with a pool of fetch
/// workers, saves every item page matching the configured category and
/// language, and stops once the target number of pages has been saved.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent catalog page harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the configured worker pool size
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Override the configured target count
    #[arg(long, value_name = "N")]
    target: Option<u64>,

    /// Validate config and show what a run would start from without crawling
    #[arg(long, conflicts_with_all = ["stats", "export_records"])]
    dry_run: bool,

    /// Show statistics about saved pages and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_records"])]
    stats: bool,

    /// Extract records from every saved page into a JSON-lines file and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "stats"])]
    export_records: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli)?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(path) = &cli.export_records {
        handle_export_records(&config, path)?;
    } else {
        handle_crawl(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_file(false)
        .init();
}

/// Applies `--workers` and `--target`, then re-validates
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(workers) = cli.workers {
        tracing::info!("Overriding pool size: {}", workers);
        config.crawler.pool_size = workers;
    }
    if let Some(target) = cli.target {
        tracing::info!("Overriding target count: {}", target);
        config.crawler.target_count = target;
    }
    if cli.workers.is_some() || cli.target.is_some() {
        catalog_harvest::config::validate(config).context("Invalid command-line override")?;
    }
    Ok(())
}

/// Handles the --dry-run mode: validates config and shows the starting point
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Catalog-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.pool_size);
    println!(
        "  Counter: {} -> target {}",
        config.crawler.counter_offset, config.crawler.target_count
    );
    println!("  Worker idle: {}ms", config.crawler.worker_idle_ms);
    println!("  Coordinator idle: {}ms", config.crawler.coordinator_idle_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nSite:");
    println!("  Entry URL: {}", config.site.entry_url);
    println!("  Item pages: /?{}=<id>", config.site.detail_param);
    println!("  Listing pages: {}*", config.site.listing_prefix);
    println!("  Link scope: {}", config.site.link_scope);

    println!("\nClassifier:");
    println!("  Category: {}", config.classifier.category_keyword);
    println!("  Language: {}", config.classifier.language_keyword);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    match config.output.backend {
        StorageBackend::Directory => println!("  Directory: {}", config.output.pages_dir),
        StorageBackend::Sqlite => println!("  Database: {}", config.output.database_path),
    }

    let store = open_store(&config.output)?;
    let saved = store.count()?;

    println!("\n✓ Configuration is valid");
    println!("✓ Would seed the explored set with {} saved pages", saved);

    Ok(())
}

/// Handles the --stats mode: shows what the page store holds
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = open_store(&config.output)?;
    let stats = load_statistics(store.as_ref())?;
    print_statistics(&stats);
    Ok(())
}

/// Handles the --export-records mode
fn handle_export_records(config: &Config, path: &Path) -> anyhow::Result<()> {
    println!("=== Exporting Records ===\n");

    let store = open_store(&config.output)?;
    println!("Store: {}", store.describe());
    println!("Output: {}\n", path.display());

    let extractor = BookExtractor::new()?;
    let report = export_records(store.as_ref(), &extractor, path)?;

    println!(
        "✓ Exported {} records ({} pages skipped)",
        report.written, report.skipped
    );
    Ok(())
}

/// Handles the main harvest operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    let summary = match run_crawl(config).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    match summary.end_reason {
        EndReason::TargetReached => tracing::info!(
            "Harvest completed: {} / {} pages",
            summary.final_count,
            summary.target
        ),
        EndReason::Exhausted => tracing::warn!(
            "Harvest ran out of links at {} / {} pages",
            summary.final_count,
            summary.target
        ),
    }

    println!("{}", format_summary(&summary));
    Ok(())
}
