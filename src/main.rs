//! Shelf-Harvest main entry point
//!
//! This is the command-line interface for the Shelf-Harvest catalog crawler.

use anyhow::Context;
use clap::Parser;
use shelf_harvest::config::{load_config_with_hash, Config, FailurePolicy};
use shelf_harvest::crawler::Harvester;
use shelf_harvest::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shelf-Harvest: crawl a paginated catalog and feed an ingestion service
///
/// Each list page of the catalog window is crawled, every listed item's
/// detail page is fetched, and the completed records are submitted to the
/// configured ingestion endpoint.
#[derive(Parser, Debug)]
#[command(name = "shelf-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Crawl a paginated catalog into an ingestion service", long_about = None)]
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

    /// Validate config and list the pages that would be crawled
    #[arg(long)]
    dry_run: bool,

    /// Abort the whole run on the first failure
    #[arg(long)]
    fail_fast: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.fail_fast {
        config.crawler.failure_policy = FailurePolicy::FailFast;
    }

    if cli.dry_run {
        handle_dry_run(config)
    } else {
        handle_harvest(config, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_harvest=info,warn"),
            1 => EnvFilter::new("shelf_harvest=debug,info"),
            2 => EnvFilter::new("shelf_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: Config) -> anyhow::Result<()> {
    println!("=== Shelf-Harvest Dry Run ===\n");

    println!("Catalog:");
    println!("  List URL: {}", config.catalog.list_url);
    println!(
        "  Pages: {} x {} items",
        config.catalog.page_count, config.catalog.page_size
    );

    println!("\nCrawler:");
    println!(
        "  List request interval: {}ms",
        config.crawler.launch_interval_ms
    );
    println!(
        "  Detail request interval: {}ms",
        config.crawler.detail_interval_ms
    );
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!("  Failure policy: {:?}", config.crawler.failure_policy);

    println!("\nIngest endpoint: {}", config.ingest.endpoint);

    let harvester = Harvester::new(config)?;
    let urls = harvester.page_urls()?;

    println!("\nPages ({}):", urls.len());
    for (index, url) in urls.iter().enumerate() {
        println!("  {:>3}. {}", index, url);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, quiet: bool) -> anyhow::Result<()> {
    let harvester = Harvester::new(config)?;

    let cancel = harvester.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling harvest");
            cancel.cancel();
        }
    });

    match harvester.run().await {
        Ok(report) => {
            if !quiet {
                print_summary(&report);
            }
            if !report.is_clean() {
                tracing::warn!(
                    "Harvest finished with {} page, {} item and {} submission failures",
                    report.pages_failed(),
                    report.item_failures(),
                    report.submissions_failed()
                );
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
