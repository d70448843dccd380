//! Relsnap main entry point
//!
//! Command-line interface for the incremental release-visualization
//! snapshotter.

use anyhow::Context;
use clap::Parser;
use relsnap::config::load_config_with_hash;
use relsnap::crawler::crawl;
use relsnap::store::StateStore;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Relsnap: an incremental release-visualization snapshotter
///
/// Relsnap walks a statistical-publishing site's release calendar, extracts
/// embedded visualization references from each release's documents, and
/// screenshots every newly-discovered visualization exactly once.
#[derive(Parser, Debug)]
#[command(name = "relsnap")]
#[command(version = "1.0.0")]
#[command(about = "Incremental release-visualization snapshotter", long_about = None)]
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

    /// Seed empty state files and exit (refuses to overwrite)
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    init: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["init", "stats"])]
    dry_run: bool,

    /// Show statistics from the persisted state and exit
    #[arg(long, conflicts_with_all = ["init", "dry_run"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.init {
        handle_init(&config)?;
    } else if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("relsnap=info,warn"),
            1 => EnvFilter::new("relsnap=debug,info"),
            2 => EnvFilter::new("relsnap=trace,debug"),
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

/// Handles --init: seeds empty state files
fn handle_init(config: &relsnap::Config) -> anyhow::Result<()> {
    StateStore::init(&config.state).context("failed to seed state files")?;
    println!("Seeded empty state files:");
    println!("  results:     {}", config.state.results_path);
    println!("  assignments: {}", config.state.assignments_path);
    Ok(())
}

/// Handles --dry-run: validates config and shows what would be crawled
fn handle_dry_run(config: &relsnap::Config) {
    println!("=== Relsnap Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Listing: {}", config.site.listing_path);
    println!(
        "  Up to {} pages of {} releases",
        config.site.max_pages, config.site.page_size
    );
    if !config.site.page_data_suffix.is_empty() {
        println!("  Page-data suffix: {}", config.site.page_data_suffix);
    }

    println!("\nFetch:");
    println!(
        "  Delay {}ms (+{}ms jitter), {} attempts, backoff floor {}s",
        config.fetch.base_delay_ms,
        config.fetch.jitter_ms,
        config.fetch.max_attempts,
        config.fetch.backoff_floor_secs
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nCapture:");
    println!("  Tool: {}", config.capture.command);
    println!("  Fallback browser: {}", config.capture.fallback_browser);
    println!(
        "  Width {}px, wait {}ms, quality {}",
        config.capture.width, config.capture.wait_ms, config.capture.quality
    );
    println!("  Screenshots: {}", config.capture.screenshot_dir);

    println!("\nState:");
    println!("  Results: {}", config.state.results_path);
    println!("  Assignments: {}", config.state.assignments_path);

    println!("\n✓ Configuration is valid");
}

/// Handles --stats: summarizes the persisted state
fn handle_stats(config: &relsnap::Config) -> anyhow::Result<()> {
    let store = StateStore::load(&config.state).context("failed to load state")?;

    println!("=== Relsnap State ===\n");
    println!("Document records: {}", store.record_count());
    println!("Screenshot assignments: {}", store.assignment_count());
    match store.cursor() {
        Some(date) => println!("Crawl cursor: {}", date),
        None => println!("Crawl cursor: none (no dated records yet)"),
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: relsnap::Config) -> anyhow::Result<()> {
    match crawl(config).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl completed: {} pages, {} new documents, {} screenshots",
                summary.pages_walked,
                summary.documents_recorded,
                summary.screenshots_captured
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
