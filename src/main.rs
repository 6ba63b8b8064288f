//! Spell-Harvest main entry point
//!
//! This is the command-line interface for the Spell-Harvest scraper.

use anyhow::Context;
use clap::Parser;
use spell_harvest::config::{load_config_with_hash, Config};
use spell_harvest::{
    HttpLoader, LinkList, LinkListStrategy, LoaderSettings, LogNotifier, Notifier, PageLoader,
    ParserWorker, RetryPolicy, SpellRecord, TwoStagePipeline, WorkerHandle,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Spell-Harvest: a paginated rules-reference scraper
///
/// Spell-Harvest walks the paginated spell listing of a rules-reference
/// site, follows every spell link, and logs one JSON record per spell.
#[derive(Parser, Debug)]
#[command(name = "spell-harvest")]
#[command(version)]
#[command(about = "A paginated rules-reference scraper", long_about = None)]
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

    /// Validate config and print the listing URLs without fetching anything
    #[arg(long, conflicts_with = "list_only")]
    dry_run: bool,

    /// Run only the listing stage and log the link lists
    #[arg(long)]
    list_only: bool,

    /// Pretty-print records
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    let notifier = if cli.pretty {
        LogNotifier::pretty()
    } else {
        LogNotifier::new()
    };

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.list_only {
        handle_list_only(&config, notifier).await
    } else {
        handle_harvest(&config, notifier).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("spell_harvest=info,warn"),
            1 => EnvFilter::new("spell_harvest=debug,info"),
            2 => EnvFilter::new("spell_harvest=trace,debug"),
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

/// Aborts the run on the first Ctrl-C
fn abort_on_ctrl_c(handle: WorkerHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current page");
            handle.abort();
        }
    });
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let settings = LoaderSettings::from_listing(&config.listing)?;

    println!("=== Spell-Harvest Dry Run ===\n");

    println!("Listing pages ({}):", settings.len());
    for url in settings.urls()? {
        println!("  {}", url);
    }

    println!("\nDetail base URL: {}", config.detail.base_url);

    println!("\nRetry:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!(
        "  Backoff: {}-{}s, x{} per attempt, capped at {}s",
        config.retry.min_backoff_secs,
        config.retry.max_backoff_secs,
        config.retry.multiplier,
        config.retry.max_delay_secs
    );

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);

    match config.pipeline.capacity() {
        Some(capacity) => println!("\nHand-off queue: bounded at {}", capacity),
        None => println!("\nHand-off queue: unbounded"),
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --list-only mode: runs the listing stage alone
async fn handle_list_only(config: &Config, notifier: LogNotifier) -> anyhow::Result<()> {
    let loader: Arc<dyn PageLoader> = Arc::new(HttpLoader::new(&config.http)?);
    let notifier: Arc<dyn Notifier<LinkList>> = Arc::new(notifier);

    let mut worker = ParserWorker::new(
        "listing",
        LoaderSettings::from_listing(&config.listing)?,
        Arc::new(LinkListStrategy::from_config(&config.selectors)?),
        loader,
        notifier,
    )
    .with_retry(RetryPolicy::from_config(&config.retry))
    .with_parse_failure(config.pipeline.parse_failure);

    abort_on_ctrl_c(worker.handle());

    let report = worker.start().await?;
    tracing::info!(
        "Listing {}: {} link lists, {} pages skipped",
        report.outcome,
        report.records_emitted,
        report.pages_skipped()
    );

    Ok(())
}

/// Handles the main harvest: listing stage feeding the detail stage
async fn handle_harvest(config: &Config, notifier: LogNotifier) -> anyhow::Result<()> {
    let loader: Arc<dyn PageLoader> = Arc::new(HttpLoader::new(&config.http)?);
    let list_notifier: Arc<dyn Notifier<LinkList>> = Arc::new(notifier);
    let record_notifier: Arc<dyn Notifier<SpellRecord>> = Arc::new(notifier);

    let pipeline = TwoStagePipeline::from_config(config, loader, list_notifier, record_notifier)?;
    abort_on_ctrl_c(pipeline.handle());

    let report = pipeline.run().await?;

    if report.is_aborted() {
        tracing::warn!(
            "Harvest aborted: {} spells collected, {} pages skipped",
            report.records_emitted(),
            report.pages_skipped()
        );
    } else {
        tracing::info!(
            "Harvest completed: {} spells collected, {} pages skipped",
            report.records_emitted(),
            report.pages_skipped()
        );
    }

    Ok(())
}
