//! Weft main entry point
//!
//! Command-line interface for the Weft crawl engine.

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use weft::config::load_config_with_hash;
use weft::engine::{run_crawl, RetryPolicy};
use weft::fetch::build_http_client;
use weft::handler::{ImageHarvestHandler, TextFileHandler};
use weft::store::SqliteDedupStore;

/// Which of the shipped handlers drives the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Save every fetched page as a text file
    Page,
    /// Follow page links and download referenced images
    Images,
}

/// Weft: a generic concurrent crawl engine
#[derive(Parser, Debug)]
#[command(name = "weft")]
#[command(version = "1.0.0")]
#[command(about = "A generic concurrent crawl engine", long_about = None)]
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

    /// Which handler to crawl with
    #[arg(long, value_enum, default_value_t = Mode::Page)]
    mode: Mode,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, cli.mode);
        return Ok(());
    }

    handle_crawl(config, cli.mode).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("weft=info,warn"),
            1 => EnvFilter::new("weft=debug,info"),
            2 => EnvFilter::new("weft=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the resolved setup
fn handle_dry_run(config: &weft::Config, mode: Mode) {
    println!("=== Weft Dry Run ===\n");

    println!("Engine:");
    println!("  Pool size: {}", config.engine.pool_size);
    println!("  Retry count: {}", config.engine.retry_count);
    println!("  Fetch timeout: {}ms", config.engine.fetch_timeout_ms);

    println!("\nIdentity:");
    if config.identity.user_agents.is_empty() {
        println!("  User agents: built-in defaults");
    } else {
        println!("  User agents: {} configured", config.identity.user_agents.len());
    }
    match config.identity.rng_seed {
        Some(seed) => println!("  RNG seed: {}", seed),
        None => println!("  RNG seed: from entropy"),
    }

    println!("\nHeaders ({}):", config.headers.len());
    for name in config.headers.keys() {
        println!("  - {}", name);
    }

    println!("\nProxies ({}):", config.proxies.len());
    for proxy in &config.proxies {
        println!("  - {}", proxy);
    }

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\nMode: {:?}", mode);
    match mode {
        Mode::Page => println!("  Pages written to: {}", config.archive.page_directory),
        Mode::Images => {
            println!("  Images written to: {}", config.archive.image_directory);
            println!("  Dedup database: {}", config.store.database_path);
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: weft::Config, mode: Mode) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Starting crawl: {} seed(s), mode {:?}",
        config.seeds.len(),
        mode
    );

    let result = match mode {
        Mode::Page => {
            let handler = TextFileHandler::new(&config.archive.page_directory);
            run_crawl(&config, handler).await
        }
        Mode::Images => {
            let store = SqliteDedupStore::new(Path::new(&config.store.database_path))?;
            let client = build_http_client(config.engine.fetch_timeout(), None)?;
            let handler = ImageHarvestHandler::new(
                store,
                &config.archive.image_directory,
                client,
                RetryPolicy::new(config.engine.retry_count),
            );
            run_crawl(&config, handler).await
        }
    };

    match result {
        Ok(()) => {
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
