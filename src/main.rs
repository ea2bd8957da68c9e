//! Reel-Harvest main entry point
//!
//! This is the command-line interface for the Reel-Harvest media scraper.

use anyhow::Context;
use clap::Parser;
use reel_harvest::config::{load_config_with_hash, Config};
use reel_harvest::extract::SharedDataExtractor;
use reel_harvest::harvest::run_harvest;
use reel_harvest::output::{print_report, render_json_lines, summarize};
use reel_harvest::proxy::{load_proxy_list, ProxyValidator, RotationStrategy};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Reel-Harvest: media scraping through rotating proxies
///
/// Reel-Harvest validates a list of HTTP proxies, fetches each target page
/// through them with retries, and prints the videos embedded in the page.
#[derive(Parser, Debug)]
#[command(name = "reel-harvest")]
#[command(version)]
#[command(about = "Media scraping through rotating proxies", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Pages to harvest (defaults to [target] urls from the config)
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the proxy rotation strategy (round-robin or random)
    #[arg(long, value_name = "STRATEGY")]
    strategy: Option<RotationStrategy>,

    /// Print records as JSON lines instead of a text report
    #[arg(long)]
    json: bool,

    /// Validate the proxy list, print the working proxies and exit
    #[arg(long, conflicts_with = "json")]
    check_proxies: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(strategy) = cli.strategy {
        config.fetcher.strategy = strategy;
    }

    if cli.check_proxies {
        handle_check_proxies(&config).await?;
    } else {
        let urls = if cli.urls.is_empty() {
            config.target.urls.clone()
        } else {
            cli.urls.clone()
        };
        handle_harvest(&config, &urls, cli.json).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("reel_harvest=info,warn"),
            1 => EnvFilter::new("reel_harvest=debug,info"),
            2 => EnvFilter::new("reel_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns a receiver that turns true on Ctrl-C
fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling in-flight fetches");
            let _ = tx.send(true);
        }
    });
    rx
}

/// Handles the --check-proxies mode: validates the list and prints survivors
async fn handle_check_proxies(config: &Config) -> anyhow::Result<()> {
    let candidates = load_proxy_list(Path::new(&config.proxy.list_path))
        .context("loading proxy list")?;
    let total = candidates.len();

    let alive = ProxyValidator::from_config(config)
        .validate(candidates)
        .await;

    println!("=== Proxy Check ===\n");
    println!("Probe URL: {}", config.proxy.probe_url);
    println!("Working proxies ({} / {}):", alive.len(), total);
    for proxy in &alive {
        println!("  {}", proxy);
    }

    if alive.is_empty() {
        anyhow::bail!("no proxy passed validation");
    }

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config, urls: &[String], json: bool) -> anyhow::Result<()> {
    if urls.is_empty() {
        anyhow::bail!("no target URLs given on the command line or in [target] urls");
    }

    tracing::info!(
        "Using {} rotation with up to {} attempts per page",
        config.fetcher.strategy.as_str(),
        config.fetcher.max_retries
    );

    let extractor = SharedDataExtractor::new();
    let pages = run_harvest(config, urls, &extractor, shutdown_on_ctrl_c())
        .await
        .context("initializing proxy pool")?;

    if json {
        print!("{}", render_json_lines(&pages)?);
    } else {
        print_report(&pages);
    }

    let summary = summarize(&pages);
    if summary.all_failed() {
        anyhow::bail!("none of the {} page(s) could be harvested", summary.total_pages);
    }

    Ok(())
}
