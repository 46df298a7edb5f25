//! Aranha main entry point
//!
//! Command-line interface for the crawler: load and validate the
//! configuration, set up logging, and hand off to the crawl core.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Aranha: a polite, restartable focused crawler
///
/// Crawls the configured domain space while respecting robots.txt and
/// per-domain politeness intervals, persisting every fetched document to a
/// durable store that survives restarts.
#[derive(Parser, Debug)]
#[command(name = "aranha")]
#[command(version)]
#[command(about = "A polite, restartable focused crawler", long_about = None)]
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

    /// Validate the configuration and show what would be crawled, without
    /// crawling
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("loading configuration from {}", cli.config.display());
    let (config, config_hash) = aranha::config::load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!(hash = %config_hash, "configuration loaded");

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    aranha::crawler::run_crawl(config).context("crawl failed")?;
    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("aranha=info,warn"),
            1 => EnvFilter::new("aranha=debug,info"),
            2 => EnvFilter::new("aranha=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_dry_run(config: &aranha::Config) {
    println!("Crawler:");
    println!("  workers: {}", config.crawler.workers);
    println!("  min interval: {}s", config.crawler.min_interval_secs);
    println!("  stats interval: {}s", config.crawler.stats_interval_secs);
    if config.crawler.accepted_suffixes.is_empty() {
        println!("  accepted domains: all");
    } else {
        println!(
            "  accepted domains: *{}",
            config.crawler.accepted_suffixes.join(", *")
        );
    }

    println!("\nUser agent:");
    println!(
        "  {}/{} (+{}; {})",
        config.user_agent.crawler_name,
        config.user_agent.crawler_version,
        config.user_agent.contact_url,
        config.user_agent.contact_email
    );

    println!("\nStore: {}", config.store.root);

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\nConfiguration is valid.");
}
