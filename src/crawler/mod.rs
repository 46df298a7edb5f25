//! Crawl core: scheduling, fetching, and crawl orchestration
//!
//! This module contains the concurrent heart of the crawler:
//! - the shared [`Coordinator`] every worker calls into for work and
//!   registration;
//! - the per-domain state and the two-tier domain scheduling queues;
//! - the fetch worker loop and the capabilities it consumes (HTTP fetch,
//!   page analysis).

mod analyzer;
mod coordinator;
mod domain;
mod fetcher;
mod politeness;
mod registry;
mod worker;

pub use analyzer::{analyze, PageAnalysis};
pub use coordinator::{Coordinator, CrawlJob, PageRef, RestoreSummary};
pub use domain::{Domain, PendingPage, QueueSlot};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use politeness::PolitenessClock;
pub use registry::DomainRegistry;
pub use worker::FetchWorker;

use crate::config::Config;
use crate::output::StatsReporter;
use crate::Result;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Runs a complete crawl.
///
/// 1. Opens the coordinator over the store directory
/// 2. Replays the registry log so an interrupted crawl resumes
/// 3. Seeds the frontier from the configured URLs
/// 4. Spawns the stats reporter and the worker pool
/// 5. Blocks until the operator presses Enter
/// 6. Shuts down: clears the flag, joins workers, joins the reporter
///
/// An error from any worker (registry log or document store failure) stops
/// the whole crawl and is returned after the pool drains.
pub fn run_crawl(config: Config) -> Result<()> {
    let coordinator = Arc::new(Coordinator::open(&config)?);

    let summary = coordinator.restore()?;
    tracing::info!(
        retrieved = summary.retrieved,
        pending = summary.pending,
        "registry log replayed"
    );

    coordinator.add_pages(&config.seeds)?;
    tracing::info!(seeds = config.seeds.len(), "frontier seeded");

    let stats = StatsReporter::open(
        coordinator.clone(),
        Duration::from_secs(config.crawler.stats_interval_secs),
        &Path::new(&config.store.root).join("stats.log"),
    )?;
    let stats_handle = stats.spawn()?;

    let fetcher = HttpFetcher::new(&config.user_agent)?;
    let mut workers = Vec::with_capacity(config.crawler.workers);
    for id in 0..config.crawler.workers {
        let worker = FetchWorker::new(id, coordinator.clone(), fetcher.clone());
        let handle = thread::Builder::new()
            .name(format!("fetch-{}", id))
            .spawn(move || worker.run())?;
        workers.push(handle);
    }
    tracing::info!(workers = workers.len(), "worker pool started");

    // The operator stops the crawl; workers block indefinitely when the
    // frontier drains, waiting for new discoveries.
    println!("Crawling. Press Enter to stop.");
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);

    tracing::info!("shutting down, waiting for in-flight fetches");
    coordinator.shutdown();

    let mut first_error = None;
    for handle in workers {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => first_error = first_error.or(Some(e)),
            Err(_) => tracing::error!("a worker thread panicked"),
        }
    }
    if stats_handle.join().is_err() {
        tracing::error!("the stats thread panicked");
    }

    let stats = coordinator.stats_snapshot();
    tracing::info!(
        seen = stats.seen,
        crawled = stats.crawled,
        downloaded = stats.downloaded,
        "crawl finished"
    );

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
