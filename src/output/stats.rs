//! Periodic crawl statistics reporter
//!
//! A background thread that polls aggregate counters from the coordinator
//! and appends a snapshot line to the stats log. Strictly read-only: it has
//! no scheduling authority and tolerates slightly stale counter reads.

use crate::crawler::Coordinator;
use crate::output::logs::unix_now;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Point-in-time view of the crawl, taken by the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// URLs registered so far (highest docid handed out).
    pub seen: u64,
    /// Pages visited, downloaded or not.
    pub crawled: u64,
    /// Pages downloaded and persisted.
    pub downloaded: u64,
    /// Domains currently eligible for service.
    pub active_domains: usize,
    /// Domains queued but not yet time-eligible.
    pub idle_domains: usize,
    /// Seconds until the next idle domain becomes eligible; zero when an
    /// active domain is already waiting.
    pub next_eligible_secs: u64,
}

pub struct StatsReporter {
    coordinator: Arc<Coordinator>,
    interval: Duration,
    log: File,
}

impl StatsReporter {
    pub fn open(
        coordinator: Arc<Coordinator>,
        interval: Duration,
        path: &Path,
    ) -> io::Result<Self> {
        Ok(Self {
            coordinator,
            interval,
            log: OpenOptions::new().create(true).append(true).open(path)?,
        })
    }

    /// Starts the reporter thread. It exits shortly after the coordinator's
    /// running flag is cleared.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("stats".to_string())
            .spawn(move || self.run())
    }

    fn run(mut self) {
        let mut prev = StatsSnapshot::default();
        while self.coordinator.is_running() {
            self.sleep_interruptibly();
            if !self.coordinator.is_running() {
                break;
            }
            let snap = self.coordinator.stats_snapshot();
            if let Err(e) = self.write_line(&snap, &prev) {
                tracing::warn!("stats log write failed: {}", e);
            }
            tracing::info!(
                seen = snap.seen,
                crawled = snap.crawled,
                downloaded = snap.downloaded,
                active = snap.active_domains,
                idle = snap.idle_domains,
                "crawl stats"
            );
            prev = snap;
        }
    }

    fn write_line(&mut self, snap: &StatsSnapshot, prev: &StatsSnapshot) -> io::Result<()> {
        writeln!(
            self.log,
            "{}\tSTATS\tseen={}(+{})\tcrawled={}(+{})\tdownloaded={}(+{})\tactive={}\tidle={}\tnext_eligible={}s",
            unix_now(),
            snap.seen,
            snap.seen - prev.seen,
            snap.crawled,
            snap.crawled - prev.crawled,
            snap.downloaded,
            snap.downloaded - prev.downloaded,
            snap.active_domains,
            snap.idle_domains,
            snap.next_eligible_secs,
        )?;
        self.log.flush()
    }

    // Sleep in short slices so shutdown does not wait out a whole interval.
    fn sleep_interruptibly(&self) {
        let slice = Duration::from_millis(250);
        let mut remaining = self.interval;
        while remaining > Duration::ZERO && self.coordinator.is_running() {
            let step = remaining.min(slice);
            thread::sleep(step);
            remaining -= step;
        }
    }
}
