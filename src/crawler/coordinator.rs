//! Crawl coordinator - the shared registry manager all workers call into
//!
//! One instance is shared by every fetch worker. It owns:
//! - the domain registry and its two scheduling queues, behind a single
//!   mutex/condvar pair held for the whole of the selection algorithm;
//! - the docid allocator and registry log, behind their own narrower lock
//!   (taken while the domain lock is held, never the reverse, so there is
//!   no ordering cycle);
//! - the visit counters and the crawl/error logs, each with its own lock;
//! - the document store and the process-wide running flag.
//!
//! No lock is ever held across a network call: workers fetch outside and
//! come back in through `add_pages`/`set_robots_rules`/`count_crawled`.

use crate::config::Config;
use crate::crawler::domain::{Domain, PendingPage};
use crate::crawler::politeness::PolitenessClock;
use crate::crawler::registry::DomainRegistry;
use crate::output::{CrawlLog, CrawlOutcome, ErrorLog, StatsSnapshot};
use crate::robots::{RobotsRule, RobotsState};
use crate::storage::{DocStore, PageMeta, RegistryLog};
use crate::url::{extract_domain, normalize_url, DomainFilter};
use crate::{CrawlError, DocId, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use url::Url;

/// A unit of crawl work: one URL and its docid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub url: String,
    pub docid: DocId,
}

/// What a worker gets back from [`Coordinator::pop_page`].
///
/// A required robots fetch is an expected, frequent outcome of scheduling,
/// so it is a variant here rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlJob {
    /// Fetch this page, analyze it, persist it.
    Page(PageRef),
    /// Fetch this domain's robots.txt and install the parsed rules before
    /// any of its pages can be served.
    Robots { host: String, page: PageRef },
}

/// Summary of a registry-log replay at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Pages whose document already sits in the store; recorded for dedup,
    /// not re-queued.
    pub retrieved: usize,
    /// Pages re-queued for fetching under their original docid.
    pub pending: usize,
}

/// Docid allocation plus the synchronous registry-log append, under one lock.
struct DocIdAllocator {
    last: DocId,
    log: RegistryLog,
}

impl DocIdAllocator {
    /// Assigns the next docid and durably records the URL. A log append
    /// failure is fatal: an id that is not on disk was never assigned.
    fn register(&mut self, url: &str) -> Result<DocId> {
        let docid = self.last + 1;
        self.log
            .append(docid, url)
            .map_err(CrawlError::RegistryLog)?;
        self.last = docid;
        Ok(docid)
    }

    fn resume_from(&mut self, docid: DocId) {
        if docid > self.last {
            self.last = docid;
        }
    }
}

#[derive(Default)]
struct VisitCounters {
    crawled: u64,
    downloaded: u64,
}

pub struct Coordinator {
    clock: PolitenessClock,
    filter: DomainFilter,
    registry: Mutex<DomainRegistry>,
    /// Signaled when registration fills previously empty queues and when
    /// robots rules make a parked domain servable.
    work_ready: Condvar,
    allocator: Mutex<DocIdAllocator>,
    counters: Mutex<VisitCounters>,
    crawl_log: CrawlLog,
    error_log: ErrorLog,
    store: DocStore,
    running: AtomicBool,
}

/// Extra sleep added to every timed wait so a domain is comfortably past its
/// timestamp when the queue is re-examined.
const RETRY_EPSILON: Duration = Duration::from_secs(1);

impl Coordinator {
    /// Opens the coordinator over a store directory, creating it and the
    /// log files as needed.
    pub fn open(config: &Config) -> Result<Self> {
        let root = Path::new(&config.store.root);
        fs::create_dir_all(root)?;

        let log = RegistryLog::open(&root.join("docids.log")).map_err(CrawlError::RegistryLog)?;

        Ok(Self {
            clock: PolitenessClock::new(Duration::from_secs(config.crawler.min_interval_secs)),
            filter: DomainFilter::new(config.crawler.accepted_suffixes.clone()),
            registry: Mutex::new(DomainRegistry::new()),
            work_ready: Condvar::new(),
            allocator: Mutex::new(DocIdAllocator { last: 0, log }),
            counters: Mutex::new(VisitCounters::default()),
            crawl_log: CrawlLog::open(&root.join("crawl.log"))?,
            error_log: ErrorLog::open(&root.join("errors.log"))?,
            store: DocStore::new(root),
            running: AtomicBool::new(true),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Clears the running flag and wakes every blocked worker so shutdown
    /// can join them.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.work_ready.notify_all();
    }

    pub fn doc_store(&self) -> &DocStore {
        &self.store
    }

    /// Registers a URL: assigns the next docid and appends the record to the
    /// durable registry log.
    pub fn register_url(&self, url: &str) -> Result<DocId> {
        self.allocator.lock().register(url)
    }

    /// Docid a URL was registered under, if it ever was.
    pub fn registered_docid(&self, url: &str) -> Option<DocId> {
        let url = normalize_url(url).ok()?;
        let host = extract_domain(&url)?;
        let reg = self.registry.lock();
        reg.get(&host)?.docid_for(url.path())
    }

    /// Enqueues newly discovered URLs.
    ///
    /// URLs are normalized, filtered by the accepted-domain policy, grouped
    /// by host, and deduplicated against each domain's known paths. Only
    /// genuinely new paths are registered (docid + log record) and queued.
    /// Unparseable or off-policy links are dropped silently; duplicates are
    /// a no-op.
    pub fn add_pages(&self, candidates: &[String]) -> Result<()> {
        let mut by_host: HashMap<String, Vec<Url>> = HashMap::new();
        for raw in candidates {
            let url = match normalize_url(raw) {
                Ok(url) => url,
                Err(e) => {
                    tracing::trace!(url = %raw, "dropping link: {}", e);
                    continue;
                }
            };
            let Some(host) = extract_domain(&url) else {
                continue;
            };
            if !self.filter.accepts(&host) {
                tracing::trace!(%host, "outside accepted domains");
                continue;
            }
            by_host.entry(host).or_default().push(url);
        }
        if by_host.is_empty() {
            return Ok(());
        }

        let now = Instant::now();
        let mut reg = self.registry.lock();
        let was_empty = reg.queues_empty();

        for (host, urls) in by_host {
            if !reg.contains(&host) {
                let scheme = urls[0].scheme().to_string();
                reg.insert(Domain::new(host.clone(), scheme, now));
                tracing::debug!(%host, "new domain");
            }
            for url in urls {
                let path = url.path().to_string();
                if reg.get(&host).map(|d| d.knows_path(&path)).unwrap_or(false) {
                    continue;
                }
                let docid = self.allocator.lock().register(url.as_str())?;
                let dom = reg.get_mut(&host).expect("domain inserted above");
                dom.record_path(&path, docid);
                if path == "/robots.txt" {
                    // Routed through the robots gate, never the page queue
                    dom.robots_docid.get_or_insert(docid);
                    continue;
                }
                dom.push_pending(PendingPage {
                    path,
                    url: url.as_str().to_string(),
                    docid,
                });
            }
            reg.enqueue_idle(&host);
        }

        // Threads may be parked waiting for the first work to show up
        if was_empty && !reg.queues_empty() {
            self.work_ready.notify_all();
        }
        Ok(())
    }

    /// Replays the registry log after a restart.
    ///
    /// Every record keeps its original docid: pages whose document already
    /// exists are only recorded against future duplicate registration, the
    /// rest are re-queued for fetching. The allocator resumes past the
    /// highest replayed id, so no docid is ever reassigned.
    pub fn restore(&self) -> Result<RestoreSummary> {
        let log_path = self.allocator.lock().log.path().to_path_buf();
        let entries = RegistryLog::replay(&log_path).map_err(CrawlError::RegistryReplay)?;

        let mut summary = RestoreSummary::default();
        let now = Instant::now();
        let mut hosts_seen: HashSet<String> = HashSet::new();
        let mut max_id: DocId = 0;

        let mut reg = self.registry.lock();
        let was_empty = reg.queues_empty();

        for (docid, raw) in entries {
            max_id = max_id.max(docid);
            let url = match normalize_url(&raw) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(url = %raw, docid, "unreadable registry record: {}", e);
                    continue;
                }
            };
            let Some(host) = extract_domain(&url) else {
                continue;
            };
            if !self.filter.accepts(&host) {
                continue;
            }
            if !reg.contains(&host) {
                reg.insert(Domain::new(host.clone(), url.scheme(), now));
            }
            hosts_seen.insert(host.clone());

            let dom = reg.get_mut(&host).expect("domain inserted above");
            let path = url.path().to_string();
            if dom.knows_path(&path) {
                continue;
            }
            dom.record_path(&path, docid);
            if path == "/robots.txt" {
                // Re-attach the docid; rules are refetched on demand
                dom.robots_docid = Some(docid);
                continue;
            }
            if self.store.page_exists(docid) {
                summary.retrieved += 1;
            } else {
                dom.push_pending(PendingPage {
                    path,
                    url: url.as_str().to_string(),
                    docid,
                });
                summary.pending += 1;
            }
        }

        for host in &hosts_seen {
            reg.enqueue_idle(host);
        }
        self.allocator.lock().resume_from(max_id);

        if was_empty && !reg.queues_empty() {
            self.work_ready.notify_all();
        }
        Ok(summary)
    }

    /// Hands out the next unit of crawl work.
    ///
    /// Selection algorithm, all under the domain lock:
    /// 1. Both queues empty: park on the condvar until registration signals.
    /// 2. Refresh: promote every time-eligible idle domain, freezing its
    ///    backlog as the active-queue priority.
    /// 3. Nothing active: sleep (lock released by the timed wait) until the
    ///    idle front's timestamp, plus an epsilon, then refresh again. Both
    ///    queues empty here is a scheduling bug, reported as such.
    /// 4. Pop the best active domain: largest frozen backlog, ties to the
    ///    staler timestamp.
    /// 5. Reserve the domain's next politeness slot immediately, before any
    ///    fetch happens.
    /// 6. Ask the domain for a page: an unknown robots state yields a
    ///    robots job instead; disallowed pages are skipped with CRAW
    ///    accounting.
    /// 7. Re-queue the domain at the idle tail if it still has work.
    ///
    /// Returns None when the coordinator is shut down.
    pub fn pop_page(&self) -> Result<Option<CrawlJob>> {
        let mut reg = self.registry.lock();
        loop {
            if !self.is_running() {
                return Ok(None);
            }
            if reg.queues_empty() {
                self.work_ready.wait(&mut reg);
                continue;
            }

            let now = Instant::now();
            reg.promote_eligible(&self.clock, now);

            if reg.active_is_empty() {
                let Some(stamp) = reg.next_idle_stamp() else {
                    return Err(CrawlError::SchedulerStarved);
                };
                let wait = stamp.saturating_duration_since(now) + RETRY_EPSILON;
                let _ = self.work_ready.wait_for(&mut reg, wait);
                continue;
            }

            let host = reg.pop_active().expect("active queue checked non-empty");
            let next_slot = self.clock.next_slot(now);

            enum Gate {
                NeedsRobots { url: String, docid: Option<DocId> },
                RobotsOutstanding,
                Serve,
            }

            let gate = {
                let dom = reg
                    .get_mut(&host)
                    .ok_or_else(|| CrawlError::UnknownDomain(host.clone()))?;
                // Reserve the next slot now so concurrent pops of other
                // domains cannot double-book this one.
                dom.not_before = next_slot;
                match dom.robots {
                    RobotsState::Unknown => Gate::NeedsRobots {
                        url: dom.robots_url(),
                        docid: dom.robots_docid,
                    },
                    RobotsState::Fetching => Gate::RobotsOutstanding,
                    RobotsState::Rules(_) => Gate::Serve,
                }
            };

            match gate {
                Gate::NeedsRobots { url, docid } => {
                    let docid = match docid {
                        Some(id) => id,
                        None => self.allocator.lock().register(&url)?,
                    };
                    let dom = reg.get_mut(&host).expect("domain present");
                    dom.robots = RobotsState::Fetching;
                    dom.robots_docid = Some(docid);
                    dom.record_path("/robots.txt", docid);
                    reg.enqueue_idle(&host);
                    return Ok(Some(CrawlJob::Robots {
                        host,
                        page: PageRef { url, docid },
                    }));
                }
                Gate::RobotsOutstanding => {
                    // Exactly one robots fetch per domain may be in flight;
                    // park the domain again and serve another one.
                    reg.enqueue_idle(&host);
                    continue;
                }
                Gate::Serve => {
                    let (popped, skipped) =
                        reg.get_mut(&host).expect("domain present").pop_allowed();
                    for page in &skipped {
                        tracing::debug!(url = %page.url, "robots-disallowed, skipping");
                        self.account_visit(page.docid, &page.url, CrawlOutcome::Visited);
                    }
                    reg.enqueue_idle(&host);
                    match popped {
                        Some(page) => {
                            return Ok(Some(CrawlJob::Page(PageRef {
                                url: page.url,
                                docid: page.docid,
                            })))
                        }
                        // Queue drained through the skip loop; pick another
                        None => continue,
                    }
                }
            }
        }
    }

    /// Installs parsed robots rules for a domain and releases its queue.
    ///
    /// Idempotent: once rules are set they are never replaced. Wakes workers
    /// sleeping on eligibility so the domain's pages get served promptly.
    pub fn set_robots_rules(&self, host: &str, rules: Vec<RobotsRule>) -> Result<()> {
        let mut reg = self.registry.lock();
        let dom = reg
            .get_mut(host)
            .ok_or_else(|| CrawlError::UnknownDomain(host.to_string()))?;
        if !matches!(dom.robots, RobotsState::Rules(_)) {
            tracing::debug!(%host, rules = rules.len(), "robots rules installed");
            dom.robots = RobotsState::Rules(rules);
        }
        reg.enqueue_idle(host);
        self.work_ready.notify_all();
        Ok(())
    }

    /// Persists a fetched document. Failure is crawl-fatal.
    pub fn save_document(&self, docid: DocId, body: &[u8], meta: &PageMeta) -> Result<()> {
        self.store
            .save(docid, body, meta)
            .map_err(|source| CrawlError::DocStore { docid, source })
    }

    /// Records the outcome of one visit: counters plus a crawl-log record.
    pub fn count_crawled(&self, page: &PageRef, downloaded: bool) {
        let outcome = if downloaded {
            CrawlOutcome::Downloaded
        } else {
            CrawlOutcome::Visited
        };
        self.account_visit(page.docid, &page.url, outcome);
    }

    /// Appends to the error log. Observability only; a write failure is
    /// logged and swallowed.
    pub fn report_bad_crawling(&self, docid: DocId, url: &str, message: &str) {
        tracing::debug!(docid, %url, "bad crawling: {}", message);
        if let Err(e) = self.error_log.report(docid, url, message) {
            tracing::warn!("error log write failed: {}", e);
        }
    }

    /// Aggregate view for the stats reporter. Counter reads are not
    /// synchronized with the domain structure; slight staleness is fine.
    pub fn stats_snapshot(&self) -> StatsSnapshot {
        let (active_domains, idle_domains, next_eligible) = {
            let reg = self.registry.lock();
            let (active, idle) = reg.queue_depths();
            (active, idle, reg.next_eligibility(&self.clock, Instant::now()))
        };
        let (crawled, downloaded) = {
            let counters = self.counters.lock();
            (counters.crawled, counters.downloaded)
        };
        StatsSnapshot {
            seen: self.allocator.lock().last,
            crawled,
            downloaded,
            active_domains,
            idle_domains,
            next_eligible_secs: next_eligible.map(|d| d.as_secs()).unwrap_or(0),
        }
    }

    fn account_visit(&self, docid: DocId, url: &str, outcome: CrawlOutcome) {
        {
            let mut counters = self.counters.lock();
            counters.crawled += 1;
            if outcome == CrawlOutcome::Downloaded {
                counters.downloaded += 1;
            }
        }
        if let Err(e) = self.crawl_log.record(outcome, docid, url) {
            tracing::warn!("crawl log write failed: {}", e);
        }
    }
}
