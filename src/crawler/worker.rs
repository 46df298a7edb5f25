//! Fetch worker loop
//!
//! Each worker cycles through: await work → fetch (page or robots.txt) →
//! analyze → register discovered links → persist → report outcome. Per-page
//! failures are recorded and absorbed; only coordinator-fatal conditions
//! (registry log, document store) escape, and then the worker triggers a
//! global shutdown on its way out. The running flag is polled once per
//! iteration; an in-flight fetch is never aborted.

use crate::crawler::analyzer::{analyze, PageAnalysis};
use crate::crawler::coordinator::{Coordinator, CrawlJob, PageRef};
use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::robots::parse_robots;
use crate::storage::PageMeta;
use crate::Result;
use std::sync::Arc;
use url::Url;

pub struct FetchWorker<F: Fetcher> {
    id: usize,
    coordinator: Arc<Coordinator>,
    fetcher: F,
}

impl<F: Fetcher> FetchWorker<F> {
    pub fn new(id: usize, coordinator: Arc<Coordinator>, fetcher: F) -> Self {
        Self {
            id,
            coordinator,
            fetcher,
        }
    }

    /// Runs until shutdown or a fatal error. A fatal error flips the global
    /// running flag so the rest of the pool drains too.
    pub fn run(&self) -> Result<()> {
        let result = self.crawl_loop();
        if let Err(e) = &result {
            tracing::error!(worker = self.id, "worker aborting crawl: {}", e);
            self.coordinator.shutdown();
        }
        tracing::debug!(worker = self.id, "worker exiting");
        result
    }

    fn crawl_loop(&self) -> Result<()> {
        while self.coordinator.is_running() {
            let Some(job) = self.coordinator.pop_page()? else {
                break;
            };
            match job {
                CrawlJob::Robots { host, page } => self.fetch_robots(&host, &page)?,
                CrawlJob::Page(page) => self.crawl_page(&page)?,
            }
        }
        Ok(())
    }

    /// Fetches and installs a domain's robots.txt.
    ///
    /// Any failure here means the domain is crawled unrestricted: an empty
    /// rule list is installed and the crawl moves on. The worker does not
    /// keep any page from this round; it loops back for more work.
    fn fetch_robots(&self, host: &str, page: &PageRef) -> Result<()> {
        match self.fetcher.fetch(&page.url) {
            Ok(fetched) => {
                let rules = parse_robots(&fetched.body);
                tracing::debug!(worker = self.id, %host, rules = rules.len(), "fetched robots.txt");
                self.coordinator
                    .save_document(page.docid, fetched.body.as_bytes(), &PageMeta::opaque())?;
                self.coordinator.set_robots_rules(host, rules)?;
                self.coordinator.count_crawled(page, true);
            }
            Err(e) => {
                tracing::debug!(worker = self.id, %host, "no robots.txt, allowing all: {}", e);
                self.coordinator
                    .report_bad_crawling(page.docid, &page.url, &e.to_string());
                self.coordinator.set_robots_rules(host, Vec::new())?;
                self.coordinator.count_crawled(page, false);
            }
        }
        Ok(())
    }

    fn crawl_page(&self, page: &PageRef) -> Result<()> {
        let fetched = match self.fetcher.fetch(&page.url) {
            Ok(fetched) => fetched,
            Err(e) => {
                self.coordinator
                    .report_bad_crawling(page.docid, &page.url, &e.to_string());
                self.coordinator.count_crawled(page, false);
                return Ok(());
            }
        };

        let meta = match self.analyze_page(page, &fetched) {
            Some(analysis) => {
                if analysis.follow && !analysis.links.is_empty() {
                    self.coordinator.add_pages(&analysis.links)?;
                }
                if let Some(title) = &analysis.title {
                    tracing::debug!(worker = self.id, url = %page.url, %title, "fetched");
                }
                PageMeta {
                    encoding: analysis.encoding,
                    follow: analysis.follow,
                    index: analysis.index,
                }
            }
            // stored, but nothing to follow
            None => PageMeta::opaque(),
        };

        self.coordinator
            .save_document(page.docid, fetched.body.as_bytes(), &meta)?;
        self.coordinator.count_crawled(page, true);
        Ok(())
    }

    /// Runs page analysis when the payload is HTML; anything else is stored
    /// without link extraction.
    fn analyze_page(&self, page: &PageRef, fetched: &FetchedPage) -> Option<PageAnalysis> {
        let is_html = fetched.content_type.is_empty() || fetched.content_type.contains("html");
        if !is_html {
            tracing::debug!(
                worker = self.id,
                url = %page.url,
                content_type = %fetched.content_type,
                "not analyzing non-HTML payload"
            );
            return None;
        }
        let base = Url::parse(&fetched.final_url)
            .or_else(|_| Url::parse(&page.url))
            .ok()?;
        Some(analyze(&fetched.body, &base))
    }
}
