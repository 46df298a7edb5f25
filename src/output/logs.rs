//! Append-only crawl and error logs
//!
//! Each log has its own lock and writes are unbuffered, so a crash loses at
//! most the record being written. Failures here are reported to the caller
//! but are not crawl-fatal; these files are observability, not crawl state.

use crate::DocId;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Visit outcome recorded in the crawl log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Content fetched and persisted to the document store.
    Downloaded,
    /// Visited for accounting purposes but not downloaded (fetch failure,
    /// robots-disallowed skip).
    Visited,
}

impl CrawlOutcome {
    fn tag(self) -> &'static str {
        match self {
            CrawlOutcome::Downloaded => "DOWN",
            CrawlOutcome::Visited => "CRAW",
        }
    }
}

/// `<ts>\t<DOWN|CRAW>\t<docid>\t<url>` records.
pub struct CrawlLog {
    file: Mutex<File>,
}

impl CrawlLog {
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self {
            file: Mutex::new(OpenOptions::new().create(true).append(true).open(path)?),
        })
    }

    pub fn record(&self, outcome: CrawlOutcome, docid: DocId, url: &str) -> io::Result<()> {
        let mut file = self.file.lock();
        writeln!(file, "{}\t{}\t{}\t{}", unix_now(), outcome.tag(), docid, url)?;
        file.flush()
    }
}

/// `<ts>\t<docid>\t<url>\t<message>` records for failed crawl attempts.
pub struct ErrorLog {
    file: Mutex<File>,
}

impl ErrorLog {
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self {
            file: Mutex::new(OpenOptions::new().create(true).append(true).open(path)?),
        })
    }

    pub fn report(&self, docid: DocId, url: &str, message: &str) -> io::Result<()> {
        let mut file = self.file.lock();
        // Keep records one-per-line even for multi-line error messages
        let message = message.replace('\n', " ");
        writeln!(file, "{}\t{}\t{}\t{}", unix_now(), docid, url, message)?;
        file.flush()
    }
}

pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
