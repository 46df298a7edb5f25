//! Observability outputs: crawl/error logs and the periodic stats reporter
//!
//! Everything here is a read-only consumer or an append-only sink; nothing
//! in this module has scheduling authority.

mod logs;
mod stats;

pub use logs::{CrawlLog, CrawlOutcome, ErrorLog};
pub use stats::{StatsReporter, StatsSnapshot};
