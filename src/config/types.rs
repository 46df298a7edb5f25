use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub store: StoreConfig,
    /// Seed URLs injected into the frontier at startup. May be empty when
    /// resuming a crawl whose frontier is already on disk.
    #[serde(default)]
    pub seeds: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of parallel fetch worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Minimum interval between visits to the same domain (seconds)
    #[serde(rename = "min-interval-secs", default = "default_min_interval")]
    pub min_interval_secs: u64,

    /// How often the stats reporter writes a snapshot (seconds)
    #[serde(rename = "stats-interval-secs", default = "default_stats_interval")]
    pub stats_interval_secs: u64,

    /// Hostname suffixes the crawl is restricted to (e.g. [".br"]).
    /// Empty means every host is accepted.
    #[serde(rename = "accepted-suffixes", default)]
    pub accepted_suffixes: Vec<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Durable store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the registry log, document store, and crawl logs
    pub root: String,
}

fn default_workers() -> usize {
    20
}

fn default_min_interval() -> u64 {
    30
}

fn default_stats_interval() -> u64 {
    10
}
