//! Aranha: a polite, restartable focused crawler
//!
//! This crate implements the crawl core: a per-domain scheduler with
//! politeness and robots.txt gating, a pool of fetch worker threads, and a
//! durable URL/document registry that survives restarts.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Unique identifier assigned to every URL at first-sight registration.
///
/// Monotonically increasing, never reused. The registry log is the durable
/// record of every assignment.
pub type DocId = u64;

/// Main error type for crawl operations
///
/// Per-page fetch failures are *not* represented here; they live in
/// [`crawler::FetchError`] and are absorbed by the worker loop. Everything in
/// this enum either aborts startup or aborts the crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry log write failed: {0}")]
    RegistryLog(#[source] std::io::Error),

    #[error("Registry log is unreadable: {0}")]
    RegistryReplay(#[source] std::io::Error),

    #[error("Document store failure for docid {docid}: {source}")]
    DocStore {
        docid: DocId,
        source: std::io::Error,
    },

    #[error("Scheduler invariant violated: no domains left while work was expected")]
    SchedulerStarved,

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlJob, FetchWorker, Fetcher, PageRef};
pub use robots::{RobotsRule, RobotsState};
