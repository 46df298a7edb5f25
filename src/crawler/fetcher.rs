//! HTTP fetching
//!
//! The crawl core treats fetching as an opaque capability behind the
//! [`Fetcher`] trait: given a URL, produce status/headers/body or a typed
//! failure. [`HttpFetcher`] is the real implementation; tests substitute
//! in-memory ones.

use crate::config::UserAgentConfig;
use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the content actually came from, after redirects.
    pub final_url: String,
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

/// Per-page fetch failures.
///
/// These are transient, recorded-and-moved-on conditions; none of them ever
/// terminates a worker. The display string is what lands in the error log.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("BAD REDIRECT: {0}")]
    BadRedirect(String),

    #[error("response body unreadable: {0}")]
    Body(String),
}

/// The fetch capability consumed by workers.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for std::sync::Arc<F> {
    fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        (**self).fetch(url)
    }
}

/// Builds the blocking HTTP client used by every worker.
///
/// User agent format: `CrawlerName/Version (+ContactURL; ContactEmail)`.
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Real HTTP fetcher over a shared reqwest blocking client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .text()
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_redirect() {
        // redirect loop, over the hop limit, or into an unsupported scheme
        FetchError::BadRedirect(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}
