//! Error taxonomy for crawl and filter entry points.
//!
//! Per-page fetch failures are represented by [`crate::fetch::FetchError`]
//! and never abort a crawl; the variants here are the failures a caller of
//! the orchestrator or filter can observe.

use thiserror::Error;

/// Top-level errors surfaced by the crawler and filter entry points.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// robots.txt disallows the seed URL. Terminal; no fetches are performed.
    #[error("crawling {url} is not allowed by robots.txt")]
    PolicyDenied { url: String },

    /// A settings or filter definition failed validation.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// The seed URL could not be parsed into an absolute http(s) URL.
    #[error("invalid seed URL: {0}")]
    InvalidSeed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("malformed report: {0}")]
    Report(#[from] serde_json::Error),
}
