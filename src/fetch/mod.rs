//! Fetch backends behind a single adapter contract.
//!
//! The orchestrator only sees the [`Fetcher`] trait; the plain HTTP client
//! and the headless-browser backend both implement it.

#[cfg(feature = "browser")]
mod browser;
mod http;
mod user_agent;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use http::HttpFetcher;
pub use user_agent::{resolve_user_agent, BROWSER_USER_AGENTS, USER_AGENT};

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Which backend produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMethod {
    Http,
    Browser,
}

/// Per-page fetch failures. Never fatal to a crawl.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("browser error: {0}")]
    Browser(String),
}

impl FetchError {
    /// HTTP status code of the failure, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// An unparsed page as returned by a fetch backend.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// URL that was requested.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    pub body: String,
    pub content_type: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Contract between the orchestrator and a fetch backend.
///
/// Implementations carry their own timeout; `fetch` must not block
/// indefinitely.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<RawDocument, FetchError>;

    /// Label recorded on pages produced through this backend.
    fn method(&self) -> FetchMethod;
}
