//! Headless-browser fetch backend for JavaScript-heavy sites.
//!
//! Uses chromiumoxide (CDP). The browser is launched lazily on first fetch
//! and reused for the rest of the run; fetches are serialized through it.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use chrono::Utc;
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use super::{FetchError, FetchMethod, Fetcher, RawDocument};

pub struct BrowserFetcher {
    browser: Mutex<Option<Browser>>,
    nav_timeout: Duration,
    user_agent: String,
}

impl BrowserFetcher {
    pub fn new(user_agent: &str, nav_timeout: Duration) -> Self {
        Self {
            browser: Mutex::new(None),
            nav_timeout,
            user_agent: user_agent.to_string(),
        }
    }

    async fn launch(&self) -> Result<Browser, FetchError> {
        info!("launching headless browser");
        let config = BrowserConfig::builder()
            .no_sandbox()
            .arg(format!("--user-agent={}", self.user_agent))
            .build()
            .map_err(FetchError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        // The handler must be driven for the browser connection to make progress.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }

    /// Shut the browser down, if it was launched.
    pub async fn close(&self) {
        if let Some(mut browser) = self.browser.lock().await.take() {
            let _ = browser.close().await;
        }
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &Url) -> Result<RawDocument, FetchError> {
        let mut guard = self.browser.lock().await;
        if guard.is_none() {
            *guard = Some(self.launch().await?);
        }
        let Some(browser) = guard.as_ref() else {
            return Err(FetchError::Browser("browser not running".to_string()));
        };

        debug!("rendering {url}");
        let render = async {
            let page = browser.new_page(url.as_str()).await?;
            page.wait_for_navigation().await?;
            let body = page.content().await?;
            let final_url = page.url().await?.unwrap_or_else(|| url.to_string());
            let _ = page.close().await;
            Ok::<_, chromiumoxide::error::CdpError>((body, final_url))
        };

        let (body, final_url) = tokio::time::timeout(self.nav_timeout, render)
            .await
            .map_err(|_| FetchError::Timeout(self.nav_timeout))?
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        Ok(RawDocument {
            url: url.to_string(),
            final_url,
            // CDP does not expose the document status; a rendered page counts
            // as success.
            status: 200,
            body,
            content_type: Some("text/html".to_string()),
            fetched_at: Utc::now(),
        })
    }

    fn method(&self) -> FetchMethod {
        FetchMethod::Browser
    }
}
