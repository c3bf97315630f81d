//! The crawl orchestrator.
//!
//! Drives a bounded worker pool over the shared frontier: fetch, extract,
//! classify, admit discovered links, and finally assemble the report. One
//! [`Crawler`] run owns all of its state; nothing survives between runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::classify::ClassifierSession;
use crate::error::CrawlError;
use crate::extract::extract;
use crate::fetch::Fetcher;
use crate::filter::{pipeline, CompiledFilter};
use crate::models::{CrawlMetadata, CrawlReport, PageRecord};
use crate::utils::text::truncate_chars;

use super::frontier::{CrawlTask, Frontier};
use super::normalizer::normalize;
use super::rate_limit::HostLimiter;
use super::robots::{RobotsMode, RobotsPolicy};

/// Cap on the text_content slice stored per page record.
const MAX_TEXT_CONTENT: usize = 5000;
/// How long an idle worker waits before re-checking the frontier.
const IDLE_POLL: Duration = Duration::from_millis(25);

/// Options governing a single crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub max_pages: usize,
    pub max_depth: u32,
    /// Minimum interval between requests to the same host.
    pub delay: Duration,
    pub workers: usize,
    pub user_agent: String,
    pub robots_mode: RobotsMode,
    /// When robots.txt cannot be fetched: true proceeds with a warning,
    /// false surfaces the error.
    pub robots_fail_open: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 100,
            max_depth: 3,
            delay: Duration::from_millis(1000),
            workers: 4,
            user_agent: crate::fetch::USER_AGENT.to_string(),
            robots_mode: RobotsMode::Enforce,
            robots_fail_open: true,
        }
    }
}

/// Cancels a running crawl. In-flight fetches are abandoned; pages already
/// extracted stay in the report.
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Shared state for one run's worker pool.
struct CrawlContext {
    max_pages: usize,
    fetcher: Arc<dyn Fetcher>,
    frontier: Mutex<Frontier>,
    limiter: HostLimiter,
    session: Mutex<ClassifierSession>,
    pages: Mutex<Vec<PageRecord>>,
    /// Page-budget slots claimed by workers (released on fetch failure).
    claimed: AtomicUsize,
    /// Successfully fetched pages.
    fetched: AtomicUsize,
    failed: AtomicUsize,
    /// Tasks currently being processed; used to detect a drained frontier.
    in_flight: AtomicUsize,
}

/// A configured crawler. One `run` call performs one complete crawl.
pub struct Crawler {
    options: CrawlOptions,
    fetcher: Arc<dyn Fetcher>,
    filter: Option<CompiledFilter>,
    robots_override: Option<RobotsPolicy>,
    cancel: Arc<watch::Sender<bool>>,
}

impl Crawler {
    pub fn new(options: CrawlOptions, fetcher: Arc<dyn Fetcher>) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            options,
            fetcher,
            filter: None,
            robots_override: None,
            cancel: Arc::new(tx),
        }
    }

    /// Apply a filter to the page set before the report is assembled.
    pub fn with_filter(mut self, filter: CompiledFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Use an already-loaded robots policy instead of fetching robots.txt.
    pub fn with_robots_policy(mut self, policy: RobotsPolicy) -> Self {
        self.robots_override = Some(policy);
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.cancel),
        }
    }

    /// Run a full crawl from `seed` and assemble the report.
    ///
    /// Fails up front with [`CrawlError::PolicyDenied`] when robots.txt
    /// disallows the seed; per-page fetch failures are tallied and never
    /// abort the run.
    pub async fn run(&self, seed: &str) -> Result<CrawlReport, CrawlError> {
        let seed_url = parse_seed(seed)?;
        let started = Utc::now();

        let policy = self.resolve_policy(&seed_url).await?;
        if !policy.is_allowed(&seed_url) {
            return Err(CrawlError::PolicyDenied {
                url: seed_url.to_string(),
            });
        }

        // The site's requested crawl-delay wins when it is stricter.
        let delay = policy
            .crawl_delay()
            .map(|d| d.max(self.options.delay))
            .unwrap_or(self.options.delay);

        let duplicate_threshold = self
            .filter
            .as_ref()
            .map(|f| f.duplicate_threshold)
            .unwrap_or(1.0);

        let ctx = Arc::new(CrawlContext {
            max_pages: self.options.max_pages,
            fetcher: Arc::clone(&self.fetcher),
            frontier: Mutex::new(Frontier::new(seed_url.clone(), self.options.max_depth)),
            limiter: HostLimiter::new(delay),
            session: Mutex::new(ClassifierSession::new(duplicate_threshold)),
            pages: Mutex::new(Vec::new()),
            claimed: AtomicUsize::new(0),
            fetched: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
        });

        info!(
            "starting crawl of {seed_url} (max_pages={}, max_depth={}, workers={})",
            self.options.max_pages, self.options.max_depth, self.options.workers
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..self.options.workers.max(1) {
            let ctx = Arc::clone(&ctx);
            let cancel = self.cancel.subscribe();
            workers.spawn(worker_loop(worker_id, ctx, cancel));
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                warn!("crawl worker panicked: {err}");
            }
        }

        let fetched = ctx.fetched.load(Ordering::Acquire);
        let failed = ctx.failed.load(Ordering::Acquire);
        info!("crawl finished: {fetched} pages fetched, {failed} failures");

        let crawled_urls_count = ctx.frontier.lock().await.visited_count();
        let mut pages = std::mem::take(&mut *ctx.pages.lock().await);

        if let Some(filter) = &self.filter {
            let before = pages.len();
            let mut session = ctx.session.lock().await;
            pages = pipeline::apply(pages, filter, &mut session);
            info!("filter retained {}/{before} pages", pages.len());
        }

        let metadata = CrawlMetadata {
            domain: seed_url.host_str().unwrap_or_default().to_string(),
            max_pages: self.options.max_pages,
            max_depth: self.options.max_depth,
            delay_ms: delay.as_millis() as u64,
            crawled_urls_count,
            crawl_date: started,
            run_id: Uuid::new_v4(),
        };
        Ok(CrawlReport::from_pages(metadata, pages))
    }

    async fn resolve_policy(&self, seed_url: &Url) -> Result<RobotsPolicy, CrawlError> {
        if let Some(policy) = &self.robots_override {
            return Ok(policy.clone());
        }
        match self.options.robots_mode {
            RobotsMode::Ignore => Ok(RobotsPolicy::allow_all(&self.options.user_agent)),
            RobotsMode::Enforce => {
                let client = reqwest::Client::builder()
                    .user_agent(&self.options.user_agent)
                    .timeout(Duration::from_secs(10))
                    .build()?;
                RobotsPolicy::load(
                    &client,
                    seed_url,
                    &self.options.user_agent,
                    self.options.robots_fail_open,
                )
                .await
            }
        }
    }
}

fn parse_seed(seed: &str) -> Result<Url, CrawlError> {
    let candidate = if seed.contains("://") {
        seed.to_string()
    } else {
        format!("https://{seed}")
    };
    let url = Url::parse(&candidate).map_err(|e| CrawlError::InvalidSeed(format!("{seed}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(CrawlError::InvalidSeed(seed.to_string()));
    }
    Ok(url)
}

async fn worker_loop(worker_id: usize, ctx: Arc<CrawlContext>, mut cancel: watch::Receiver<bool>) {
    loop {
        let Some(task) = claim_next(&ctx, &cancel).await else {
            break;
        };
        process_task(&ctx, &mut cancel, task).await;
        ctx.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
    debug!("worker {worker_id} done");
}

/// Claim a page-budget slot and dequeue the next task.
///
/// Returns None when the crawl is cancelled, the budget is spent, or the
/// frontier has drained (empty queue with nothing in flight).
async fn claim_next(ctx: &CrawlContext, cancel: &watch::Receiver<bool>) -> Option<CrawlTask> {
    loop {
        if *cancel.borrow() {
            return None;
        }

        let mut claimed = ctx.claimed.load(Ordering::Acquire);
        loop {
            if claimed >= ctx.max_pages {
                return None;
            }
            match ctx.claimed.compare_exchange(
                claimed,
                claimed + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(current) => claimed = current,
            }
        }

        let next = { ctx.frontier.lock().await.next() };
        match next {
            Some(task) => {
                ctx.in_flight.fetch_add(1, Ordering::AcqRel);
                return Some(task);
            }
            None => {
                ctx.claimed.fetch_sub(1, Ordering::AcqRel);
                if ctx.in_flight.load(Ordering::Acquire) == 0 {
                    return None;
                }
                // Another worker may still discover links.
                tokio::time::sleep(IDLE_POLL).await;
            }
        }
    }
}

async fn process_task(ctx: &CrawlContext, cancel: &mut watch::Receiver<bool>, task: CrawlTask) {
    let host = ctx.limiter.acquire(&task.url).await;
    if *cancel.borrow() {
        ctx.claimed.fetch_sub(1, Ordering::AcqRel);
        return;
    }

    debug!("fetching {} (depth {})", task.url, task.depth);
    let fetched = tokio::select! {
        _ = cancel.changed() => {
            ctx.claimed.fetch_sub(1, Ordering::AcqRel);
            return;
        }
        result = ctx.fetcher.fetch(&task.url) => result,
    };

    let raw = match fetched {
        Ok(raw) => {
            if let Some(host) = &host {
                ctx.limiter.report_success(host).await;
            }
            raw
        }
        Err(err) => {
            if let (Some(host), Some(status)) = (&host, err.status()) {
                if matches!(status, 429 | 503) {
                    ctx.limiter.report_throttled(host, status).await;
                } else if status >= 500 {
                    ctx.limiter.report_server_error(host).await;
                }
            }
            warn!("fetch failed for {}: {err}", task.url);
            ctx.failed.fetch_add(1, Ordering::AcqRel);
            // A failed fetch gives its budget slot back.
            ctx.claimed.fetch_sub(1, Ordering::AcqRel);
            return;
        }
    };

    let document = extract(&raw);

    // Admit discovered links under one frontier lock; admission marks them
    // visited, so no other worker can double-queue them.
    let mut discovered = Vec::new();
    {
        let mut frontier = ctx.frontier.lock().await;
        for link in &document.links {
            if let Some(next_url) = normalize(&link.href, &task.url) {
                if frontier.admit(next_url.clone(), task.depth + 1) {
                    discovered.push(next_url.to_string());
                }
            }
        }
    }

    let analysis = {
        let mut session = ctx.session.lock().await;
        session.analyze(&document)
    };

    let record = PageRecord {
        url: document.url.clone(),
        title: document.title.clone(),
        word_count: document.word_count,
        text_content: truncate_chars(&document.raw_text, MAX_TEXT_CONTENT),
        detailed_text: document,
        content_analysis: Some(analysis),
        discovered_links: discovered,
        success: true,
        method: ctx.fetcher.method(),
    };
    ctx.pages.lock().await.push(record);

    let done = ctx.fetched.fetch_add(1, Ordering::AcqRel) + 1;
    if done % 10 == 0 {
        let pending = ctx.frontier.lock().await.pending();
        info!("crawled {done} pages, {pending} queued");
    }
}
