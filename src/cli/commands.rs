//! CLI command implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use crate::classify::ClassifierSession;
use crate::config::Settings;
use crate::crawl::{Crawler, RobotsMode, RobotsPolicy};
use crate::error::CrawlError;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::filter::{pipeline, FilterSpec};
use crate::models::{CrawlMetadata, CrawlReport};

/// Command-line overrides layered on top of the settings file.
pub struct CrawlOverrides {
    pub max_pages: Option<usize>,
    pub max_depth: Option<u32>,
    pub delay_ms: Option<u64>,
    pub workers: Option<usize>,
    pub browser: bool,
    pub ignore_robots: bool,
    pub user_agent: Option<String>,
}

fn load_settings(config: Option<&Path>) -> anyhow::Result<Settings> {
    match config {
        Some(path) => {
            Settings::load(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(Settings::default()),
    }
}

fn apply_overrides(settings: &mut Settings, overrides: &CrawlOverrides) {
    if let Some(max_pages) = overrides.max_pages {
        settings.max_pages = max_pages;
    }
    if let Some(max_depth) = overrides.max_depth {
        settings.max_depth = max_depth;
    }
    if let Some(delay_ms) = overrides.delay_ms {
        settings.delay_ms = delay_ms;
    }
    if let Some(workers) = overrides.workers {
        settings.workers = workers;
    }
    if overrides.browser {
        settings.use_browser = true;
    }
    if overrides.ignore_robots {
        settings.robots.mode = RobotsMode::Ignore;
    }
    if overrides.user_agent.is_some() {
        settings.user_agent = overrides.user_agent.clone();
    }
}

fn build_fetcher(settings: &Settings) -> anyhow::Result<Arc<dyn Fetcher>> {
    let user_agent = settings.resolved_user_agent();
    if settings.use_browser {
        #[cfg(feature = "browser")]
        {
            return Ok(Arc::new(crate::fetch::BrowserFetcher::new(
                &user_agent,
                settings.timeout(),
            )));
        }
        #[cfg(not(feature = "browser"))]
        anyhow::bail!("this build has no browser support (enable the `browser` feature)");
    }
    Ok(Arc::new(HttpFetcher::new(&user_agent, settings.timeout())?))
}

fn default_report_path(seed: &str) -> PathBuf {
    let domain = url::Url::parse(seed)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| "site".to_string());
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("sitesift_{domain}_{stamp}.json"))
}

fn print_summary(report: &CrawlReport) {
    println!();
    println!(
        "{} {}",
        style("Crawl complete:").green().bold(),
        report.metadata.domain
    );
    println!("  pages:  {}", report.statistics.total_pages);
    println!("  words:  {}", report.statistics.total_words);
    println!("  links:  {}", report.statistics.total_links);
    println!("  images: {}", report.statistics.total_images);
    if let Some(top) = report.content_summary.most_common_headings.first() {
        println!("  top heading: {:?} ({}x)", top.heading, top.count);
    }
}

/// `sitesift crawl <url>`.
pub async fn crawl(
    config: Option<&Path>,
    url: &str,
    overrides: CrawlOverrides,
    filter: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut settings = load_settings(config)?;
    apply_overrides(&mut settings, &overrides);
    settings.validate()?;

    let fetcher = build_fetcher(&settings)?;
    let mut crawler = Crawler::new(settings.crawl_options(), fetcher);
    if let Some(path) = &filter {
        let compiled = FilterSpec::load(path)?.compile()?;
        crawler = crawler.with_filter(compiled);
    }

    // Ctrl-C cancels the crawl but keeps what was already fetched.
    let handle = crawler.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ninterrupted, assembling partial report...");
            handle.cancel();
        }
    });

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static progress template"),
    );
    spinner.set_message(format!("crawling {url}"));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = crawler.run(url).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            print_summary(&report);
            let path = output.unwrap_or_else(|| default_report_path(url));
            report.save_json(&path)?;
            println!("  report: {}", path.display());
            Ok(())
        }
        Err(CrawlError::PolicyDenied { url: denied }) => {
            eprintln!(
                "{} robots.txt disallows crawling {denied}",
                style("blocked:").red().bold()
            );
            // Still produce a report artifact when one was asked for.
            if let Some(path) = output {
                let metadata = CrawlMetadata {
                    domain: url::Url::parse(&denied)
                        .ok()
                        .and_then(|u| u.host_str().map(|h| h.to_string()))
                        .unwrap_or_default(),
                    max_pages: settings.max_pages,
                    max_depth: settings.max_depth,
                    delay_ms: settings.delay_ms,
                    crawled_urls_count: 0,
                    crawl_date: Utc::now(),
                    run_id: Uuid::new_v4(),
                };
                let report =
                    CrawlReport::failure(metadata, "crawling not allowed by robots.txt");
                report.save_json(&path)?;
            }
            Err(CrawlError::PolicyDenied { url: denied }.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// `sitesift check-robots <url>`.
pub async fn check_robots(config: Option<&Path>, url: &str) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let user_agent = settings.resolved_user_agent();

    let parsed = url::Url::parse(url).with_context(|| format!("parsing {url}"))?;
    let client = reqwest::Client::builder()
        .user_agent(&user_agent)
        .timeout(Duration::from_secs(10))
        .build()?;

    let policy = RobotsPolicy::load(&client, &parsed, &user_agent, settings.robots.fail_open)
        .await?;

    if policy.is_allowed(&parsed) {
        println!("{} {url}", style("allowed:").green().bold());
        if let Some(delay) = policy.crawl_delay() {
            println!("  requested crawl-delay: {delay:?}");
        }
    } else {
        println!("{} {url}", style("disallowed:").red().bold());
        std::process::exit(1);
    }
    Ok(())
}

/// `sitesift filter <report> --filter <spec>`.
pub fn refilter(report_path: &Path, filter_path: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut report = CrawlReport::load_json(report_path)
        .with_context(|| format!("loading {}", report_path.display()))?;
    let compiled = FilterSpec::load(filter_path)?.compile()?;

    let before = report.pages.len();
    let mut session = ClassifierSession::new(compiled.duplicate_threshold);
    let pages = std::mem::take(&mut report.pages);
    let kept = pipeline::apply(pages, &compiled, &mut session);
    let after = kept.len();

    let rebuilt = CrawlReport::from_pages(report.metadata, kept);
    let path = output.unwrap_or_else(|| report_path.to_path_buf());
    rebuilt.save_json(&path)?;

    println!(
        "{} kept {after}/{before} pages -> {}",
        style("Filtered:").green().bold(),
        path.display()
    );
    Ok(())
}
