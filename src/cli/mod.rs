//! Command-line interface.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sitesift")]
#[command(about = "Site crawler with content classification and smart filtering")]
#[command(version)]
pub struct Cli {
    /// Settings file (TOML); defaults apply when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl a site and write a JSON report
    Crawl {
        /// Seed URL to start from
        url: String,

        /// Maximum number of pages to fetch
        #[arg(long)]
        max_pages: Option<usize>,

        /// Maximum link depth from the seed
        #[arg(long)]
        max_depth: Option<u32>,

        /// Politeness delay between requests in milliseconds
        #[arg(long)]
        delay: Option<u64>,

        /// Concurrent fetch workers
        #[arg(long)]
        workers: Option<usize>,

        /// Render pages in a headless browser (for JS-heavy sites)
        #[arg(long)]
        browser: bool,

        /// Skip robots.txt enforcement
        #[arg(long)]
        ignore_robots: bool,

        /// Filter definition (TOML) applied before reporting
        #[arg(long)]
        filter: Option<PathBuf>,

        /// Output path for the report (default: sitesift_<domain>_<date>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Custom user agent ("impersonate" for a real browser one)
        #[arg(long, env = "SITESIFT_USER_AGENT")]
        user_agent: Option<String>,
    },

    /// Check whether robots.txt allows crawling a URL
    CheckRobots {
        /// URL to check
        url: String,
    },

    /// Re-apply a filter to a saved crawl report
    Filter {
        /// Saved crawl report (JSON)
        report: PathBuf,

        /// Filter definition (TOML)
        #[arg(short, long)]
        filter: PathBuf,

        /// Output path (default: overwrite the input report)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            url,
            max_pages,
            max_depth,
            delay,
            workers,
            browser,
            ignore_robots,
            filter,
            output,
            user_agent,
        } => {
            let overrides = commands::CrawlOverrides {
                max_pages,
                max_depth,
                delay_ms: delay,
                workers,
                browser,
                ignore_robots,
                user_agent,
            };
            commands::crawl(cli.config.as_deref(), &url, overrides, filter, output).await
        }
        Commands::CheckRobots { url } => {
            commands::check_robots(cli.config.as_deref(), &url).await
        }
        Commands::Filter {
            report,
            filter,
            output,
        } => commands::refilter(&report, &filter, output),
    }
}
