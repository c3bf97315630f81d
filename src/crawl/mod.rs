//! Crawl orchestration: frontier, URL normalization, politeness, robots
//! policy and the worker pool that drives them.

mod frontier;
mod normalizer;
mod orchestrator;
mod rate_limit;
mod robots;

pub use frontier::{CrawlTask, Frontier};
pub use normalizer::normalize;
pub use orchestrator::{CancelHandle, CrawlOptions, Crawler};
pub use rate_limit::HostLimiter;
pub use robots::{RobotsMode, RobotsPolicy, RobotsTxt};
