//! Crawler settings with TOML file loading.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crawl::{CrawlOptions, RobotsMode};
use crate::error::CrawlError;
use crate::fetch::resolve_user_agent;

/// robots.txt handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RobotsSettings {
    pub mode: RobotsMode,
    /// When robots.txt cannot be fetched: proceed (true) or fail (false).
    pub fail_open: bool,
}

impl Default for RobotsSettings {
    fn default() -> Self {
        Self {
            mode: RobotsMode::Enforce,
            fail_open: true,
        }
    }
}

/// Settings for a crawl, usually loaded from `sitesift.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub max_pages: usize,
    pub max_depth: u32,
    /// Politeness delay between requests to the same host, in milliseconds.
    pub delay_ms: u64,
    /// Concurrent fetch workers.
    pub workers: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Custom user agent; "impersonate" picks a real browser user agent.
    pub user_agent: Option<String>,
    /// Render pages with the headless browser backend.
    pub use_browser: bool,
    pub robots: RobotsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_pages: 100,
            max_depth: 3,
            delay_ms: 1000,
            workers: 4,
            timeout_secs: 30,
            user_agent: None,
            use_browser: false,
            robots: RobotsSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)
            .map_err(|e| CrawlError::ConfigInvalid(format!("{}: {e}", path.display())))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.max_pages == 0 {
            return Err(CrawlError::ConfigInvalid(
                "max_pages must be at least 1".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(CrawlError::ConfigInvalid(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(CrawlError::ConfigInvalid(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn resolved_user_agent(&self) -> String {
        resolve_user_agent(self.user_agent.as_deref())
    }

    /// Translate into orchestrator options.
    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            max_pages: self.max_pages,
            max_depth: self.max_depth,
            delay: Duration::from_millis(self.delay_ms),
            workers: self.workers,
            user_agent: self.resolved_user_agent(),
            robots_mode: self.robots.mode,
            robots_fail_open: self.robots.fail_open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        let options = settings.crawl_options();
        assert_eq!(options.max_pages, 100);
        assert_eq!(options.delay, Duration::from_millis(1000));
        assert_eq!(options.robots_mode, RobotsMode::Enforce);
    }

    #[test]
    fn test_parses_partial_toml() {
        let settings: Settings = toml::from_str(
            "max_pages = 25\n\
             delay_ms = 250\n\
             [robots]\n\
             mode = \"ignore\"\n",
        )
        .expect("parses");
        assert_eq!(settings.max_pages, 25);
        assert_eq!(settings.delay_ms, 250);
        assert_eq!(settings.robots.mode, RobotsMode::Ignore);
        // Unspecified fields keep their defaults.
        assert_eq!(settings.max_depth, 3);
        assert!(settings.robots.fail_open);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let parsed: Result<Settings, _> = toml::from_str("max_pagez = 10\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_zero_budgets_fail_validation() {
        let settings = Settings {
            max_pages: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CrawlError::ConfigInvalid(_))
        ));

        let settings = Settings {
            workers: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sitesift.toml");
        std::fs::write(&path, "max_pages = 7\nworkers = 2\n").expect("write");

        let settings = Settings::load(&path).expect("load");
        assert_eq!(settings.max_pages, 7);
        assert_eq!(settings.workers, 2);
    }
}
