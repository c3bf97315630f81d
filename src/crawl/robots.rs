//! robots.txt fetching, parsing, and policy checks.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::CrawlError;

/// Whether the crawler consults robots.txt at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotsMode {
    #[default]
    Enforce,
    Ignore,
}

/// One user-agent group of rules.
#[derive(Debug, Clone, Default)]
struct RuleGroup {
    agents: Vec<String>,
    allow: Vec<String>,
    disallow: Vec<String>,
    crawl_delay: Option<f64>,
}

impl RuleGroup {
    fn matches(&self, user_agent: &str) -> bool {
        self.agents.iter().any(|a| a != "*" && user_agent.contains(a))
    }

    fn is_wildcard(&self) -> bool {
        self.agents.iter().any(|a| a == "*")
    }

    fn allows(&self, path: &str) -> bool {
        // Allow rules take precedence over disallow rules.
        if self.allow.iter().any(|p| path.starts_with(p.as_str())) {
            return true;
        }
        !self
            .disallow
            .iter()
            .any(|p| p == "/" || path.starts_with(p.as_str()))
    }
}

/// Parsed robots.txt rules.
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    groups: Vec<RuleGroup>,
}

impl RobotsTxt {
    /// Parse robots.txt content. Unknown directives are ignored.
    pub fn parse(content: &str) -> Self {
        let mut groups: Vec<RuleGroup> = Vec::new();
        let mut current = RuleGroup::default();
        let mut in_agent_list = false;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((directive, value)) = line.split_once(':') else {
                continue;
            };
            let directive = directive.trim().to_lowercase();
            let value = value.trim();

            match directive.as_str() {
                "user-agent" => {
                    // A user-agent line after rules starts a new group.
                    if !in_agent_list && !current.agents.is_empty() {
                        groups.push(std::mem::take(&mut current));
                    }
                    current.agents.push(value.to_lowercase());
                    in_agent_list = true;
                }
                "allow" => {
                    in_agent_list = false;
                    if !value.is_empty() {
                        current.allow.push(value.to_string());
                    }
                }
                "disallow" => {
                    in_agent_list = false;
                    // An empty Disallow means "allow everything".
                    if !value.is_empty() {
                        current.disallow.push(value.to_string());
                    }
                }
                "crawl-delay" => {
                    in_agent_list = false;
                    if let Ok(delay) = value.parse::<f64>() {
                        current.crawl_delay = Some(delay);
                    }
                }
                _ => {}
            }
        }
        if !current.agents.is_empty() {
            groups.push(current);
        }

        Self { groups }
    }

    fn group_for(&self, user_agent: &str) -> Option<&RuleGroup> {
        let agent = user_agent.to_lowercase();
        self.groups
            .iter()
            .find(|g| g.matches(&agent))
            .or_else(|| self.groups.iter().find(|g| g.is_wildcard()))
    }

    /// Check whether a path is allowed for the given user agent.
    pub fn is_allowed(&self, user_agent: &str, path: &str) -> bool {
        self.group_for(user_agent)
            .map(|g| g.allows(path))
            .unwrap_or(true)
    }

    /// Crawl-delay for the given user agent, when specified.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        self.group_for(user_agent)
            .and_then(|g| g.crawl_delay)
            .map(Duration::from_secs_f64)
    }
}

/// The robots policy applied to one crawl run.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    rules: Option<RobotsTxt>,
    user_agent: String,
}

impl RobotsPolicy {
    /// A policy that permits everything (robots checking disabled, or no
    /// robots.txt present).
    pub fn allow_all(user_agent: &str) -> Self {
        Self {
            rules: None,
            user_agent: user_agent.to_string(),
        }
    }

    /// A policy over already-parsed rules.
    pub fn from_rules(rules: RobotsTxt, user_agent: &str) -> Self {
        Self {
            rules: Some(rules),
            user_agent: user_agent.to_string(),
        }
    }

    /// Fetch and parse robots.txt for the site of `base`.
    ///
    /// A missing robots.txt permits everything. When the file cannot be
    /// fetched at all, `fail_open` decides: permit with a warning, or
    /// surface the error to the caller.
    pub async fn load(
        client: &Client,
        base: &Url,
        user_agent: &str,
        fail_open: bool,
    ) -> Result<Self, CrawlError> {
        let mut robots_url = base.clone();
        robots_url.set_path("/robots.txt");
        robots_url.set_query(None);
        robots_url.set_fragment(None);

        match client.get(robots_url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                let content = response.text().await.unwrap_or_default();
                debug!("loaded robots.txt from {robots_url}");
                Ok(Self::from_rules(RobotsTxt::parse(&content), user_agent))
            }
            Ok(response) => {
                debug!(
                    "no robots.txt at {robots_url} (status {}), allowing all",
                    response.status()
                );
                Ok(Self::allow_all(user_agent))
            }
            Err(err) if fail_open => {
                warn!("could not fetch {robots_url}: {err}; proceeding as allowed");
                Ok(Self::allow_all(user_agent))
            }
            Err(err) => Err(CrawlError::Http(err)),
        }
    }

    /// Check whether this policy permits fetching `url`.
    pub fn is_allowed(&self, url: &Url) -> bool {
        match &self.rules {
            Some(rules) => rules.is_allowed(&self.user_agent, url.path()),
            None => true,
        }
    }

    /// Crawl-delay requested by the site, when any.
    pub fn crawl_delay(&self) -> Option<Duration> {
        self.rules
            .as_ref()
            .and_then(|r| r.crawl_delay(&self.user_agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_and_disallow_prefixes() {
        let robots = RobotsTxt::parse(
            "User-agent: *\n\
             Disallow: /private/\n\
             Allow: /private/shared/\n\
             Crawl-delay: 2\n",
        );

        assert!(robots.is_allowed("sitesift", "/public/page"));
        assert!(!robots.is_allowed("sitesift", "/private/secret"));
        assert!(robots.is_allowed("sitesift", "/private/shared/doc"));
        assert_eq!(
            robots.crawl_delay("sitesift"),
            Some(Duration::from_secs(2))
        );
    }

    #[test]
    fn test_specific_agent_overrides_wildcard() {
        let robots = RobotsTxt::parse(
            "User-agent: *\n\
             Disallow: /\n\
             \n\
             User-agent: goodbot\n\
             Disallow: /admin/\n",
        );

        assert!(!robots.is_allowed("SomeBot/1.0", "/page"));
        assert!(robots.is_allowed("GoodBot/2.0", "/page"));
        assert!(!robots.is_allowed("GoodBot/2.0", "/admin/panel"));
    }

    #[test]
    fn test_grouped_agents_share_rules() {
        let robots = RobotsTxt::parse(
            "User-agent: alpha\n\
             User-agent: beta\n\
             Disallow: /x/\n",
        );

        assert!(!robots.is_allowed("alpha", "/x/1"));
        assert!(!robots.is_allowed("beta", "/x/1"));
        assert!(robots.is_allowed("gamma", "/x/1"));
    }

    #[test]
    fn test_empty_and_unknown_directives() {
        let robots = RobotsTxt::parse("# comment only\nSitemap: https://e.com/s.xml\n");
        assert!(robots.is_allowed("anybot", "/anything"));
        assert!(robots.crawl_delay("anybot").is_none());

        let empty = RobotsTxt::parse("");
        assert!(empty.is_allowed("anybot", "/"));
    }

    #[test]
    fn test_disallow_all_blocks_root() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow: /\n");
        let policy = RobotsPolicy::from_rules(robots, "sitesift");
        let url = Url::parse("https://example.com/").expect("url");
        assert!(!policy.is_allowed(&url));
    }

    #[test]
    fn test_allow_all_policy() {
        let policy = RobotsPolicy::allow_all("sitesift");
        let url = Url::parse("https://example.com/private/x").expect("url");
        assert!(policy.is_allowed(&url));
        assert!(policy.crawl_delay().is_none());
    }
}
