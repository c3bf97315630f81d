//! Crawl report assembly.
//!
//! A report is built once, at the end of a run, from the final page set. It
//! carries the run metadata, aggregate statistics, a prefix tree of URL path
//! segments, and the pages themselves.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::page::PageRecord;
use crate::error::CrawlError;

/// Parameters and identity of one crawl run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlMetadata {
    pub domain: String,
    pub max_pages: usize,
    pub max_depth: u32,
    pub delay_ms: u64,
    /// Number of distinct URLs ever admitted to the frontier.
    pub crawled_urls_count: usize,
    pub crawl_date: DateTime<Utc>,
    pub run_id: Uuid,
}

/// Aggregate counters over the final page set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlStatistics {
    pub total_pages: usize,
    pub total_words: usize,
    pub total_links: usize,
    pub total_images: usize,
}

impl CrawlStatistics {
    fn tally(pages: &[PageRecord]) -> Self {
        Self {
            total_pages: pages.len(),
            total_words: pages.iter().map(|p| p.word_count).sum(),
            total_links: pages.iter().map(|p| p.discovered_links.len()).sum(),
            total_images: pages.iter().map(|p| p.detailed_text.images.len()).sum(),
        }
    }
}

/// A heading text with the number of pages-wide occurrences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingCount {
    pub heading: String,
    pub count: usize,
}

/// Summary of the extracted content across all pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentSummary {
    pub average_words_per_page: f64,
    /// Top ten headings by occurrence count.
    pub most_common_headings: Vec<HeadingCount>,
    /// Item counts per extractor section (paragraphs, links, ...).
    pub content_types: BTreeMap<String, usize>,
}

impl ContentSummary {
    fn build(pages: &[PageRecord], statistics: &CrawlStatistics) -> Self {
        let average_words_per_page = if pages.is_empty() {
            0.0
        } else {
            statistics.total_words as f64 / pages.len() as f64
        };

        let mut heading_counts: HashMap<&str, usize> = HashMap::new();
        for page in pages {
            for headings in page.detailed_text.headings.values() {
                for heading in headings {
                    *heading_counts.entry(heading.as_str()).or_default() += 1;
                }
            }
        }
        let mut most_common: Vec<(&str, usize)> = heading_counts.into_iter().collect();
        most_common.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        most_common.truncate(10);
        let most_common_headings = most_common
            .into_iter()
            .map(|(heading, count)| HeadingCount {
                heading: heading.to_string(),
                count,
            })
            .collect();

        let mut content_types = BTreeMap::new();
        for page in pages {
            let doc = &page.detailed_text;
            *content_types.entry("headings".to_string()).or_default() += doc.heading_count();
            *content_types.entry("paragraphs".to_string()).or_default() += doc.paragraphs.len();
            *content_types.entry("lists".to_string()).or_default() += doc.lists.len();
            *content_types.entry("tables".to_string()).or_default() += doc.tables.len();
            *content_types.entry("links".to_string()).or_default() += doc.links.len();
            *content_types.entry("images".to_string()).or_default() += doc.images.len();
            *content_types.entry("forms".to_string()).or_default() += doc.forms.len();
            *content_types.entry("buttons".to_string()).or_default() += doc.buttons.len();
            *content_types.entry("meta_data".to_string()).or_default() += doc.meta_data.len();
        }

        Self {
            average_words_per_page,
            most_common_headings,
            content_types,
        }
    }
}

/// Prefix tree of URL path segments for the crawled site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteTree(pub BTreeMap<String, SiteTree>);

impl SiteTree {
    /// Build the tree from page URLs; unparsable URLs are skipped.
    pub fn from_urls<'a>(urls: impl Iterator<Item = &'a str>) -> Self {
        let mut tree = Self::default();
        for url in urls {
            if let Ok(parsed) = Url::parse(url) {
                tree.insert_path(parsed.path());
            }
        }
        tree
    }

    fn insert_path(&mut self, path: &str) {
        let mut node = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = node.0.entry(segment.to_string()).or_default();
        }
    }
}

/// The final artifact of a crawl run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: CrawlMetadata,
    pub statistics: CrawlStatistics,
    pub content_summary: ContentSummary,
    pub site_structure: SiteTree,
    pub pages: Vec<PageRecord>,
}

impl CrawlReport {
    /// Assemble a report from the final page set.
    pub fn from_pages(metadata: CrawlMetadata, pages: Vec<PageRecord>) -> Self {
        let statistics = CrawlStatistics::tally(&pages);
        let content_summary = ContentSummary::build(&pages, &statistics);
        let site_structure = SiteTree::from_urls(pages.iter().map(|p| p.url.as_str()));
        let success = !pages.is_empty();
        let error = if success {
            None
        } else {
            Some("no pages were successfully crawled".to_string())
        };
        Self {
            success,
            error,
            metadata,
            statistics,
            content_summary,
            site_structure,
            pages,
        }
    }

    /// A failure report carrying no pages, e.g. for a robots-denied seed.
    pub fn failure(metadata: CrawlMetadata, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            metadata,
            statistics: CrawlStatistics::default(),
            content_summary: ContentSummary::default(),
            site_structure: SiteTree::default(),
            pages: Vec::new(),
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<(), CrawlError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously saved report.
    pub fn load_json(path: &Path) -> Result<Self, CrawlError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchMethod;
    use crate::models::StructuredDocument;

    fn page(url: &str, words: usize) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: String::new(),
            word_count: words,
            text_content: String::new(),
            detailed_text: StructuredDocument {
                url: url.to_string(),
                ..Default::default()
            },
            content_analysis: None,
            discovered_links: Vec::new(),
            success: true,
            method: FetchMethod::Http,
        }
    }

    fn metadata() -> CrawlMetadata {
        CrawlMetadata {
            domain: "example.com".to_string(),
            max_pages: 10,
            max_depth: 2,
            delay_ms: 0,
            crawled_urls_count: 3,
            crawl_date: Utc::now(),
            run_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_site_tree_nesting() {
        let urls = [
            "https://example.com/",
            "https://example.com/docs/intro",
            "https://example.com/docs/api/errors",
            "https://example.com/blog",
        ];
        let tree = SiteTree::from_urls(urls.iter().copied());

        assert!(tree.0.contains_key("docs"));
        assert!(tree.0.contains_key("blog"));
        let docs = &tree.0["docs"];
        assert!(docs.0.contains_key("intro"));
        assert!(docs.0["api"].0.contains_key("errors"));
    }

    #[test]
    fn test_statistics_tally() {
        let report = CrawlReport::from_pages(
            metadata(),
            vec![
                page("https://example.com/a", 100),
                page("https://example.com/b", 250),
            ],
        );
        assert!(report.success);
        assert_eq!(report.statistics.total_pages, 2);
        assert_eq!(report.statistics.total_words, 350);
        assert_eq!(report.content_summary.average_words_per_page, 175.0);
    }

    #[test]
    fn test_empty_crawl_is_failure() {
        let report = CrawlReport::from_pages(metadata(), Vec::new());
        assert!(!report.success);
        assert!(report.error.is_some());
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.json");
        let report = CrawlReport::from_pages(metadata(), vec![page("https://example.com/a", 5)]);

        report.save_json(&path).expect("save");
        let loaded = CrawlReport::load_json(&path).expect("load");

        assert_eq!(loaded.statistics.total_pages, 1);
        assert_eq!(loaded.metadata.domain, "example.com");
        assert_eq!(loaded.site_structure, report.site_structure);
    }
}
