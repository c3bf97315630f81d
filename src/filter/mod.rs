//! Filter definitions: the on-disk format and its validated, compiled form.

pub mod pipeline;

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::CrawlError;
use crate::models::{ContentType, Sentiment};

fn default_duplicate_threshold() -> f64 {
    0.8
}

/// A filter definition as written in a TOML file.
///
/// All criteria are optional; an empty definition keeps every page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSpec {
    /// Content-type tokens ("article", "blog", ...). Omit for any type.
    pub content_types: Option<Vec<String>>,
    pub min_word_count: usize,
    pub max_word_count: Option<usize>,
    /// Floor on the 0-100 quality score.
    pub min_quality_score: f64,
    /// RFC 3339 or YYYY-MM-DD bounds; pages without an extractable date pass.
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    /// Any-of keywords the page text must contain.
    pub keywords: Vec<String>,
    /// None-of keywords the page text must not contain.
    pub exclude_keywords: Vec<String>,
    /// Any-of regular expressions the URL must match (case-insensitive).
    pub url_patterns: Vec<String>,
    /// None-of regular expressions the URL must not match.
    pub exclude_url_patterns: Vec<String>,
    pub min_links: usize,
    pub max_links: Option<usize>,
    pub min_images: usize,
    pub max_images: Option<usize>,
    /// Exact detected-language match ("english", ...).
    pub language: Option<String>,
    /// Exact sentiment match: "positive", "negative" or "neutral".
    pub sentiment: Option<String>,
    /// Jaccard similarity at or above which pages count as duplicates.
    /// 0 disables duplicate exclusion; 1 keeps only the exact-hash check.
    pub duplicate_threshold: f64,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            content_types: None,
            min_word_count: 0,
            max_word_count: None,
            min_quality_score: 0.0,
            date_start: None,
            date_end: None,
            keywords: Vec::new(),
            exclude_keywords: Vec::new(),
            url_patterns: Vec::new(),
            exclude_url_patterns: Vec::new(),
            min_links: 0,
            max_links: None,
            min_images: 0,
            max_images: None,
            language: None,
            sentiment: None,
            duplicate_threshold: default_duplicate_threshold(),
        }
    }
}

impl FilterSpec {
    /// Load a filter definition from a TOML file.
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CrawlError::ConfigInvalid(format!("{}: {e}", path.display())))
    }

    /// Validate every criterion and compile the patterns.
    ///
    /// Unknown tokens and malformed patterns are hard errors, not warnings:
    /// a filter that silently drops a criterion would silently change which
    /// pages survive.
    pub fn compile(&self) -> Result<CompiledFilter, CrawlError> {
        let content_types = match &self.content_types {
            None => None,
            Some(tokens) => {
                let mut types = Vec::with_capacity(tokens.len());
                for token in tokens {
                    let parsed = ContentType::parse(token).ok_or_else(|| {
                        CrawlError::ConfigInvalid(format!("unknown content type {token:?}"))
                    })?;
                    types.push(parsed);
                }
                Some(types)
            }
        };

        if let Some(max) = self.max_word_count {
            if max < self.min_word_count {
                return Err(CrawlError::ConfigInvalid(format!(
                    "max_word_count {max} is below min_word_count {}",
                    self.min_word_count
                )));
            }
        }
        if let Some(max) = self.max_links {
            if max < self.min_links {
                return Err(CrawlError::ConfigInvalid(format!(
                    "max_links {max} is below min_links {}",
                    self.min_links
                )));
            }
        }
        if let Some(max) = self.max_images {
            if max < self.min_images {
                return Err(CrawlError::ConfigInvalid(format!(
                    "max_images {max} is below min_images {}",
                    self.min_images
                )));
            }
        }
        if !(0.0..=100.0).contains(&self.min_quality_score) {
            return Err(CrawlError::ConfigInvalid(format!(
                "min_quality_score {} is outside 0-100",
                self.min_quality_score
            )));
        }
        if !(0.0..=1.0).contains(&self.duplicate_threshold) {
            return Err(CrawlError::ConfigInvalid(format!(
                "duplicate_threshold {} is outside 0-1",
                self.duplicate_threshold
            )));
        }

        let date_start = self.date_start.as_deref().map(parse_bound).transpose()?;
        let date_end = self.date_end.as_deref().map(parse_bound).transpose()?;
        let date_range = match (date_start, date_end) {
            (Some(start), Some(end)) => {
                if end < start {
                    return Err(CrawlError::ConfigInvalid(format!(
                        "date_end {end} is before date_start {start}"
                    )));
                }
                Some((start, end))
            }
            (Some(start), None) => Some((start, DateTime::<Utc>::MAX_UTC)),
            (None, Some(end)) => Some((DateTime::<Utc>::MIN_UTC, end)),
            (None, None) => None,
        };

        let sentiment = self
            .sentiment
            .as_deref()
            .map(|token| {
                Sentiment::parse(token).ok_or_else(|| {
                    CrawlError::ConfigInvalid(format!("unknown sentiment {token:?}"))
                })
            })
            .transpose()?;

        Ok(CompiledFilter {
            content_types,
            min_word_count: self.min_word_count,
            max_word_count: self.max_word_count,
            min_quality_score: self.min_quality_score,
            date_range,
            keywords: lowercase_all(&self.keywords),
            exclude_keywords: lowercase_all(&self.exclude_keywords),
            url_patterns: compile_patterns(&self.url_patterns)?,
            exclude_url_patterns: compile_patterns(&self.exclude_url_patterns)?,
            min_links: self.min_links,
            max_links: self.max_links,
            min_images: self.min_images,
            max_images: self.max_images,
            language: self.language.clone(),
            sentiment,
            duplicate_threshold: self.duplicate_threshold,
        })
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, CrawlError> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| CrawlError::ConfigInvalid(format!("invalid URL pattern {p:?}: {e}")))
        })
        .collect()
}

fn parse_bound(value: &str) -> Result<DateTime<Utc>, CrawlError> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| CrawlError::ConfigInvalid(format!("unparsable date bound {value:?}")))
}

/// A validated filter, ready to run against pages.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    pub content_types: Option<Vec<ContentType>>,
    pub min_word_count: usize,
    pub max_word_count: Option<usize>,
    pub min_quality_score: f64,
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    pub url_patterns: Vec<Regex>,
    pub exclude_url_patterns: Vec<Regex>,
    pub min_links: usize,
    pub max_links: Option<usize>,
    pub min_images: usize,
    pub max_images: Option<usize>,
    pub language: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub duplicate_threshold: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_compiles() {
        let filter = FilterSpec::default().compile().expect("compiles");
        assert!(filter.content_types.is_none());
        assert_eq!(filter.duplicate_threshold, 0.8);
    }

    #[test]
    fn test_unknown_content_type_is_rejected() {
        let spec = FilterSpec {
            content_types: Some(vec!["article".to_string(), "podcast".to_string()]),
            ..Default::default()
        };
        let err = spec.compile().expect_err("invalid token");
        assert!(matches!(err, CrawlError::ConfigInvalid(_)));
        assert!(err.to_string().contains("podcast"));
    }

    #[test]
    fn test_bad_regex_is_rejected() {
        let spec = FilterSpec {
            url_patterns: vec!["(unclosed".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            spec.compile(),
            Err(CrawlError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let spec = FilterSpec {
            min_word_count: 500,
            max_word_count: Some(100),
            ..Default::default()
        };
        assert!(matches!(
            spec.compile(),
            Err(CrawlError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_threshold_range_is_enforced() {
        let spec = FilterSpec {
            duplicate_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            spec.compile(),
            Err(CrawlError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_date_bounds_parse_and_order() {
        let spec = FilterSpec {
            date_start: Some("2024-01-01".to_string()),
            date_end: Some("2023-01-01".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            spec.compile(),
            Err(CrawlError::ConfigInvalid(_))
        ));

        let ok = FilterSpec {
            date_start: Some("2023-01-01".to_string()),
            date_end: Some("2024-06-30T12:00:00Z".to_string()),
            ..Default::default()
        };
        let compiled = ok.compile().expect("valid range");
        assert!(compiled.date_range.is_some());
    }

    #[test]
    fn test_unknown_sentiment_is_rejected() {
        let spec = FilterSpec {
            sentiment: Some("ecstatic".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            spec.compile(),
            Err(CrawlError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_src = r#"
            content_types = ["article", "news"]
            min_word_count = 200
            min_quality_score = 40.0
            keywords = ["rust"]
            duplicate_threshold = 0.9
        "#;
        let spec: FilterSpec = toml::from_str(toml_src).expect("parses");
        let filter = spec.compile().expect("compiles");
        assert_eq!(
            filter.content_types,
            Some(vec![ContentType::Article, ContentType::News])
        );
        assert_eq!(filter.min_word_count, 200);
        assert_eq!(filter.keywords, vec!["rust"]);
    }
}
