//! Publication-date extraction from meta tags and body text.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

/// Meta keys checked, in order, before falling back to body text.
const DATE_META_KEYS: &[&str] = &["date", "published", "created", "updated", "pubdate"];

/// Compiled body-text date patterns with their chrono parse formats.
pub(crate) struct DatePatterns {
    patterns: Vec<(Regex, &'static str)>,
}

impl DatePatterns {
    pub(crate) fn new() -> Self {
        let table: &[(&str, &str)] = &[
            (r"\b\d{1,2}/\d{1,2}/\d{2,4}\b", "%m/%d/%Y"),
            (r"\b\d{4}-\d{2}-\d{2}\b", "%Y-%m-%d"),
            (
                r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s+\d{4}\b",
                "%B %d, %Y",
            ),
        ];
        let patterns = table
            .iter()
            .map(|(pattern, format)| (Regex::new(pattern).expect("static date pattern"), *format))
            .collect();
        Self { patterns }
    }

    /// Extract a date from meta values first, then from the text body.
    /// Returns None rather than erroring on anything unparsable.
    pub(crate) fn extract(
        &self,
        text: &str,
        meta: &BTreeMap<String, String>,
    ) -> Option<DateTime<Utc>> {
        for key in DATE_META_KEYS {
            if let Some(value) = meta.get(*key) {
                if let Some(date) = parse_meta_date(value) {
                    return Some(date);
                }
            }
        }

        for (pattern, format) in &self.patterns {
            if let Some(m) = pattern.find(text) {
                if let Ok(date) = NaiveDate::parse_from_str(m.as_str(), format) {
                    return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
                }
            }
        }

        None
    }
}

fn parse_meta_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
