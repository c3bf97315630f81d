//! Content classification: type detection, quality, language, sentiment,
//! dates, and duplicate tracking.
//!
//! All state lives in a [`ClassifierSession`] constructed per crawl run;
//! nothing here is process-global, so independent runs cannot see each
//! other's duplicate history.

mod dates;
mod dedup;
mod language;
mod patterns;
mod quality;

pub use dedup::DuplicateDetector;

use std::collections::BTreeMap;

use regex::RegexBuilder;

use crate::models::{ContentAnalysis, ContentType, Sentiment, StructuredDocument};

use dates::DatePatterns;
use patterns::{NEGATIVE_SENTIMENT, POSITIVE_SENTIMENT, TYPE_SIGNALS};

/// Score weights for the content-type vote.
const URL_PATTERN_WEIGHT: i32 = 3;
const TITLE_KEYWORD_WEIGHT: i32 = 2;
const BODY_KEYWORD_WEIGHT: i32 = 1;
const META_PATTERN_WEIGHT: i32 = 2;

struct TypeRule {
    content_type: ContentType,
    url_patterns: Vec<regex::Regex>,
    keywords: &'static [&'static str],
    meta_patterns: &'static [&'static str],
}

/// Deterministic weighted-vote classifier over the static signal tables.
pub struct ContentClassifier {
    rules: Vec<TypeRule>,
    date_patterns: DatePatterns,
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentClassifier {
    pub fn new() -> Self {
        let rules = TYPE_SIGNALS
            .iter()
            .map(|signals| TypeRule {
                content_type: signals.content_type,
                url_patterns: signals
                    .url_patterns
                    .iter()
                    .map(|p| {
                        RegexBuilder::new(p)
                            .case_insensitive(true)
                            .build()
                            .expect("static url pattern")
                    })
                    .collect(),
                keywords: signals.keywords,
                meta_patterns: signals.meta_patterns,
            })
            .collect();
        Self {
            rules,
            date_patterns: DatePatterns::new(),
        }
    }

    /// Detect the content type of a page.
    ///
    /// Each candidate type accumulates a score from URL pattern matches,
    /// keyword hits in title and body, and pattern hits in meta values. The
    /// highest score wins; ties break toward the earlier table entry; a page
    /// with no signal at all is Unknown. Same input, same output.
    pub fn detect_content_type(
        &self,
        url: &str,
        title: &str,
        text: &str,
        meta: &BTreeMap<String, String>,
    ) -> ContentType {
        let title_lower = title.to_lowercase();
        let text_lower = text.to_lowercase();
        let meta_lower: Vec<String> = meta.values().map(|v| v.to_lowercase()).collect();

        let mut best_score = 0;
        let mut best_type = ContentType::Unknown;

        for rule in &self.rules {
            let mut score = 0;
            for pattern in &rule.url_patterns {
                if pattern.is_match(url) {
                    score += URL_PATTERN_WEIGHT;
                }
            }
            for keyword in rule.keywords {
                if title_lower.contains(keyword) {
                    score += TITLE_KEYWORD_WEIGHT;
                }
                if text_lower.contains(keyword) {
                    score += BODY_KEYWORD_WEIGHT;
                }
            }
            for pattern in rule.meta_patterns {
                for value in &meta_lower {
                    if value.contains(pattern) {
                        score += META_PATTERN_WEIGHT;
                    }
                }
            }
            if score > best_score {
                best_score = score;
                best_type = rule.content_type;
            }
        }

        best_type
    }

    /// Lexicon sentiment of the page text.
    pub fn detect_sentiment(&self, text: &str) -> Sentiment {
        let lowered = text.to_lowercase();
        let positives = POSITIVE_SENTIMENT
            .iter()
            .filter(|w| lowered.contains(**w))
            .count();
        let negatives = NEGATIVE_SENTIMENT
            .iter()
            .filter(|w| lowered.contains(**w))
            .count();
        match positives.cmp(&negatives) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }
}

/// Per-run classification state: the compiled classifier plus the duplicate
/// history. Construct one per crawl and drop it when the run ends.
pub struct ClassifierSession {
    classifier: ContentClassifier,
    detector: DuplicateDetector,
}

impl ClassifierSession {
    /// `duplicate_threshold` feeds the detector; 1.0 keeps only the exact
    /// hash check.
    pub fn new(duplicate_threshold: f64) -> Self {
        Self {
            classifier: ContentClassifier::new(),
            detector: DuplicateDetector::new(duplicate_threshold),
        }
    }

    pub fn classifier(&self) -> &ContentClassifier {
        &self.classifier
    }

    /// Produce the full analysis for a page.
    ///
    /// Everything except `is_duplicate` is a pure function of the document;
    /// the duplicate check consults and updates the run's history, so pages
    /// must be analyzed in arrival order.
    pub fn analyze(&mut self, doc: &StructuredDocument) -> ContentAnalysis {
        let content_type = self.classifier.detect_content_type(
            &doc.url,
            &doc.title,
            &doc.raw_text,
            &doc.meta_data,
        );
        let (quality, quality_score) = quality::assess(&doc.raw_text, doc);
        let language = language::detect(&doc.raw_text);
        let extracted_date = self
            .classifier
            .date_patterns
            .extract(&doc.raw_text, &doc.meta_data);
        let sentiment = self.classifier.detect_sentiment(&doc.raw_text);
        let is_duplicate = self.detector.check(&doc.raw_text);

        ContentAnalysis {
            content_type,
            quality,
            quality_score,
            language,
            extracted_date,
            sentiment,
            is_duplicate,
        }
    }
}
