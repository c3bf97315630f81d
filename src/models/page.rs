//! Page-level models: extracted structure and classification results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fetch::FetchMethod;

/// Coarse content category of a page.
///
/// Declaration order is significant: the classifier breaks score ties by
/// taking the first variant in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Article,
    Product,
    Review,
    News,
    Blog,
    LandingPage,
    About,
    Contact,
    Faq,
    Documentation,
    Unknown,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Product => "product",
            Self::Review => "review",
            Self::News => "news",
            Self::Blog => "blog",
            Self::LandingPage => "landing_page",
            Self::About => "about",
            Self::Contact => "contact",
            Self::Faq => "faq",
            Self::Documentation => "documentation",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a content-type token as used in filter definitions.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "article" => Some(Self::Article),
            "product" => Some(Self::Product),
            "review" => Some(Self::Review),
            "news" => Some(Self::News),
            "blog" => Some(Self::Blog),
            "landing_page" => Some(Self::LandingPage),
            "about" => Some(Self::About),
            "contact" => Some(Self::Contact),
            "faq" => Some(Self::Faq),
            "documentation" => Some(Self::Documentation),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Quality band derived from the 0-100 composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ContentQuality {
    /// Band thresholds: >=80 excellent, >=60 good, >=40 fair, else poor.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

/// Lexicon-based sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }
}

/// A hyperlink extracted from a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub href: String,
    #[serde(default)]
    pub title: String,
}

/// An image reference extracted from a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub title: String,
}

/// An ordered or unordered list with its item texts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListBlock {
    /// Element name: "ul" or "ol".
    pub kind: String,
    pub items: Vec<String>,
}

/// A single input field of a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormField {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub placeholder: String,
}

/// A form with its action, method and input fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Form {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub method: String,
    pub inputs: Vec<FormField>,
}

/// Structured text content extracted from one page.
///
/// Produced once by the extractor and immutable afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredDocument {
    pub url: String,
    pub title: String,
    /// Visible text of the page with boilerplate elements removed.
    pub raw_text: String,
    pub word_count: usize,
    /// Headings keyed by level ("h1" through "h6"), in document order.
    pub headings: BTreeMap<String, Vec<String>>,
    pub paragraphs: Vec<String>,
    pub lists: Vec<ListBlock>,
    /// Tables as rows of cell texts.
    pub tables: Vec<Vec<Vec<String>>>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub forms: Vec<Form>,
    pub buttons: Vec<String>,
    /// Meta tag name/property to content value.
    pub meta_data: BTreeMap<String, String>,
    /// JSON-LD structured data, when present and parseable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<serde_json::Value>,
}

impl StructuredDocument {
    /// Total heading count across all levels.
    pub fn heading_count(&self) -> usize {
        self.headings.values().map(|h| h.len()).sum()
    }
}

/// Classification and scoring attached to a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub content_type: ContentType,
    pub quality: ContentQuality,
    pub quality_score: f64,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_date: Option<DateTime<Utc>>,
    pub sentiment: Sentiment,
    pub is_duplicate: bool,
}

/// One crawled page: extracted structure plus its analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub word_count: usize,
    /// Leading slice of the visible text, capped for report size.
    pub text_content: String,
    pub detailed_text: StructuredDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_analysis: Option<ContentAnalysis>,
    /// Same-domain links first discovered on this page.
    #[serde(default)]
    pub discovered_links: Vec<String>,
    #[serde(default = "default_success")]
    pub success: bool,
    pub method: FetchMethod,
}

fn default_success() -> bool {
    true
}
