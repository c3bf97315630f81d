//! Signal tables for content-type detection.
//!
//! Each content type scores from three signal kinds: URL path patterns,
//! keywords (matched in title and body), and meta-tag value patterns.

use crate::models::ContentType;

pub struct TypeSignals {
    pub content_type: ContentType,
    pub url_patterns: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub meta_patterns: &'static [&'static str],
}

/// Detection table, in tie-break order.
pub const TYPE_SIGNALS: &[TypeSignals] = &[
    TypeSignals {
        content_type: ContentType::Article,
        url_patterns: &["/article/", "/post/", "/blog/", "/news/"],
        keywords: &["article", "post", "blog", "news", "story", "feature"],
        meta_patterns: &["article", "post", "blog"],
    },
    TypeSignals {
        content_type: ContentType::Product,
        url_patterns: &["/product/", "/item/", "/shop/", "/store/"],
        keywords: &["product", "item", "buy", "purchase", "price", "shop"],
        meta_patterns: &["product", "item", "ecommerce"],
    },
    TypeSignals {
        content_type: ContentType::Review,
        url_patterns: &["/review/", "/rating/", "/feedback/"],
        keywords: &["review", "rating", "feedback", "opinion", "test"],
        meta_patterns: &["review", "rating"],
    },
    TypeSignals {
        content_type: ContentType::News,
        url_patterns: &["/news/", "/breaking/", "/latest/"],
        keywords: &["news", "breaking", "latest", "update", "announcement"],
        meta_patterns: &["news", "breaking"],
    },
    TypeSignals {
        content_type: ContentType::Blog,
        url_patterns: &["/blog/", "/posts/", "/journal/"],
        keywords: &["blog", "post", "journal", "diary", "thoughts"],
        meta_patterns: &["blog", "post"],
    },
    TypeSignals {
        content_type: ContentType::LandingPage,
        url_patterns: &["/$", "/home", "/main"],
        keywords: &["welcome", "home", "main", "landing"],
        meta_patterns: &["landing", "home"],
    },
    TypeSignals {
        content_type: ContentType::About,
        url_patterns: &["/about/", "/about-us/", "/company/"],
        keywords: &["about", "company", "team", "mission", "vision"],
        meta_patterns: &["about", "company"],
    },
    TypeSignals {
        content_type: ContentType::Contact,
        url_patterns: &["/contact/", "/contact-us/"],
        keywords: &["contact", "reach", "get in touch", "support"],
        meta_patterns: &["contact", "support"],
    },
    TypeSignals {
        content_type: ContentType::Faq,
        url_patterns: &["/faq/", "/help/", "/support/"],
        keywords: &["faq", "frequently asked", "help", "support", "question"],
        meta_patterns: &["faq", "help"],
    },
    TypeSignals {
        content_type: ContentType::Documentation,
        url_patterns: &["/docs/", "/documentation/", "/guide/"],
        keywords: &["documentation", "guide", "manual", "tutorial", "docs"],
        meta_patterns: &["documentation", "guide"],
    },
];

/// Quality-indicator lexicon: net positive-minus-negative hits raise the
/// quality score.
pub const POSITIVE_INDICATORS: &[&str] = &[
    "comprehensive",
    "detailed",
    "thorough",
    "complete",
    "extensive",
    "well-written",
    "informative",
    "educational",
    "helpful",
    "useful",
    "professional",
    "expert",
    "authoritative",
    "reliable",
    "accurate",
];

pub const NEGATIVE_INDICATORS: &[&str] = &[
    "incomplete",
    "brief",
    "short",
    "minimal",
    "basic",
    "poorly written",
    "confusing",
    "unclear",
    "vague",
    "generic",
    "spam",
    "clickbait",
    "misleading",
    "outdated",
    "irrelevant",
];

/// Sentiment word lists.
pub const POSITIVE_SENTIMENT: &[&str] = &["good", "great", "excellent", "amazing", "wonderful"];
pub const NEGATIVE_SENTIMENT: &[&str] = &["bad", "terrible", "awful", "horrible", "worst"];
