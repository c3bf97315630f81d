//! End-to-end flow through the public API: extract pages from HTML,
//! classify them, filter, and assemble a report.

use chrono::Utc;
use uuid::Uuid;

use sitesift::classify::ClassifierSession;
use sitesift::extract::extract;
use sitesift::fetch::{FetchMethod, RawDocument};
use sitesift::filter::{pipeline, FilterSpec};
use sitesift::models::{CrawlMetadata, CrawlReport, PageRecord};

fn raw(url: &str, body: &str) -> RawDocument {
    RawDocument {
        url: url.to_string(),
        final_url: url.to_string(),
        status: 200,
        body: body.to_string(),
        content_type: Some("text/html".to_string()),
        fetched_at: Utc::now(),
    }
}

fn page_from_html(url: &str, body: &str) -> PageRecord {
    let doc = extract(&raw(url, body));
    PageRecord {
        url: doc.url.clone(),
        title: doc.title.clone(),
        word_count: doc.word_count,
        text_content: doc.raw_text.clone(),
        detailed_text: doc,
        content_analysis: None,
        discovered_links: Vec::new(),
        success: true,
        method: FetchMethod::Http,
    }
}

fn article_body(extra: &str) -> String {
    let prose: String = (0..60)
        .map(|i| format!("Sentence number {i} talks about the article topic at length."))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "<html><head><title>A Story Article</title>\
         <meta name=\"description\" content=\"article feature story\"></head>\
         <body><h1>Story</h1><h2>Details</h2>\
         <p>{prose}</p><p>{extra}</p></body></html>"
    )
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
fn filter_selects_articles_and_report_reflects_them() {
    let pages = vec![
        page_from_html(
            "https://example.com/article/lead",
            &article_body("The article and the news story in full."),
        ),
        page_from_html(
            "https://example.com/contact-us/form",
            "<html><head><title>Contact</title></head>\
             <body><p>Reach our support team to get in touch.</p></body></html>",
        ),
        page_from_html(
            "https://example.com/article/short",
            "<html><head><title>Stub article</title></head><body><p>article stub</p></body></html>",
        ),
    ];

    let filter = FilterSpec {
        content_types: Some(vec!["article".to_string()]),
        min_word_count: 100,
        language: Some("english".to_string()),
        duplicate_threshold: 0.95,
        ..Default::default()
    }
    .compile()
    .expect("filter compiles");

    let mut session = ClassifierSession::new(filter.duplicate_threshold);
    let kept = pipeline::apply(pages, &filter, &mut session);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].url, "https://example.com/article/lead");
    let analysis = kept[0].content_analysis.as_ref().expect("annotated");
    assert_eq!(analysis.content_type.as_str(), "article");
    assert_eq!(analysis.language, "english");
    assert!(!analysis.is_duplicate);

    let report = CrawlReport::from_pages(metadata(), kept);
    assert!(report.success);
    assert_eq!(report.statistics.total_pages, 1);
    assert!(report.site_structure.0.contains_key("article"));
}

#[test]
fn report_json_survives_refiltering() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("report.json");

    let pages = vec![
        page_from_html("https://example.com/article/a", &article_body("unique closing a")),
        page_from_html("https://example.com/article/b", &article_body("unique closing b")),
    ];
    let report = CrawlReport::from_pages(metadata(), pages);
    report.save_json(&path).expect("save");

    // Reload and apply a tighter filter, as the `filter` subcommand does.
    let mut loaded = CrawlReport::load_json(&path).expect("load");
    let filter = FilterSpec {
        min_word_count: 100_000,
        ..Default::default()
    }
    .compile()
    .expect("filter compiles");
    let mut session = ClassifierSession::new(filter.duplicate_threshold);
    let pages = std::mem::take(&mut loaded.pages);
    let kept = pipeline::apply(pages, &filter, &mut session);

    assert!(kept.is_empty());
    let rebuilt = CrawlReport::from_pages(loaded.metadata, kept);
    assert!(!rebuilt.success);
}
