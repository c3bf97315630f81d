//! DOM-to-structure extraction.
//!
//! Turns a fetched page into a [`StructuredDocument`]: visible text with
//! boilerplate removed, headings, paragraphs, lists, tables, links, images,
//! forms, buttons, meta tags and JSON-LD.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};

use crate::fetch::RawDocument;
use crate::models::{Form, FormField, Image, Link, ListBlock, StructuredDocument};
use crate::utils::text::word_count;

/// Elements whose text never counts as page content.
const BOILERPLATE_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "noscript"];

fn selector(s: &str) -> Selector {
    Selector::parse(s).expect("static selector")
}

/// Extract structured content from a raw document.
///
/// Never fails: a malformed page simply yields fewer fields. `scraper`
/// recovers from broken markup the way browsers do.
pub fn extract(raw: &RawDocument) -> StructuredDocument {
    let html = Html::parse_document(&raw.body);

    let title = html
        .select(&selector("title"))
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "No title found".to_string());

    let raw_text = visible_text(&html);

    let mut headings = BTreeMap::new();
    for level in 1..=6 {
        let tag = format!("h{level}");
        let texts: Vec<String> = html
            .select(&selector(&tag))
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect();
        headings.insert(tag, texts);
    }

    let paragraphs: Vec<String> = html
        .select(&selector("p"))
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();

    let li = selector("li");
    let lists: Vec<ListBlock> = html
        .select(&selector("ul, ol"))
        .filter_map(|list| {
            let items: Vec<String> = list
                .select(&li)
                .map(element_text)
                .filter(|t| !t.is_empty())
                .collect();
            if items.is_empty() {
                None
            } else {
                Some(ListBlock {
                    kind: list.value().name().to_string(),
                    items,
                })
            }
        })
        .collect();

    let tr = selector("tr");
    let cell = selector("td, th");
    let tables: Vec<Vec<Vec<String>>> = html
        .select(&selector("table"))
        .filter_map(|table| {
            let rows: Vec<Vec<String>> = table
                .select(&tr)
                .filter_map(|row| {
                    let cells: Vec<String> = row
                        .select(&cell)
                        .map(element_text)
                        .filter(|t| !t.is_empty())
                        .collect();
                    if cells.is_empty() {
                        None
                    } else {
                        Some(cells)
                    }
                })
                .collect();
            if rows.is_empty() {
                None
            } else {
                Some(rows)
            }
        })
        .collect();

    let links: Vec<Link> = html
        .select(&selector("a[href]"))
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            Some(Link {
                text: element_text(a),
                href: href.to_string(),
                title: a.value().attr("title").unwrap_or_default().to_string(),
            })
        })
        .collect();

    let images: Vec<Image> = html
        .select(&selector("img[src]"))
        .filter_map(|img| {
            let src = img.value().attr("src")?;
            Some(Image {
                src: src.to_string(),
                alt: img.value().attr("alt").unwrap_or_default().to_string(),
                title: img.value().attr("title").unwrap_or_default().to_string(),
            })
        })
        .collect();

    let input = selector("input");
    let forms: Vec<Form> = html
        .select(&selector("form"))
        .map(|form| Form {
            action: form.value().attr("action").unwrap_or_default().to_string(),
            method: form.value().attr("method").unwrap_or_default().to_string(),
            inputs: form
                .select(&input)
                .map(|inp| FormField {
                    kind: inp.value().attr("type").unwrap_or_default().to_string(),
                    name: inp.value().attr("name").unwrap_or_default().to_string(),
                    placeholder: inp
                        .value()
                        .attr("placeholder")
                        .unwrap_or_default()
                        .to_string(),
                })
                .collect(),
        })
        .collect();

    let buttons: Vec<String> = html
        .select(&selector("button"))
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();

    let mut meta_data = BTreeMap::new();
    for meta in html.select(&selector("meta")) {
        let name = meta
            .value()
            .attr("name")
            .or_else(|| meta.value().attr("property"));
        if let (Some(name), Some(content)) = (name, meta.value().attr("content")) {
            meta_data.insert(name.to_string(), content.to_string());
        }
    }

    // JSON-LD blocks; the last parseable one wins.
    let mut structured_data = None;
    for script in html.select(&selector(r#"script[type="application/ld+json"]"#)) {
        let body: String = script.text().collect();
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
            structured_data = Some(value);
        }
    }

    let word_count = word_count(&raw_text);

    StructuredDocument {
        url: raw.url.clone(),
        title,
        raw_text,
        word_count,
        headings,
        paragraphs,
        lists,
        tables,
        links,
        images,
        forms,
        buttons,
        meta_data,
        structured_data,
    }
}

/// Visible text of the document, skipping boilerplate elements.
fn visible_text(html: &Html) -> String {
    let mut chunks = Vec::new();
    collect_text(html.root_element(), &mut chunks);
    chunks.join(" ")
}

fn collect_text(element: ElementRef, out: &mut Vec<String>) {
    if BOILERPLATE_TAGS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
    }
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn raw(body: &str) -> RawDocument {
        RawDocument {
            url: "https://example.com/page".to_string(),
            final_url: "https://example.com/page".to_string(),
            status: 200,
            body: body.to_string(),
            content_type: Some("text/html".to_string()),
            fetched_at: Utc::now(),
        }
    }

    const SAMPLE: &str = r#"
        <html>
          <head>
            <title>Sample Page</title>
            <meta name="description" content="A sample page">
            <meta property="og:type" content="article">
            <script type="application/ld+json">{"@type": "Article"}</script>
          </head>
          <body>
            <header>Site header chrome</header>
            <h1>Main Heading</h1>
            <h2>Sub One</h2>
            <h2>Sub Two</h2>
            <p>First paragraph of body text.</p>
            <p>Second paragraph.</p>
            <ul><li>alpha</li><li>beta</li></ul>
            <table><tr><th>k</th><th>v</th></tr><tr><td>a</td><td>1</td></tr></table>
            <a href="/next" title="next page">Next</a>
            <img src="/pic.png" alt="a picture">
            <form action="/search" method="get"><input type="text" name="q" placeholder="query"></form>
            <button>Go</button>
            <script>var hidden = "should not appear";</script>
            <footer>Footer chrome</footer>
          </body>
        </html>
    "#;

    #[test]
    fn test_extracts_structure() {
        let doc = extract(&raw(SAMPLE));

        assert_eq!(doc.title, "Sample Page");
        assert_eq!(doc.headings["h1"], vec!["Main Heading"]);
        assert_eq!(doc.headings["h2"].len(), 2);
        assert_eq!(doc.paragraphs.len(), 2);
        assert_eq!(doc.lists.len(), 1);
        assert_eq!(doc.lists[0].items, vec!["alpha", "beta"]);
        assert_eq!(doc.tables.len(), 1);
        assert_eq!(doc.tables[0][1], vec!["a", "1"]);
        assert_eq!(doc.links.len(), 1);
        assert_eq!(doc.links[0].href, "/next");
        assert_eq!(doc.links[0].title, "next page");
        assert_eq!(doc.images[0].src, "/pic.png");
        assert_eq!(doc.forms.len(), 1);
        assert_eq!(doc.forms[0].inputs[0].name, "q");
        assert_eq!(doc.buttons, vec!["Go"]);
        assert_eq!(doc.meta_data["description"], "A sample page");
        assert_eq!(doc.meta_data["og:type"], "article");
        assert!(doc.structured_data.is_some());
    }

    #[test]
    fn test_visible_text_skips_boilerplate() {
        let doc = extract(&raw(SAMPLE));

        assert!(doc.raw_text.contains("First paragraph"));
        assert!(!doc.raw_text.contains("should not appear"));
        assert!(!doc.raw_text.contains("Site header chrome"));
        assert!(!doc.raw_text.contains("Footer chrome"));
        assert!(doc.word_count > 0);
    }

    #[test]
    fn test_missing_title_and_empty_body() {
        let doc = extract(&raw("<html><body></body></html>"));

        assert_eq!(doc.title, "No title found");
        assert_eq!(doc.word_count, 0);
        assert!(doc.paragraphs.is_empty());
    }
}
