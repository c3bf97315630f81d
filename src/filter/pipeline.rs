//! The ordered predicate chain.
//!
//! Predicates run in a fixed order and short-circuit on the first failure.
//! The order only affects how much work a rejected page costs; every
//! predicate is independent, so the surviving set is the same under any
//! order.

use tracing::debug;

use crate::classify::ClassifierSession;
use crate::models::PageRecord;

use super::CompiledFilter;

/// Run the filter over a page set, keeping survivors.
///
/// Pages arriving without an analysis (e.g. loaded from an old report) are
/// classified here, in list order, against the given session.
pub fn apply(
    pages: Vec<PageRecord>,
    filter: &CompiledFilter,
    session: &mut ClassifierSession,
) -> Vec<PageRecord> {
    let mut kept = Vec::new();
    for mut page in pages {
        // 1. Failed fetches never survive.
        if !page.success {
            continue;
        }
        if page.content_analysis.is_none() {
            page.content_analysis = Some(session.analyze(&page.detailed_text));
        }
        if passes(&page, filter) {
            kept.push(page);
        } else {
            debug!("filtered out {}", page.url);
        }
    }
    kept
}

fn passes(page: &PageRecord, filter: &CompiledFilter) -> bool {
    let Some(analysis) = page.content_analysis.as_ref() else {
        return false;
    };

    // 2. Content type membership.
    if let Some(types) = &filter.content_types {
        if !types.contains(&analysis.content_type) {
            return false;
        }
    }

    // 3. Word count bounds.
    if page.word_count < filter.min_word_count {
        return false;
    }
    if let Some(max) = filter.max_word_count {
        if page.word_count > max {
            return false;
        }
    }

    // 4. Quality floor.
    if analysis.quality_score < filter.min_quality_score {
        return false;
    }

    // 5. Date range; a page with no extractable date passes.
    if let Some((start, end)) = filter.date_range {
        if let Some(date) = analysis.extracted_date {
            if date < start || date > end {
                return false;
            }
        }
    }

    // 6. Required keywords (any-of).
    let text_lower = page.detailed_text.raw_text.to_lowercase();
    if !filter.keywords.is_empty() && !filter.keywords.iter().any(|k| text_lower.contains(k)) {
        return false;
    }

    // 7. Excluded keywords (none-of).
    if filter
        .exclude_keywords
        .iter()
        .any(|k| text_lower.contains(k))
    {
        return false;
    }

    // 8. URL allow patterns (any-of).
    if !filter.url_patterns.is_empty()
        && !filter.url_patterns.iter().any(|p| p.is_match(&page.url))
    {
        return false;
    }

    // 9. URL deny patterns (none-of).
    if filter
        .exclude_url_patterns
        .iter()
        .any(|p| p.is_match(&page.url))
    {
        return false;
    }

    // 10. Link count bounds.
    let links = page.detailed_text.links.len();
    if links < filter.min_links {
        return false;
    }
    if let Some(max) = filter.max_links {
        if links > max {
            return false;
        }
    }

    // 11. Image count bounds.
    let images = page.detailed_text.images.len();
    if images < filter.min_images {
        return false;
    }
    if let Some(max) = filter.max_images {
        if images > max {
            return false;
        }
    }

    // 12. Language exact match.
    if let Some(language) = &filter.language {
        if &analysis.language != language {
            return false;
        }
    }

    // 13. Sentiment exact match.
    if let Some(sentiment) = filter.sentiment {
        if analysis.sentiment != sentiment {
            return false;
        }
    }

    // 14. Duplicate exclusion; a zero threshold disables it.
    if filter.duplicate_threshold > 0.0 && analysis.is_duplicate {
        return false;
    }

    true
}
