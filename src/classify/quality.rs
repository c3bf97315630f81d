//! Composite quality scoring.
//!
//! Five independently capped sub-scores summed and clamped to [0, 100]:
//! length (20), structure (25), readability (20), lexical diversity (15),
//! and quality-indicator lexicon (20).

use crate::models::{ContentQuality, StructuredDocument};
use crate::utils::text::sentence_count;

use super::patterns::{NEGATIVE_INDICATORS, POSITIVE_INDICATORS};

/// Score a page's textual substance. Deterministic; empty text scores 0.
pub fn assess(raw_text: &str, doc: &StructuredDocument) -> (ContentQuality, f64) {
    let word_count = raw_text.split_whitespace().count();
    if word_count == 0 {
        return (ContentQuality::from_score(0.0), 0.0);
    }

    let mut score = 0.0;

    // Length: stepped thresholds.
    score += if word_count >= 1000 {
        20.0
    } else if word_count >= 500 {
        15.0
    } else if word_count >= 200 {
        10.0
    } else if word_count >= 100 {
        5.0
    } else {
        0.0
    };

    // Structure: headings weigh most, then lists, then paragraphs.
    let structure = doc.heading_count() as f64 * 2.0
        + doc.paragraphs.len() as f64 * 0.5
        + doc.lists.len() as f64;
    score += structure.min(25.0);

    // Readability: banded by average sentence length, optimum 10-20 words.
    let avg_sentence_len = word_count as f64 / sentence_count(raw_text).max(1) as f64;
    score += if (10.0..=20.0).contains(&avg_sentence_len) {
        20.0
    } else if (5.0..=25.0).contains(&avg_sentence_len) {
        15.0
    } else if (3.0..=30.0).contains(&avg_sentence_len) {
        10.0
    } else {
        5.0
    };

    // Lexical diversity: unique-word ratio.
    let lowered = raw_text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let unique: std::collections::HashSet<&str> = words.iter().copied().collect();
    score += unique.len() as f64 / words.len().max(1) as f64 * 15.0;

    // Quality indicators: net positive hits, floored at zero.
    let positives = POSITIVE_INDICATORS
        .iter()
        .filter(|w| lowered.contains(**w))
        .count() as f64;
    let negatives = NEGATIVE_INDICATORS
        .iter()
        .filter(|w| lowered.contains(**w))
        .count() as f64;
    score += (((positives - negatives) * 2.0).max(0.0)).min(20.0);

    let final_score = score.clamp(0.0, 100.0);
    (ContentQuality::from_score(final_score), final_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListBlock;
    use std::collections::BTreeMap;

    fn doc_with(headings: usize, paragraphs: usize, lists: usize) -> StructuredDocument {
        let mut heading_map = BTreeMap::new();
        heading_map.insert("h2".to_string(), vec!["heading".to_string(); headings]);
        StructuredDocument {
            headings: heading_map,
            paragraphs: vec!["paragraph".to_string(); paragraphs],
            lists: vec![ListBlock::default(); lists],
            ..Default::default()
        }
    }

    /// 1200 unique words in 15-word sentences, with ten positive indicator
    /// words mixed in, over a structured page.
    fn rich_text() -> String {
        let mut words: Vec<String> = (0..1190).map(|i| format!("term{i:04}")).collect();
        words.extend(
            [
                "comprehensive",
                "detailed",
                "thorough",
                "complete",
                "extensive",
                "informative",
                "educational",
                "helpful",
                "professional",
                "reliable",
            ]
            .iter()
            .map(|w| w.to_string()),
        );
        words
            .chunks(15)
            .map(|chunk| chunk.join(" "))
            .collect::<Vec<_>>()
            .join(". ")
            + "."
    }

    #[test]
    fn test_rich_structured_page_scores_excellent() {
        let text = rich_text();
        let (quality, score) = assess(&text, &doc_with(4, 6, 0));
        assert!(score >= 80.0, "expected >= 80, got {score}");
        assert_eq!(quality, ContentQuality::Excellent);
    }

    #[test]
    fn test_empty_text_scores_zero() {
        let (quality, score) = assess("", &doc_with(3, 3, 1));
        assert_eq!(score, 0.0);
        assert_eq!(quality, ContentQuality::Poor);
    }

    #[test]
    fn test_length_thresholds_step() {
        let short = vec!["w"; 99].join(" ");
        let medium = vec!["w"; 250].join(" ");
        let (_, short_score) = assess(&short, &StructuredDocument::default());
        let (_, medium_score) = assess(&medium, &StructuredDocument::default());
        assert!(medium_score > short_score);
    }

    #[test]
    fn test_negative_indicators_lower_score() {
        let base: Vec<String> = (0..500).map(|i| format!("w{i}")).collect();
        let clean = base.join(" ");
        let spammy = format!("{} spam clickbait misleading vague generic", clean);
        let doc = StructuredDocument::default();
        let (_, clean_score) = assess(&clean, &doc);
        let (_, spam_score) = assess(&spammy, &doc);
        assert!(spam_score <= clean_score);
    }

    #[test]
    fn test_deterministic() {
        let text = rich_text();
        let doc = doc_with(2, 4, 1);
        assert_eq!(assess(&text, &doc), assess(&text, &doc));
    }
}
