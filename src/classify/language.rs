//! Stop-word based language detection.

use crate::utils::text::word_set;

/// Stop-word tables, in tie-break order.
const LANGUAGE_STOPWORDS: &[(&str, &[&str])] = &[
    (
        "english",
        &[
            "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        ],
    ),
    (
        "spanish",
        &["el", "la", "de", "que", "y", "a", "en", "un", "es", "se"],
    ),
    (
        "french",
        &["le", "la", "de", "et", "à", "en", "un", "une", "est", "que"],
    ),
];

/// Detect the dominant language of `text`.
///
/// Each language scores one point per stop word present in the text's word
/// tokens; the highest score wins, ties going to the earlier table entry.
/// Returns "unknown" when nothing matches.
pub fn detect(text: &str) -> String {
    let tokens = word_set(text);
    let mut best: Option<(&str, usize)> = None;
    for (language, stopwords) in LANGUAGE_STOPWORDS {
        let score = stopwords.iter().filter(|w| tokens.contains(**w)).count();
        if score > 0 && best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((language, score));
        }
    }
    best.map(|(language, _)| language.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_english() {
        assert_eq!(
            detect("The cat sat on the mat and looked at the door for hours."),
            "english"
        );
    }

    #[test]
    fn test_detects_spanish() {
        assert_eq!(
            detect("El perro corre en la calle y es un animal que se mueve."),
            "spanish"
        );
    }

    #[test]
    fn test_detects_french() {
        assert_eq!(
            detect("Le chat est une créature qui dort et mange en paix."),
            "french"
        );
    }

    #[test]
    fn test_no_stopwords_is_unknown() {
        assert_eq!(detect("zxcv qwerty asdf"), "unknown");
        assert_eq!(detect(""), "unknown");
    }
}
