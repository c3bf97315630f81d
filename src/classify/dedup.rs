//! Duplicate detection: exact content hashes plus Jaccard near-duplicates.

use std::collections::{HashSet, VecDeque};

use sha2::{Digest, Sha256};

use crate::utils::text::word_set;

/// Stateful duplicate detector, scoped to one crawl run.
///
/// Exact duplicates are caught by SHA-256 of the text. With a threshold
/// strictly between 0 and 1, each new page is additionally compared against
/// the word sets of every previously seen page (O(n) per page, bounded by
/// the crawl's page budget). Thresholds of 0 and 1 keep only the exact-hash
/// check.
#[derive(Debug)]
pub struct DuplicateDetector {
    threshold: f64,
    hashes: HashSet<String>,
    word_sets: VecDeque<HashSet<String>>,
}

impl DuplicateDetector {
    /// `threshold` is the Jaccard similarity at or above which two pages
    /// count as near-duplicates; 0.0 and 1.0 disable the near-duplicate
    /// pass.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            hashes: HashSet::new(),
            word_sets: VecDeque::new(),
        }
    }

    /// Jaccard similarity of the word sets of two texts.
    pub fn similarity(a: &str, b: &str) -> f64 {
        let set_a = word_set(a);
        let set_b = word_set(b);
        jaccard(&set_a, &set_b)
    }

    /// Check `text` against the run's history, recording it as seen.
    ///
    /// The first sighting of a text returns false; identical text returns
    /// true on every later call within the same run.
    pub fn check(&mut self, text: &str) -> bool {
        let digest = hash_text(text);
        if !self.hashes.insert(digest) {
            return true;
        }

        if self.threshold > 0.0 && self.threshold < 1.0 {
            let words = word_set(text);
            if self
                .word_sets
                .iter()
                .any(|seen| jaccard(seen, &words) >= self.threshold)
            {
                return true;
            }
            self.word_sets.push_back(words);
        }

        false
    }

    /// Forget all history. Fresh runs must start from a cleared detector.
    pub fn reset(&mut self) {
        self.hashes.clear();
        self.word_sets.clear();
    }
}

fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sighting_then_duplicate() {
        let mut detector = DuplicateDetector::new(1.0);
        assert!(!detector.check("some page text"));
        assert!(detector.check("some page text"));
        assert!(detector.check("some page text"));
        assert!(!detector.check("different text"));
    }

    #[test]
    fn test_near_duplicate_above_threshold() {
        let mut detector = DuplicateDetector::new(0.5);
        assert!(!detector.check("the quick brown fox jumps over the lazy dog"));
        // Seven of eight distinct words shared: similarity 7/9.
        assert!(detector.check("the quick brown fox jumps over the sleepy dog"));
        // Unrelated text passes.
        assert!(!detector.check("completely unrelated content about kernels"));
    }

    #[test]
    fn test_exact_only_at_threshold_one() {
        let mut detector = DuplicateDetector::new(1.0);
        assert!(!detector.check("the quick brown fox jumps over the lazy dog"));
        assert!(!detector.check("the quick brown fox jumps over the sleepy dog"));
    }

    #[test]
    fn test_reset_clears_history() {
        let mut detector = DuplicateDetector::new(0.8);
        assert!(!detector.check("repeated text"));
        assert!(detector.check("repeated text"));
        detector.reset();
        assert!(!detector.check("repeated text"));
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(DuplicateDetector::similarity("a b c", "a b c"), 1.0);
        assert_eq!(DuplicateDetector::similarity("a b", "c d"), 0.0);
        let partial = DuplicateDetector::similarity("a b c d", "c d e f");
        assert!(partial > 0.0 && partial < 1.0);
    }
}
