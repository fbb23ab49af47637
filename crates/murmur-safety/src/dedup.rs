// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply deduplication: exact target history and phrasing similarity.

use std::collections::HashSet;

use murmur_core::MurmurError;
use murmur_storage::queries::replies;
use murmur_storage::Database;

/// Weight of the word-set overlap in the blended score; the rest is
/// character-level Jaro-Winkler.
const WORD_WEIGHT: f64 = 0.35;

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Word-set Jaccard index of two texts (lowercase alphanumeric words).
///
/// Two texts with no words at all score 0.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let a: HashSet<String> = tokens(a).into_iter().collect();
    let b: HashSet<String> = tokens(b).into_iter().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Blended similarity in `[0, 1]`: word overlap plus character-level
/// Jaro-Winkler over the normalized text.
pub fn phrasing_similarity(a: &str, b: &str) -> f64 {
    let norm_a = tokens(a).join(" ");
    let norm_b = tokens(b).join(" ");
    if norm_a.is_empty() || norm_b.is_empty() {
        return 0.0;
    }
    let chars = strsim::jaro_winkler(&norm_a, &norm_b);
    WORD_WEIGHT * jaccard_similarity(a, b) + (1.0 - WORD_WEIGHT) * chars
}

/// Whether `candidate` matches any of `recent` exactly or scores at least
/// `threshold`.
pub fn is_similar_to_any(candidate: &str, recent: &[String], threshold: f64) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return false;
    }
    recent.iter().any(|previous| {
        previous.trim() == candidate || phrasing_similarity(candidate, previous) >= threshold
    })
}

/// Reply history lookups backed by `replies_sent`.
#[derive(Clone)]
pub struct DedupChecker {
    db: Database,
    threshold: f64,
    window: u32,
}

impl DedupChecker {
    pub fn new(db: Database, threshold: f64, window: u32) -> Self {
        Self {
            db,
            threshold,
            window,
        }
    }

    /// Whether a non-failed reply to `target_tweet_id` was recorded.
    pub async fn has_replied(&self, target_tweet_id: &str) -> Result<bool, MurmurError> {
        replies::has_replied(&self.db, target_tweet_id).await
    }

    pub async fn failed_attempts(&self, target_tweet_id: &str) -> Result<u32, MurmurError> {
        replies::failed_attempts(&self.db, target_tweet_id).await
    }

    /// Compare `candidate` against the configured window of recent replies.
    pub async fn is_phrasing_similar(&self, candidate: &str) -> Result<bool, MurmurError> {
        self.is_phrasing_similar_within(candidate, self.window).await
    }

    /// Compare `candidate` against the last `window` replies.
    pub async fn is_phrasing_similar_within(
        &self,
        candidate: &str,
        window: u32,
    ) -> Result<bool, MurmurError> {
        if candidate.trim().is_empty() {
            return Ok(false);
        }
        let recent = replies::recent_reply_contents(&self.db, window).await?;
        Ok(is_similar_to_any(candidate, &recent, self.threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn recent(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn jaccard_basics() {
        assert_eq!(jaccard_similarity("a b c", "a b c"), 1.0);
        assert_eq!(jaccard_similarity("a b", "c d"), 0.0);
        assert!((jaccard_similarity("great tool for devs", "great tool for developers") - 0.6).abs() < 1e-9);
        assert_eq!(jaccard_similarity("", "!!"), 0.0);
    }

    #[test]
    fn near_paraphrase_is_similar() {
        assert!(is_similar_to_any(
            "great tool for devs",
            &recent(&["great tool for developers"]),
            0.8
        ));
    }

    #[test]
    fn unrelated_text_is_not_similar() {
        assert!(!is_similar_to_any(
            "great tool for devs",
            &recent(&["I love pasta"]),
            0.8
        ));
    }

    #[test]
    fn exact_match_is_similar_even_at_strict_threshold() {
        assert!(is_similar_to_any("Same words.", &recent(&["Same words."]), 1.0));
    }

    #[test]
    fn case_and_punctuation_are_ignored() {
        let score = phrasing_similarity("Totally agree, Rust rocks!", "totally agree rust rocks");
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_candidate_is_never_similar() {
        assert!(!is_similar_to_any("", &recent(&[""]), 0.8));
        assert!(!is_similar_to_any("   ", &recent(&["anything"]), 0.8));
        assert!(!is_similar_to_any("hello", &[], 0.8));
    }

    proptest! {
        #[test]
        fn similarity_bounded(a in "[a-z ]{0,40}", b in "[a-z ]{0,40}") {
            let score = phrasing_similarity(&a, &b);
            prop_assert!((0.0..=1.0 + 1e-9).contains(&score));
        }

        #[test]
        fn text_is_similar_to_itself(a in "[a-z]{1,10}( [a-z]{1,10}){0,5}") {
            prop_assert!(is_similar_to_any(&a, &[a.clone()], 0.8));
        }
    }
}
