// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Combines the four signals into a total score and a reply verdict.

use std::fmt;

use chrono::{DateTime, Utc};
use murmur_config::model::{BusinessConfig, ScoringConfig};
use murmur_core::{AuthorInfo, TweetCandidate};
use serde::Serialize;

use crate::signals;

/// Score breakdown for one candidate. Owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TweetScore {
    /// Sum of the sub-scores, clamped to `[0, 100]`.
    pub total: f32,
    pub keyword_relevance: f32,
    pub follower: f32,
    pub recency: f32,
    pub engagement: f32,
    /// `total >= threshold`.
    pub meets_threshold: bool,
}

impl fmt::Display for TweetScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0}/100 [kw:{:.0} fol:{:.0} rec:{:.0} eng:{:.0}] {}",
            self.total,
            self.keyword_relevance,
            self.follower,
            self.recency,
            self.engagement,
            if self.meets_threshold { "REPLY" } else { "SKIP" }
        )
    }
}

/// Pure, side-effect free scorer configured with signal maxima, a threshold,
/// and the keyword list.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    keywords: Vec<String>,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig, keywords: Vec<String>) -> Self {
        Self { config, keywords }
    }

    /// Engine over the merged product and competitor keywords.
    pub fn from_config(scoring: &ScoringConfig, business: &BusinessConfig) -> Self {
        Self::new(scoring.clone(), business.merged_keywords())
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn threshold(&self) -> u32 {
        self.config.threshold
    }

    /// Score against the wall clock.
    pub fn score(&self, tweet: &TweetCandidate, author: &AuthorInfo) -> TweetScore {
        self.score_at(tweet, author, Utc::now())
    }

    pub fn score_at(
        &self,
        tweet: &TweetCandidate,
        author: &AuthorInfo,
        now: DateTime<Utc>,
    ) -> TweetScore {
        let c = &self.config;
        let keyword_relevance =
            signals::keyword_relevance(&tweet.text, &self.keywords, c.keyword_relevance_max);
        let follower = signals::follower_score(author.followers_count, c.follower_count_max);
        let recency = signals::recency_score_at(&tweet.created_at, now, c.recency_max);
        let engagement = signals::engagement_score(
            &tweet.metrics,
            author.followers_count,
            c.engagement_rate_max,
        );

        let total = (keyword_relevance + follower + recency + engagement).clamp(0.0, 100.0);
        TweetScore {
            total,
            keyword_relevance,
            follower,
            recency,
            engagement,
            meets_threshold: total >= c.threshold as f32,
        }
    }

    /// First configured keyword found in `text`, if any.
    pub fn matched_keyword(&self, text: &str) -> Option<String> {
        signals::matched_keywords(text, &self.keywords)
            .first()
            .map(|k| k.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use murmur_core::types::EngagementMetrics;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    fn candidate(text: &str, followers: u64, age_minutes: i64, interactions: u64) -> TweetCandidate {
        TweetCandidate {
            id: "t-1".to_string(),
            text: text.to_string(),
            created_at: (now() - Duration::minutes(age_minutes)).to_rfc3339(),
            author: AuthorInfo {
                id: "a-1".to_string(),
                username: "dev".to_string(),
                followers_count: followers,
            },
            metrics: EngagementMetrics {
                likes: interactions,
                retweets: 0,
                replies: 0,
            },
        }
    }

    fn engine() -> ScoringEngine {
        ScoringEngine::new(
            ScoringConfig::default(),
            vec!["rust".to_string(), "job queue".to_string()],
        )
    }

    #[test]
    fn strong_candidate_meets_threshold() {
        let tweet = candidate("looking for a rust job queue", 100_000, 1, 10_000);
        let score = engine().score_at(&tweet, &tweet.author, now());
        assert!((score.total - 100.0).abs() < 1e-3);
        assert!(score.meets_threshold);
        assert!(score.to_string().ends_with("REPLY"));
    }

    #[test]
    fn weak_candidate_is_skipped() {
        let tweet = candidate("what's for lunch", 10, 600, 0);
        let score = engine().score_at(&tweet, &tweet.author, now());
        assert_eq!(score.keyword_relevance, 0.0);
        assert_eq!(score.recency, 0.0);
        assert!(!score.meets_threshold);
    }

    #[test]
    fn total_is_clamped_when_maxima_exceed_hundred() {
        let config = ScoringConfig {
            keyword_relevance_max: 80.0,
            follower_count_max: 80.0,
            recency_max: 80.0,
            engagement_rate_max: 80.0,
            ..ScoringConfig::default()
        };
        let engine = ScoringEngine::new(config, vec!["rust".to_string()]);
        let tweet = candidate("rust", 100_000, 0, 100_000);
        let score = engine.score_at(&tweet, &tweet.author, now());
        assert_eq!(score.total, 100.0);
    }

    #[test]
    fn threshold_is_inclusive() {
        let config = ScoringConfig {
            threshold: 40,
            keyword_relevance_max: 40.0,
            follower_count_max: 0.0,
            recency_max: 0.0,
            engagement_rate_max: 0.0,
        };
        let engine = ScoringEngine::new(config, vec!["rust".to_string()]);
        let tweet = candidate("rust", 1, 0, 0);
        let score = engine.score_at(&tweet, &tweet.author, now());
        assert_eq!(score.total, 40.0);
        assert!(score.meets_threshold);
    }

    #[test]
    fn from_config_merges_keywords() {
        let business = BusinessConfig {
            product_keywords: vec!["Rust".into()],
            competitor_keywords: vec!["rust".into(), "go".into()],
            ..BusinessConfig::default()
        };
        let engine = ScoringEngine::from_config(&ScoringConfig::default(), &business);
        assert_eq!(engine.keywords(), ["Rust".to_string(), "go".to_string()]);
        assert_eq!(engine.matched_keyword("I like GO"), Some("go".to_string()));
    }

    proptest! {
        #[test]
        fn total_always_within_bounds(
            followers in any::<u64>(),
            interactions in any::<u64>(),
            age in -1_000i64..10_000,
            kw_max in 0.0f32..200.0,
            eng_max in 0.0f32..200.0,
        ) {
            let config = ScoringConfig {
                keyword_relevance_max: kw_max,
                engagement_rate_max: eng_max,
                ..ScoringConfig::default()
            };
            let engine = ScoringEngine::new(config, vec!["rust".to_string()]);
            let tweet = candidate("rust everywhere", followers, age, interactions);
            let score = engine.score_at(&tweet, &tweet.author, now());
            prop_assert!((0.0..=100.0).contains(&score.total));
        }
    }
}
