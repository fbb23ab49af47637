// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Murmur growth agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Murmur configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MurmurConfig {
    /// Agent identity and run mode.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Product description used for discovery and scoring.
    #[serde(default)]
    pub business: BusinessConfig,

    /// Reply-worthiness scoring weights and threshold.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Behavioral limits enforced by the safety guard.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// How often each loop wakes up.
    #[serde(default)]
    pub intervals: IntervalsConfig,

    /// Loop supervision (failure thresholds and backoff).
    #[serde(default)]
    pub automation: AutomationConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Agent identity and run mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Score and generate, but never post.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

fn default_agent_name() -> String {
    "murmur".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// What the agent is promoting and where it listens.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessConfig {
    #[serde(default)]
    pub product_name: String,

    /// Keywords describing the product itself.
    #[serde(default)]
    pub product_keywords: Vec<String>,

    /// Keywords that surface competitor conversations.
    #[serde(default)]
    pub competitor_keywords: Vec<String>,

    /// Topics for original tweets and threads.
    #[serde(default)]
    pub industry_topics: Vec<String>,
}

impl BusinessConfig {
    /// Product and competitor keywords merged, case-insensitively de-duplicated,
    /// in first-seen order.
    pub fn merged_keywords(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.product_keywords
            .iter()
            .chain(self.competitor_keywords.iter())
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .filter(|k| seen.insert(k.to_lowercase()))
            .map(str::to_string)
            .collect()
    }
}

/// Per-signal maxima and the reply threshold.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Minimum total score (0-100) for a candidate to be replied to.
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    #[serde(default = "default_keyword_relevance_max")]
    pub keyword_relevance_max: f32,

    #[serde(default = "default_follower_count_max")]
    pub follower_count_max: f32,

    #[serde(default = "default_recency_max")]
    pub recency_max: f32,

    #[serde(default = "default_engagement_rate_max")]
    pub engagement_rate_max: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            keyword_relevance_max: default_keyword_relevance_max(),
            follower_count_max: default_follower_count_max(),
            recency_max: default_recency_max(),
            engagement_rate_max: default_engagement_rate_max(),
        }
    }
}

fn default_threshold() -> u32 {
    70
}

fn default_keyword_relevance_max() -> f32 {
    40.0
}

fn default_follower_count_max() -> f32 {
    20.0
}

fn default_recency_max() -> f32 {
    15.0
}

fn default_engagement_rate_max() -> f32 {
    25.0
}

/// Behavioral limits. Counters are persisted; see `murmur-storage`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    #[serde(default = "default_max_replies_per_day")]
    pub max_replies_per_day: u32,

    #[serde(default = "default_max_tweets_per_day")]
    pub max_tweets_per_day: u32,

    #[serde(default = "default_max_threads_per_week")]
    pub max_threads_per_week: u32,

    /// Search calls allowed per `search_window_secs`.
    #[serde(default = "default_max_searches_per_window")]
    pub max_searches_per_window: u32,

    #[serde(default = "default_api_window_secs")]
    pub search_window_secs: u64,

    /// Mention timeline calls allowed per `mention_check_window_secs`.
    #[serde(default = "default_max_mention_checks_per_window")]
    pub max_mention_checks_per_window: u32,

    #[serde(default = "default_api_window_secs")]
    pub mention_check_window_secs: u64,

    /// Lower bound of the random pause between two posts.
    #[serde(default = "default_min_action_delay_secs")]
    pub min_action_delay_secs: u64,

    /// Upper bound of the random pause between two posts.
    #[serde(default = "default_max_action_delay_secs")]
    pub max_action_delay_secs: u64,

    /// Weighted similarity at or above which a reply counts as repeated phrasing.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// How many recent replies the phrasing check compares against.
    #[serde(default = "default_similarity_window")]
    pub similarity_window: u32,

    /// Failed reply posts to one tweet after which the tweet is given up on.
    #[serde(default = "default_max_reply_attempts")]
    pub max_reply_attempts: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_replies_per_day: default_max_replies_per_day(),
            max_tweets_per_day: default_max_tweets_per_day(),
            max_threads_per_week: default_max_threads_per_week(),
            max_searches_per_window: default_max_searches_per_window(),
            search_window_secs: default_api_window_secs(),
            max_mention_checks_per_window: default_max_mention_checks_per_window(),
            mention_check_window_secs: default_api_window_secs(),
            min_action_delay_secs: default_min_action_delay_secs(),
            max_action_delay_secs: default_max_action_delay_secs(),
            similarity_threshold: default_similarity_threshold(),
            similarity_window: default_similarity_window(),
            max_reply_attempts: default_max_reply_attempts(),
        }
    }
}

fn default_max_replies_per_day() -> u32 {
    20
}

fn default_max_tweets_per_day() -> u32 {
    4
}

fn default_max_threads_per_week() -> u32 {
    1
}

fn default_max_searches_per_window() -> u32 {
    300
}

fn default_max_mention_checks_per_window() -> u32 {
    180
}

fn default_api_window_secs() -> u64 {
    900
}

fn default_min_action_delay_secs() -> u64 {
    30
}

fn default_max_action_delay_secs() -> u64 {
    120
}

fn default_similarity_threshold() -> f64 {
    0.8
}

fn default_similarity_window() -> u32 {
    20
}

fn default_max_reply_attempts() -> u32 {
    3
}

/// Loop wake-up intervals, in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IntervalsConfig {
    #[serde(default = "default_mentions_check_secs")]
    pub mentions_check_secs: u64,

    #[serde(default = "default_discovery_search_secs")]
    pub discovery_search_secs: u64,

    /// How often the content and thread loops wake to see if a post is due.
    #[serde(default = "default_content_check_secs")]
    pub content_check_secs: u64,

    /// Minimum spacing between two original tweets.
    #[serde(default = "default_content_post_window_secs")]
    pub content_post_window_secs: u64,

    /// Minimum spacing between two threads.
    #[serde(default = "default_thread_interval_secs")]
    pub thread_interval_secs: u64,

    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl Default for IntervalsConfig {
    fn default() -> Self {
        Self {
            mentions_check_secs: default_mentions_check_secs(),
            discovery_search_secs: default_discovery_search_secs(),
            content_check_secs: default_content_check_secs(),
            content_post_window_secs: default_content_post_window_secs(),
            thread_interval_secs: default_thread_interval_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

fn default_mentions_check_secs() -> u64 {
    300
}

fn default_discovery_search_secs() -> u64 {
    900
}

fn default_content_check_secs() -> u64 {
    600
}

fn default_content_post_window_secs() -> u64 {
    3 * 3600
}

fn default_thread_interval_secs() -> u64 {
    7 * 86_400
}

fn default_cleanup_interval_secs() -> u64 {
    86_400
}

/// Loop supervision settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AutomationConfig {
    /// Failed ticks in a row (without a success) before the extended backoff.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,

    /// First delay of the exponential backoff after a transient error.
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,

    /// Cap of the exponential backoff.
    #[serde(default = "default_backoff_max_secs")]
    pub backoff_max_secs: u64,

    /// Pause applied after too many failures or a failed auth refresh.
    #[serde(default = "default_extended_backoff_secs")]
    pub extended_backoff_secs: u64,

    /// How many recent topics the content and thread loops avoid repeating.
    #[serde(default = "default_recent_topics_window")]
    pub recent_topics_window: usize,

    /// Advisory tweet count requested for each thread.
    #[serde(default = "default_thread_tweet_count")]
    pub thread_tweet_count: usize,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: default_max_consecutive_failures(),
            backoff_base_secs: default_backoff_base_secs(),
            backoff_max_secs: default_backoff_max_secs(),
            extended_backoff_secs: default_extended_backoff_secs(),
            recent_topics_window: default_recent_topics_window(),
            thread_tweet_count: default_thread_tweet_count(),
        }
    }
}

fn default_max_consecutive_failures() -> u32 {
    10
}

fn default_backoff_base_secs() -> u64 {
    30
}

fn default_backoff_max_secs() -> u64 {
    15 * 60
}

fn default_extended_backoff_secs() -> u64 {
    3600
}

fn default_recent_topics_window() -> usize {
    5
}

fn default_thread_tweet_count() -> usize {
    5
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Days before replies, replied candidates, and posted content are pruned.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            retention_days: default_retention_days(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("murmur").join("murmur.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("murmur.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_retention_days() -> u32 {
    90
}
