// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for storage entities and the timestamp format they share.

use chrono::{DateTime, Utc};
use murmur_core::{ActionStatus, ActionType, TweetCandidate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Fixed-width UTC format used for every persisted timestamp.
///
/// Lexicographic order matches chronological order, so `created_at < ?` works
/// directly in SQL.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a persisted timestamp. Accepts any RFC 3339 string.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Outcome of a posted (or attempted) reply, tweet or thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Sent,
    DryRun,
    Failed,
    /// Thread chains only: some but not all tweets were posted.
    Partial,
}

/// Persisted counter for one action type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitState {
    pub action: ActionType,
    pub request_count: u32,
    pub period_start: DateTime<Utc>,
    pub max_requests: u32,
    pub period_seconds: u64,
}

impl RateLimitState {
    /// Whether the current period has fully elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now.signed_duration_since(self.period_start).num_seconds();
        elapsed >= self.period_seconds as i64
    }

    pub fn has_capacity(&self) -> bool {
        self.request_count < self.max_requests
    }

    pub fn remaining(&self) -> u32 {
        self.max_requests.saturating_sub(self.request_count)
    }

    /// When the current period ends.
    pub fn resets_at(&self) -> DateTime<Utc> {
        self.period_start + chrono::Duration::seconds(self.period_seconds as i64)
    }
}

/// A reply sent (or attempted) to a target tweet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyRecord {
    /// Row id; 0 until inserted.
    pub id: i64,
    pub target_tweet_id: String,
    pub reply_tweet_id: Option<String>,
    pub reply_content: String,
    pub created_at: String,
    pub status: RecordStatus,
    pub error_message: Option<String>,
}

impl ReplyRecord {
    pub fn new(target_tweet_id: &str, reply_content: &str, status: RecordStatus) -> Self {
        Self {
            id: 0,
            target_tweet_id: target_tweet_id.to_string(),
            reply_tweet_id: None,
            reply_content: reply_content.to_string(),
            created_at: format_timestamp(Utc::now()),
            status,
            error_message: None,
        }
    }

    pub fn with_reply_id(mut self, reply_tweet_id: impl Into<String>) -> Self {
        self.reply_tweet_id = Some(reply_tweet_id.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// A tweet found by keyword search, with its computed relevance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredCandidate {
    pub id: String,
    pub author_id: String,
    pub author_username: String,
    pub author_followers: u64,
    pub content: String,
    pub like_count: u64,
    pub retweet_count: u64,
    pub reply_count: u64,
    pub relevance_score: f64,
    pub matched_keyword: Option<String>,
    pub discovered_at: String,
    pub replied_to: bool,
}

impl DiscoveredCandidate {
    /// Build a row from a search hit.
    pub fn from_tweet(tweet: &TweetCandidate, score: f64, matched_keyword: Option<String>) -> Self {
        Self {
            id: tweet.id.clone(),
            author_id: tweet.author.id.clone(),
            author_username: tweet.author.username.clone(),
            author_followers: tweet.author.followers_count,
            content: tweet.text.clone(),
            like_count: tweet.metrics.likes,
            retweet_count: tweet.metrics.retweets,
            reply_count: tweet.metrics.replies,
            relevance_score: score,
            matched_keyword,
            discovered_at: format_timestamp(Utc::now()),
            replied_to: false,
        }
    }
}

/// A standalone tweet posted by the content loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginalTweetRecord {
    pub id: i64,
    pub tweet_id: Option<String>,
    pub content: String,
    pub topic: Option<String>,
    pub created_at: String,
    pub status: RecordStatus,
    pub error_message: Option<String>,
}

impl OriginalTweetRecord {
    pub fn new(content: &str, topic: Option<&str>, status: RecordStatus) -> Self {
        Self {
            id: 0,
            tweet_id: None,
            content: content.to_string(),
            topic: topic.map(str::to_string),
            created_at: format_timestamp(Utc::now()),
            status,
            error_message: None,
        }
    }
}

/// A reply-chain thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadRecord {
    pub id: i64,
    pub topic: String,
    /// Number of tweets the generator produced.
    pub planned_count: u32,
    /// Number of tweets actually posted.
    pub tweet_count: u32,
    pub root_tweet_id: Option<String>,
    pub created_at: String,
    pub status: RecordStatus,
    pub error_message: Option<String>,
}

impl ThreadRecord {
    pub fn new(topic: &str, planned_count: u32, status: RecordStatus) -> Self {
        Self {
            id: 0,
            topic: topic.to_string(),
            planned_count,
            tweet_count: 0,
            root_tweet_id: None,
            created_at: format_timestamp(Utc::now()),
            status,
            error_message: None,
        }
    }
}

/// One tweet of a thread, by position (0 = root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadTweetRecord {
    pub position: u32,
    pub tweet_id: Option<String>,
    pub content: String,
}

/// An append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionLogEntry {
    pub id: i64,
    pub action_type: String,
    pub status: ActionStatus,
    pub message: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
}

impl ActionLogEntry {
    pub fn new(action_type: impl Into<String>, status: ActionStatus, message: impl Into<String>) -> Self {
        Self {
            id: 0,
            action_type: action_type.into(),
            status,
            message: Some(message.into()),
            metadata: None,
            created_at: format_timestamp(Utc::now()),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
