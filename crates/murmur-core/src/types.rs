// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the scoring, safety, storage, and automation crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Every action type that carries a rate limit.
///
/// Mapped to its persisted string key (`reply`, `mention_check`, ...) only at
/// the storage boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Reply,
    Tweet,
    Thread,
    Search,
    MentionCheck,
}

/// Outcome recorded in the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Success,
    Skipped,
    Failure,
    DryRun,
    Partial,
}

/// Public profile attributes the scorer and generator need about an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub id: String,
    pub username: String,
    pub followers_count: u64,
}

/// Engagement counters attached to a tweet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
}

impl EngagementMetrics {
    pub fn total(&self) -> u64 {
        self.likes
            .saturating_add(self.retweets)
            .saturating_add(self.replies)
    }
}

/// A tweet returned by search or the mentions timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetCandidate {
    /// Platform tweet id.
    pub id: String,
    pub text: String,
    /// RFC 3339 creation timestamp as reported by the platform.
    pub created_at: String,
    pub author: AuthorInfo,
    #[serde(default)]
    pub metrics: EngagementMetrics,
}
