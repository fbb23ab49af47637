// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The one gate every posting action passes through.
//!
//! Checks run in a fixed order (rate limit, exact dedup, failed attempts,
//! phrasing) and stop at the first denial. The outer `Result` carries infrastructure failures;
//! the inner [`Decision`] carries business denials.

use murmur_config::model::LimitsConfig;
use murmur_core::{ActionType, MurmurError};
use murmur_storage::models::RateLimitState;
use murmur_storage::Database;
use tracing::debug;

use crate::dedup::DedupChecker;
use crate::denial::{Decision, DenialReason};
use crate::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct SafetyGuard {
    limiter: RateLimiter,
    dedup: DedupChecker,
    max_reply_attempts: u32,
}

impl SafetyGuard {
    pub fn new(db: Database, limits: &LimitsConfig) -> Self {
        Self {
            limiter: RateLimiter::new(db.clone()),
            dedup: DedupChecker::new(db, limits.similarity_threshold, limits.similarity_window),
            max_reply_attempts: limits.max_reply_attempts,
        }
    }

    pub fn from_parts(limiter: RateLimiter, dedup: DedupChecker, max_reply_attempts: u32) -> Self {
        Self {
            limiter,
            dedup,
            max_reply_attempts,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn dedup(&self) -> &DedupChecker {
        &self.dedup
    }

    /// May we reply to `target_tweet_id` (optionally with `proposed_text`)?
    ///
    /// Does not count anything against the reply limit.
    pub async fn can_reply(
        &self,
        target_tweet_id: &str,
        proposed_text: Option<&str>,
    ) -> Result<Decision, MurmurError> {
        if let Err(denial) = self.limiter.check(ActionType::Reply).await? {
            return Ok(self.deny(target_tweet_id, denial));
        }
        self.check_history(target_tweet_id, proposed_text).await
    }

    /// Dedup and phrasing checks, then atomically take one unit of the reply
    /// limit. A granted reservation is never handed back.
    pub async fn reserve_reply(
        &self,
        target_tweet_id: &str,
        text: &str,
    ) -> Result<Decision, MurmurError> {
        if let Err(denial) = self.check_history(target_tweet_id, Some(text)).await? {
            return Ok(Err(denial));
        }
        match self.limiter.acquire(ActionType::Reply).await? {
            Ok(()) => Ok(Ok(())),
            Err(denial) => Ok(self.deny(target_tweet_id, denial)),
        }
    }

    pub async fn can_post_tweet(&self) -> Result<Decision, MurmurError> {
        self.limiter.check(ActionType::Tweet).await
    }

    pub async fn can_post_thread(&self) -> Result<Decision, MurmurError> {
        self.limiter.check(ActionType::Thread).await
    }

    /// Check and count a read-side action (search, mention check).
    pub async fn acquire(&self, action: ActionType) -> Result<Decision, MurmurError> {
        self.limiter.acquire(action).await
    }

    pub async fn record_reply(&self) -> Result<(), MurmurError> {
        self.limiter.record(ActionType::Reply).await
    }

    pub async fn record_tweet(&self) -> Result<(), MurmurError> {
        self.limiter.record(ActionType::Tweet).await
    }

    pub async fn record_thread(&self) -> Result<(), MurmurError> {
        self.limiter.record(ActionType::Thread).await
    }

    pub async fn usage(&self) -> Result<Vec<RateLimitState>, MurmurError> {
        self.limiter.usage().await
    }

    async fn check_history(
        &self,
        target_tweet_id: &str,
        proposed_text: Option<&str>,
    ) -> Result<Decision, MurmurError> {
        if self.dedup.has_replied(target_tweet_id).await? {
            let denial = DenialReason::AlreadyReplied {
                id: target_tweet_id.to_string(),
            };
            return Ok(self.deny(target_tweet_id, denial));
        }
        let attempts = self.dedup.failed_attempts(target_tweet_id).await?;
        if attempts >= self.max_reply_attempts {
            let denial = DenialReason::AttemptsExhausted {
                id: target_tweet_id.to_string(),
                attempts,
            };
            return Ok(self.deny(target_tweet_id, denial));
        }
        if let Some(text) = proposed_text
            && self.dedup.is_phrasing_similar(text).await?
        {
            return Ok(self.deny(target_tweet_id, DenialReason::SimilarPhrasing));
        }
        Ok(Ok(()))
    }

    fn deny(&self, target_tweet_id: &str, denial: DenialReason) -> Decision {
        debug!(target = target_tweet_id, reason = denial.kind(), "reply denied: {denial}");
        Err(denial)
    }
}
