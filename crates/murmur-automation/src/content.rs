// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Original tweets on industry topics, at most one per posting window.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use murmur_core::{ActionStatus, ActionType, GenerationError, MurmurError};
use murmur_storage::models::{ActionLogEntry, OriginalTweetRecord, RecordStatus};
use murmur_storage::queries::content;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::context::LoopContext;
use crate::runner::{AutomationLoop, TickReport};
use crate::status::LoopKind;
use crate::topics::TopicRotation;

pub struct ContentLoop {
    ctx: LoopContext,
    topics: TopicRotation,
    /// Minimum spacing between original tweets.
    post_window: Duration,
    interval: Duration,
}

impl ContentLoop {
    pub fn new(
        ctx: LoopContext,
        topics: TopicRotation,
        post_window: Duration,
        interval: Duration,
    ) -> Self {
        Self {
            ctx,
            topics,
            post_window,
            interval,
        }
    }

    async fn due(&self) -> Result<bool, MurmurError> {
        let Some(last) = content::last_original_tweet_at(&self.ctx.db).await? else {
            return Ok(true);
        };
        let elapsed = Utc::now().signed_duration_since(last).num_seconds();
        Ok(elapsed >= self.post_window.as_secs() as i64)
    }

    fn log_entry(status: ActionStatus, message: String, metadata: serde_json::Value) -> ActionLogEntry {
        ActionLogEntry::new(ActionType::Tweet.to_string(), status, message).with_metadata(metadata)
    }

    async fn generation_failed(&self, topic: &str, error: GenerationError) -> MurmurError {
        warn!(topic, error = %error, "tweet generation failed");
        self.ctx
            .log(Self::log_entry(
                ActionStatus::Failure,
                format!("tweet generation failed for '{topic}': {error}"),
                json!({ "topic": topic, "error": error.to_string() }),
            ))
            .await;
        error.into()
    }
}

#[async_trait]
impl AutomationLoop for ContentLoop {
    fn kind(&self) -> LoopKind {
        LoopKind::Content
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn tick(&mut self) -> Result<TickReport, MurmurError> {
        let mut report = TickReport::default();

        if self.topics.is_empty() {
            debug!("no industry topics configured, content loop idle");
            return Ok(report);
        }
        if !self.due().await? {
            debug!("last original tweet is within the posting window");
            return Ok(report);
        }
        if let Err(denial) = self.ctx.guard.can_post_tweet().await? {
            self.ctx
                .log(Self::log_entry(
                    ActionStatus::Skipped,
                    denial.to_string(),
                    json!({ "reason": denial.kind() }),
                ))
                .await;
            report.skipped += 1;
            return Ok(report);
        }
        let Some(topic) = self.topics.pick() else {
            return Ok(report);
        };

        let text = match self.ctx.generator.generate_tweet(&topic).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                let error = GenerationError::Unparseable("empty tweet".into());
                return Err(self.generation_failed(&topic, error).await);
            }
            Err(e) => return Err(self.generation_failed(&topic, e).await),
        };

        if self.ctx.dry_run {
            content::insert_original_tweet(
                &self.ctx.db,
                &OriginalTweetRecord::new(&text, Some(&topic), RecordStatus::DryRun),
            )
            .await?;
            info!(topic = %topic, "dry run: would post tweet: {text}");
            self.ctx
                .log(Self::log_entry(
                    ActionStatus::DryRun,
                    format!("would post tweet on '{topic}'"),
                    json!({ "topic": topic, "content": text }),
                ))
                .await;
            self.topics.remember(&topic);
            report.acted += 1;
            return Ok(report);
        }

        match self.ctx.platform.post(&text).await {
            Ok(tweet_id) => {
                let mut record = OriginalTweetRecord::new(&text, Some(&topic), RecordStatus::Sent);
                record.tweet_id = Some(tweet_id.clone());
                content::insert_original_tweet(&self.ctx.db, &record).await?;
                self.ctx.guard.record_tweet().await?;
                info!(topic = %topic, tweet_id = %tweet_id, "original tweet posted");
                self.ctx
                    .log(Self::log_entry(
                        ActionStatus::Success,
                        format!("posted tweet on '{topic}'"),
                        json!({ "topic": topic, "tweet_id": tweet_id }),
                    ))
                    .await;
                self.topics.remember(&topic);
                report.acted += 1;
                Ok(report)
            }
            Err(e) => {
                let mut record = OriginalTweetRecord::new(&text, Some(&topic), RecordStatus::Failed);
                record.error_message = Some(e.to_string());
                content::insert_original_tweet(&self.ctx.db, &record).await?;
                self.ctx
                    .log(Self::log_entry(
                        ActionStatus::Failure,
                        format!("tweet on '{topic}' failed: {e}"),
                        json!({ "topic": topic, "error": e.to_string() }),
                    ))
                    .await;
                Err(e.into())
            }
        }
    }
}
