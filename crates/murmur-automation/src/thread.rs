// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-tweet threads, posted as a reply chain.
//!
//! A chain that breaks part-way is recorded with the exact number of tweets
//! that went out and is never resumed.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use murmur_core::{ActionStatus, ActionType, GenerationError, MurmurError, PlatformError};
use murmur_storage::models::{ActionLogEntry, RecordStatus, ThreadRecord, ThreadTweetRecord};
use murmur_storage::queries::content;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::context::LoopContext;
use crate::runner::{AutomationLoop, TickReport};
use crate::status::LoopKind;
use crate::topics::TopicRotation;

/// Result of posting a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadOutcome {
    /// Every tweet was posted.
    Sent(usize),
    /// The chain broke after `sent` of `total` tweets.
    Partial {
        sent: usize,
        total: usize,
        error: String,
    },
}

impl ThreadOutcome {
    pub fn sent(&self) -> usize {
        match self {
            Self::Sent(n) => *n,
            Self::Partial { sent, .. } => *sent,
        }
    }
}

/// Tweets that made it out, in position order.
#[derive(Debug, Default)]
pub struct PostedChain {
    pub tweets: Vec<ThreadTweetRecord>,
}

impl PostedChain {
    pub fn root_id(&self) -> Option<&str> {
        self.tweets.first().and_then(|t| t.tweet_id.as_deref())
    }
}

/// Post `tweets` as a chain: the first as a standalone tweet, each later one
/// as a reply to its predecessor. A failed first post is an error; any later
/// failure yields a partial outcome. Once the first tweet is out the chain
/// runs to the end even if shutdown is requested.
pub async fn post_chain(
    ctx: &LoopContext,
    tweets: &[String],
) -> Result<(ThreadOutcome, PostedChain), PlatformError> {
    let total = tweets.len();
    let mut chain = PostedChain::default();
    let Some((first, rest)) = tweets.split_first() else {
        return Ok((ThreadOutcome::Sent(0), chain));
    };

    let mut parent = ctx.platform.post(first).await?;
    chain.tweets.push(ThreadTweetRecord {
        position: 0,
        tweet_id: Some(parent.clone()),
        content: first.clone(),
    });

    for (i, text) in rest.iter().enumerate() {
        let sent = chain.tweets.len();
        ctx.delay.pause_in_chain(&ctx.cancel).await;
        match ctx.platform.reply(&parent, text).await {
            Ok(id) => {
                chain.tweets.push(ThreadTweetRecord {
                    position: (i + 1) as u32,
                    tweet_id: Some(id.clone()),
                    content: text.clone(),
                });
                parent = id;
            }
            Err(e) => {
                warn!(sent, total, error = %e, "thread chain broke");
                let outcome = ThreadOutcome::Partial {
                    sent,
                    total,
                    error: e.to_string(),
                };
                return Ok((outcome, chain));
            }
        }
    }

    Ok((ThreadOutcome::Sent(total), chain))
}

pub struct ThreadLoop {
    ctx: LoopContext,
    topics: TopicRotation,
    tweet_count: usize,
    /// Minimum spacing between threads.
    thread_interval: Duration,
    interval: Duration,
}

impl ThreadLoop {
    pub fn new(
        ctx: LoopContext,
        topics: TopicRotation,
        tweet_count: usize,
        thread_interval: Duration,
        interval: Duration,
    ) -> Self {
        Self {
            ctx,
            topics,
            tweet_count,
            thread_interval,
            interval,
        }
    }

    async fn due(&self) -> Result<bool, MurmurError> {
        let Some(last) = content::last_thread_at(&self.ctx.db).await? else {
            return Ok(true);
        };
        let elapsed = Utc::now().signed_duration_since(last).num_seconds();
        Ok(elapsed >= self.thread_interval.as_secs() as i64)
    }

    async fn log(&self, status: ActionStatus, message: String, metadata: serde_json::Value) {
        let entry = ActionLogEntry::new(ActionType::Thread.to_string(), status, message)
            .with_metadata(metadata);
        self.ctx.log(entry).await;
    }

    async fn generate(&self, topic: &str) -> Result<Vec<String>, MurmurError> {
        let result = self
            .ctx
            .generator
            .generate_thread(topic, self.tweet_count)
            .await
            .map(|tweets| {
                tweets
                    .into_iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
            })
            .and_then(|tweets| {
                if tweets.is_empty() {
                    Err(GenerationError::Unparseable("empty thread".into()))
                } else {
                    Ok(tweets)
                }
            });

        match result {
            Ok(tweets) => Ok(tweets),
            Err(e) => {
                warn!(topic, error = %e, "thread generation failed");
                self.log(
                    ActionStatus::Failure,
                    format!("thread generation failed for '{topic}': {e}"),
                    json!({ "topic": topic, "error": e.to_string() }),
                )
                .await;
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl AutomationLoop for ThreadLoop {
    fn kind(&self) -> LoopKind {
        LoopKind::Thread
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn tick(&mut self) -> Result<TickReport, MurmurError> {
        let mut report = TickReport::default();

        if self.topics.is_empty() {
            debug!("no industry topics configured, thread loop idle");
            return Ok(report);
        }
        if !self.due().await? {
            debug!("last thread is within the thread interval");
            return Ok(report);
        }
        if let Err(denial) = self.ctx.guard.can_post_thread().await? {
            self.log(
                ActionStatus::Skipped,
                denial.to_string(),
                json!({ "reason": denial.kind() }),
            )
            .await;
            report.skipped += 1;
            return Ok(report);
        }
        let Some(topic) = self.topics.pick() else {
            return Ok(report);
        };

        let tweets = self.generate(&topic).await?;
        let planned = tweets.len() as u32;

        if self.ctx.dry_run {
            let mut record = ThreadRecord::new(&topic, planned, RecordStatus::DryRun);
            record.tweet_count = planned;
            let children: Vec<_> = tweets
                .iter()
                .enumerate()
                .map(|(i, text)| ThreadTweetRecord {
                    position: i as u32,
                    tweet_id: None,
                    content: text.clone(),
                })
                .collect();
            content::insert_thread(&self.ctx.db, &record, &children).await?;
            info!(topic = %topic, tweets = planned, "dry run: would post thread");
            self.log(
                ActionStatus::DryRun,
                format!("would post {planned}-tweet thread on '{topic}'"),
                json!({ "topic": topic, "tweets": tweets }),
            )
            .await;
            self.topics.remember(&topic);
            report.acted += 1;
            return Ok(report);
        }

        let (outcome, chain) = match post_chain(&self.ctx, &tweets).await {
            Ok(posted) => posted,
            Err(e) => {
                let mut record = ThreadRecord::new(&topic, planned, RecordStatus::Failed);
                record.error_message = Some(e.to_string());
                content::insert_thread(&self.ctx.db, &record, &[]).await?;
                self.log(
                    ActionStatus::Failure,
                    format!("thread on '{topic}' failed: {e}"),
                    json!({ "topic": topic, "error": e.to_string() }),
                )
                .await;
                return Err(e.into());
            }
        };

        let (status, action_status, error) = match &outcome {
            ThreadOutcome::Sent(_) => (RecordStatus::Sent, ActionStatus::Success, None),
            ThreadOutcome::Partial { error, .. } => {
                (RecordStatus::Partial, ActionStatus::Partial, Some(error.clone()))
            }
        };
        let mut record = ThreadRecord::new(&topic, planned, status);
        record.tweet_count = outcome.sent() as u32;
        record.root_tweet_id = chain.root_id().map(str::to_string);
        record.error_message = error.clone();
        let thread_id = content::insert_thread(&self.ctx.db, &record, &chain.tweets).await?;

        // Something went out, so the thread counts against the limit.
        self.ctx.guard.record_thread().await?;
        self.topics.remember(&topic);

        match &outcome {
            ThreadOutcome::Sent(n) => {
                info!(topic = %topic, thread_id, tweets = n, "thread posted");
                self.log(
                    action_status,
                    format!("posted {n}-tweet thread on '{topic}'"),
                    json!({ "topic": topic, "thread_id": thread_id, "root": record.root_tweet_id }),
                )
                .await;
                report.acted += 1;
            }
            ThreadOutcome::Partial { sent, total, .. } => {
                warn!(topic = %topic, thread_id, sent, total, "thread posted partially");
                self.log(
                    action_status,
                    format!("posted {sent} of {total} thread tweets on '{topic}'"),
                    json!({
                        "topic": topic,
                        "thread_id": thread_id,
                        "sent": sent,
                        "total": total,
                        "error": error,
                    }),
                )
                .await;
                report.acted += 1;
                report.failed += 1;
            }
        }
        Ok(report)
    }
}
