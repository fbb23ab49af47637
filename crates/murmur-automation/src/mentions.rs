// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replies to new mentions, oldest first, resuming from a persisted cursor.

use std::time::Duration;

use async_trait::async_trait;
use murmur_core::{ActionType, MurmurError, TweetCandidate};
use murmur_storage::queries::cursors::{self, MENTIONS_SINCE_ID};
use tracing::{debug, info};

use crate::context::LoopContext;
use crate::reply::{reply_to, ReplyOutcome};
use crate::runner::{AutomationLoop, TickReport};
use crate::status::LoopKind;

pub struct MentionsLoop {
    ctx: LoopContext,
    interval: Duration,
}

impl MentionsLoop {
    pub fn new(ctx: LoopContext, interval: Duration) -> Self {
        Self { ctx, interval }
    }
}

/// Tweet ids are decimal strings; shorter means older.
pub(crate) fn id_order(tweet: &TweetCandidate) -> (usize, &str) {
    (tweet.id.len(), tweet.id.as_str())
}

#[async_trait]
impl AutomationLoop for MentionsLoop {
    fn kind(&self) -> LoopKind {
        LoopKind::Mentions
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn tick(&mut self) -> Result<TickReport, MurmurError> {
        let mut report = TickReport::default();

        if let Err(denial) = self.ctx.guard.acquire(ActionType::MentionCheck).await? {
            debug!(reason = %denial, "mention check skipped");
            return Ok(report);
        }

        let since = cursors::get_cursor(&self.ctx.db, MENTIONS_SINCE_ID).await?;
        let mut mentions = self.ctx.platform.mentions_since(since.as_deref()).await?;
        if mentions.is_empty() {
            debug!("no new mentions");
            return Ok(report);
        }
        mentions.sort_by(|a, b| id_order(a).cmp(&id_order(b)));
        info!(count = mentions.len(), "processing mentions");

        let total = mentions.len();
        for (i, mention) in mentions.iter().enumerate() {
            if self.ctx.cancel.is_cancelled() {
                break;
            }

            let outcome = reply_to(&self.ctx, mention, LoopKind::Mentions, None).await?;
            if outcome.is_rate_limited() {
                // Leave the cursor here so the rest are picked up once the limit resets.
                report.skipped += 1;
                break;
            }
            cursors::set_cursor(&self.ctx.db, MENTIONS_SINCE_ID, &mention.id).await?;

            match outcome {
                ReplyOutcome::Sent { .. } => {
                    report.acted += 1;
                    if i + 1 < total && !self.ctx.delay.pause(&self.ctx.cancel).await {
                        break;
                    }
                }
                ReplyOutcome::DryRun => report.acted += 1,
                ReplyOutcome::Denied(_) => report.skipped += 1,
                ReplyOutcome::GenerationFailed | ReplyOutcome::Rejected { .. } => {
                    report.failed += 1
                }
            }
        }

        Ok(report)
    }
}
