// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reply path shared by the mentions and discovery loops.

use murmur_core::{ActionStatus, ActionType, MurmurError, TweetCandidate};
use murmur_safety::DenialReason;
use murmur_storage::models::{ActionLogEntry, RecordStatus, ReplyRecord};
use murmur_storage::queries::replies;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::context::LoopContext;
use crate::status::LoopKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Sent { reply_id: String },
    DryRun,
    Denied(DenialReason),
    /// The generator failed or produced nothing usable. Not retried this tick.
    GenerationFailed,
    /// The platform refused this reply. Recorded as failed; the caller moves on.
    Rejected { error: String },
}

impl ReplyOutcome {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Denied(DenialReason::RateLimited { .. }))
    }
}

fn entry(status: ActionStatus, message: String, metadata: serde_json::Value) -> ActionLogEntry {
    ActionLogEntry::new(ActionType::Reply.to_string(), status, message).with_metadata(metadata)
}

/// Gate, generate, post, and record one reply.
///
/// A transient or auth platform failure while posting is returned as an
/// error so the supervisor can back off. Every other outcome, including a
/// rejected post, is recorded and reported as a [`ReplyOutcome`]. Each failed
/// post counts toward the target's attempt cap in the guard.
pub async fn reply_to(
    ctx: &LoopContext,
    tweet: &TweetCandidate,
    origin: LoopKind,
    score: Option<f32>,
) -> Result<ReplyOutcome, MurmurError> {
    let meta = |extra: serde_json::Value| {
        let mut base = json!({
            "loop": origin.to_string(),
            "target": tweet.id,
            "author": tweet.author.username,
            "score": score,
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        base
    };

    // Cheap gate before spending a generation call.
    if let Err(denial) = ctx.guard.can_reply(&tweet.id, None).await? {
        return Ok(deny(ctx, tweet, denial, meta(json!({}))).await);
    }

    let text = match ctx.generator.generate_reply(tweet, &tweet.author).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            warn!(target = %tweet.id, "generator returned an empty reply");
            ctx.log(entry(
                ActionStatus::Failure,
                format!("empty reply generated for {}", tweet.id),
                meta(json!({})),
            ))
            .await;
            return Ok(ReplyOutcome::GenerationFailed);
        }
        Err(e) => {
            warn!(target = %tweet.id, error = %e, "reply generation failed");
            ctx.log(entry(
                ActionStatus::Failure,
                format!("reply generation failed for {}: {e}", tweet.id),
                meta(json!({ "error": e.to_string() })),
            ))
            .await;
            return Ok(ReplyOutcome::GenerationFailed);
        }
    };

    if ctx.dry_run {
        if let Err(denial) = ctx.guard.can_reply(&tweet.id, Some(&text)).await? {
            return Ok(deny(ctx, tweet, denial, meta(json!({}))).await);
        }
        replies::insert_reply(&ctx.db, &ReplyRecord::new(&tweet.id, &text, RecordStatus::DryRun))
            .await?;
        info!(target = %tweet.id, author = %tweet.author.username, "dry run: would reply: {text}");
        ctx.log(entry(
            ActionStatus::DryRun,
            format!("would reply to @{}", tweet.author.username),
            meta(json!({ "content": text })),
        ))
        .await;
        return Ok(ReplyOutcome::DryRun);
    }

    if let Err(denial) = ctx.guard.reserve_reply(&tweet.id, &text).await? {
        return Ok(deny(ctx, tweet, denial, meta(json!({}))).await);
    }

    match ctx.platform.reply(&tweet.id, &text).await {
        Ok(reply_id) => {
            let record = ReplyRecord::new(&tweet.id, &text, RecordStatus::Sent).with_reply_id(&reply_id);
            replies::insert_reply(&ctx.db, &record).await?;
            info!(target = %tweet.id, reply_id = %reply_id, author = %tweet.author.username, "reply sent");
            ctx.log(entry(
                ActionStatus::Success,
                format!("replied to @{}", tweet.author.username),
                meta(json!({ "reply_id": reply_id })),
            ))
            .await;
            Ok(ReplyOutcome::Sent { reply_id })
        }
        Err(e) => {
            let record = ReplyRecord::new(&tweet.id, &text, RecordStatus::Failed).with_error(e.to_string());
            replies::insert_reply(&ctx.db, &record).await?;
            ctx.log(entry(
                ActionStatus::Failure,
                format!("reply to {} failed: {e}", tweet.id),
                meta(json!({ "error": e.to_string() })),
            ))
            .await;
            if e.is_rejected() {
                warn!(target = %tweet.id, error = %e, "reply rejected by platform");
                return Ok(ReplyOutcome::Rejected {
                    error: e.to_string(),
                });
            }
            Err(e.into())
        }
    }
}

async fn deny(
    ctx: &LoopContext,
    tweet: &TweetCandidate,
    denial: DenialReason,
    metadata: serde_json::Value,
) -> ReplyOutcome {
    debug!(target = %tweet.id, reason = denial.kind(), "reply skipped");
    let mut metadata = metadata;
    if let Some(map) = metadata.as_object_mut() {
        map.insert("reason".to_string(), json!(denial.kind()));
    }
    ctx.log(entry(ActionStatus::Skipped, denial.to_string(), metadata)).await;
    ReplyOutcome::Denied(denial)
}
