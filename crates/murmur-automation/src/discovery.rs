// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword search, scoring, and replies to the candidates worth it.
//!
//! One keyword per tick, rotating through the merged keyword list.

use std::time::Duration;

use async_trait::async_trait;
use murmur_core::{ActionStatus, ActionType, MurmurError};
use murmur_scoring::ScoringEngine;
use murmur_storage::models::{ActionLogEntry, DiscoveredCandidate};
use murmur_storage::queries::candidates;
use serde_json::json;
use tracing::{debug, info};

use crate::context::LoopContext;
use crate::reply::{reply_to, ReplyOutcome};
use crate::runner::{AutomationLoop, TickReport};
use crate::status::LoopKind;

pub struct DiscoveryLoop {
    ctx: LoopContext,
    engine: ScoringEngine,
    interval: Duration,
    next_keyword: usize,
}

impl DiscoveryLoop {
    pub fn new(ctx: LoopContext, engine: ScoringEngine, interval: Duration) -> Self {
        Self {
            ctx,
            engine,
            interval,
            next_keyword: 0,
        }
    }

    fn take_keyword(&mut self) -> Option<String> {
        let keywords = self.engine.keywords();
        if keywords.is_empty() {
            return None;
        }
        let keyword = keywords[self.next_keyword % keywords.len()].clone();
        self.next_keyword = (self.next_keyword + 1) % keywords.len();
        Some(keyword)
    }
}

#[async_trait]
impl AutomationLoop for DiscoveryLoop {
    fn kind(&self) -> LoopKind {
        LoopKind::Discovery
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn tick(&mut self) -> Result<TickReport, MurmurError> {
        let mut report = TickReport::default();

        if self.engine.keywords().is_empty() {
            debug!("no keywords configured, discovery idle");
            return Ok(report);
        }
        if let Err(denial) = self.ctx.guard.acquire(ActionType::Search).await? {
            debug!(reason = %denial, "search skipped");
            return Ok(report);
        }
        let Some(keyword) = self.take_keyword() else {
            return Ok(report);
        };

        let results = self.ctx.platform.search(&keyword).await?;
        info!(keyword = %keyword, results = results.len(), "search complete");
        self.ctx
            .log(
                ActionLogEntry::new(
                    ActionType::Search.to_string(),
                    ActionStatus::Success,
                    format!("searched '{keyword}'"),
                )
                .with_metadata(json!({ "keyword": keyword, "results": results.len() })),
            )
            .await;

        for tweet in &results {
            if self.ctx.cancel.is_cancelled() {
                break;
            }

            let score = self.engine.score(tweet, &tweet.author);
            let matched = self
                .engine
                .matched_keyword(&tweet.text)
                .or_else(|| Some(keyword.clone()));
            candidates::insert_candidate(
                &self.ctx.db,
                &DiscoveredCandidate::from_tweet(tweet, f64::from(score.total), matched),
            )
            .await?;

            if !score.meets_threshold {
                debug!(tweet = %tweet.id, score = %score, "below threshold");
                report.skipped += 1;
                continue;
            }

            let outcome =
                reply_to(&self.ctx, tweet, LoopKind::Discovery, Some(score.total)).await?;
            match outcome {
                ReplyOutcome::Sent { .. } => {
                    candidates::mark_candidate_replied(&self.ctx.db, &tweet.id).await?;
                    report.acted += 1;
                    if !self.ctx.delay.pause(&self.ctx.cancel).await {
                        break;
                    }
                }
                ReplyOutcome::DryRun => {
                    candidates::mark_candidate_replied(&self.ctx.db, &tweet.id).await?;
                    report.acted += 1;
                }
                ReplyOutcome::Denied(ref denial) => {
                    report.skipped += 1;
                    if outcome.is_rate_limited() {
                        debug!(reason = %denial, "reply budget spent, ending discovery tick");
                        break;
                    }
                }
                ReplyOutcome::GenerationFailed | ReplyOutcome::Rejected { .. } => {
                    report.failed += 1
                }
            }
        }

        Ok(report)
    }
}
