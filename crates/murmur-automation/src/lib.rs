// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Automation loops for the Murmur growth agent.
//!
//! [`Automation::start`] spawns one supervised task per loop:
//! - Mentions: replies to new mentions, oldest first
//! - Discovery: searches one keyword per tick, scores, replies to the best
//! - Content: posts an original tweet per posting window
//! - Thread: posts a reply-chain thread per thread interval
//! - Cleanup: prunes history on its own schedule
//!
//! All loops share one store and one [`CancellationToken`]. Each publishes a
//! [`LoopStatus`] over a `watch` channel.

pub mod backoff;
pub mod cleanup;
pub mod content;
pub mod context;
pub mod discovery;
pub mod mentions;
pub mod reply;
pub mod runner;
pub mod shutdown;
pub mod status;
pub mod thread;
pub mod topics;

use std::sync::Arc;
use std::time::Duration;

use murmur_config::model::MurmurConfig;
use murmur_core::{ContentGenerator, MurmurError, PlatformClient};
use murmur_safety::SafetyGuard;
use murmur_scoring::ScoringEngine;
use murmur_storage::Database;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub use backoff::{Backoff, BackoffPolicy};
pub use cleanup::CleanupScheduler;
pub use content::ContentLoop;
pub use context::{ActionDelay, LoopContext};
pub use discovery::DiscoveryLoop;
pub use mentions::MentionsLoop;
pub use reply::ReplyOutcome;
pub use runner::{AutomationLoop, LoopSupervisor, TickReport};
pub use status::{LoopKind, LoopState, LoopStatus};
pub use thread::{ThreadLoop, ThreadOutcome};
pub use topics::TopicRotation;

/// Running set of supervised loops.
pub struct Automation {
    tasks: JoinSet<()>,
    statuses: Vec<watch::Receiver<LoopStatus>>,
    cancel: CancellationToken,
}

impl Automation {
    /// Seed rate limits, build every loop from `config`, and spawn them.
    pub async fn start(
        config: &MurmurConfig,
        db: Database,
        platform: Arc<dyn PlatformClient>,
        generator: Arc<dyn ContentGenerator>,
        cancel: CancellationToken,
    ) -> Result<Self, MurmurError> {
        let guard = SafetyGuard::new(db.clone(), &config.limits);
        guard.limiter().init(&config.limits).await?;

        let ctx = LoopContext {
            db: db.clone(),
            guard,
            platform: platform.clone(),
            generator,
            dry_run: config.agent.dry_run,
            delay: ActionDelay::from_limits(&config.limits),
            cancel: cancel.clone(),
        };
        let policy = BackoffPolicy::from_config(&config.automation);
        let intervals = &config.intervals;
        let topics = || {
            TopicRotation::new(
                config.business.industry_topics.clone(),
                config.automation.recent_topics_window,
            )
        };

        let mut automation = Self {
            tasks: JoinSet::new(),
            statuses: Vec::new(),
            cancel: cancel.clone(),
        };

        automation.supervise(
            MentionsLoop::new(ctx.clone(), secs(intervals.mentions_check_secs)),
            policy,
            &platform,
        );
        let engine = ScoringEngine::from_config(&config.scoring, &config.business);
        if engine.keywords().is_empty() {
            warn!("no product or competitor keywords configured, discovery disabled");
        } else {
            automation.supervise(
                DiscoveryLoop::new(ctx.clone(), engine, secs(intervals.discovery_search_secs)),
                policy,
                &platform,
            );
        }
        automation.supervise(
            ContentLoop::new(
                ctx.clone(),
                topics(),
                secs(intervals.content_post_window_secs),
                secs(intervals.content_check_secs),
            ),
            policy,
            &platform,
        );
        automation.supervise(
            ThreadLoop::new(
                ctx,
                topics(),
                config.automation.thread_tweet_count,
                secs(intervals.thread_interval_secs),
                secs(intervals.content_check_secs),
            ),
            policy,
            &platform,
        );

        let scheduler = CleanupScheduler::new(
            db,
            config.storage.retention_days,
            secs(intervals.cleanup_interval_secs),
        );
        let (tx, rx) = CleanupScheduler::status_channel();
        automation.statuses.push(rx);
        automation.tasks.spawn(scheduler.run(cancel, tx));

        info!(
            loops = automation.statuses.len(),
            dry_run = config.agent.dry_run,
            "automation started"
        );
        Ok(automation)
    }

    fn supervise<L: AutomationLoop>(
        &mut self,
        inner: L,
        policy: BackoffPolicy,
        platform: &Arc<dyn PlatformClient>,
    ) {
        let (supervisor, rx) =
            LoopSupervisor::new(inner, policy, Some(platform.clone()), self.cancel.clone());
        self.statuses.push(rx);
        self.tasks.spawn(supervisor.run());
    }

    /// Latest status of every loop.
    pub fn statuses(&self) -> Vec<LoopStatus> {
        self.statuses.iter().map(|rx| rx.borrow().clone()).collect()
    }

    /// Receivers for live status updates.
    pub fn subscribe(&self) -> Vec<watch::Receiver<LoopStatus>> {
        self.statuses.clone()
    }

    /// Cancel every loop and wait for all of them to stop.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.join().await;
    }

    /// Wait for every loop to stop (after external cancellation).
    pub async fn join(mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "automation task ended abnormally");
            }
        }
        info!("automation stopped");
    }
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}
