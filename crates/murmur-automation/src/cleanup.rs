// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled retention cleanup.

use std::sync::Arc;
use std::time::Duration;

use murmur_core::{ActionStatus, MurmurError};
use murmur_storage::models::ActionLogEntry;
use murmur_storage::queries::action_log;
use murmur_storage::{CleanupStats, Database};
use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::status::{LoopKind, LoopState, LoopStatus};

/// Runs the retention pass on a fixed interval. Runs never overlap: a
/// trigger that arrives while one is in progress is skipped.
#[derive(Clone)]
pub struct CleanupScheduler {
    db: Database,
    retention_days: u32,
    interval: Duration,
    running: Arc<Mutex<()>>,
}

impl CleanupScheduler {
    pub fn new(db: Database, retention_days: u32, interval: Duration) -> Self {
        Self {
            db,
            retention_days,
            interval,
            running: Arc::new(Mutex::new(())),
        }
    }

    /// Run one pass now. Returns `Ok(None)` if another pass holds the guard.
    pub async fn run_once(&self) -> Result<Option<CleanupStats>, MurmurError> {
        let Ok(_guard) = self.running.try_lock() else {
            debug!("cleanup already running, skipping trigger");
            return Ok(None);
        };

        let stats = murmur_storage::run_cleanup(&self.db, self.retention_days).await?;
        let entry = ActionLogEntry::new(
            "cleanup",
            ActionStatus::Success,
            format!("removed {} rows", stats.total()),
        )
        .with_metadata(serde_json::to_value(stats).unwrap_or_default());
        if let Err(e) = action_log::log_action(&self.db, &entry).await {
            warn!(error = %e, "failed to write action log");
        }
        Ok(Some(stats))
    }

    /// Run on the configured interval until cancelled. The first pass runs
    /// immediately.
    pub async fn run(self, cancel: CancellationToken, status: watch::Sender<LoopStatus>) {
        info!(
            interval_secs = self.interval.as_secs(),
            retention_days = self.retention_days,
            "cleanup scheduler started"
        );
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }
            match self.run_once().await {
                Ok(stats) => status.send_modify(|s| {
                    s.state = LoopState::Running;
                    s.consecutive_failures = 0;
                    s.ticks += 1;
                    if stats.is_some() {
                        s.last_success_at = Some(chrono::Utc::now());
                    }
                }),
                Err(e) => {
                    warn!(error = %e, "cleanup failed");
                    let message = e.to_string();
                    status.send_modify(|s| {
                        s.consecutive_failures = s.consecutive_failures.saturating_add(1);
                        s.last_error = Some(message);
                        s.ticks += 1;
                    });
                }
            }
        }

        status.send_modify(|s| s.state = LoopState::Cancelled);
        info!("cleanup scheduler stopped");
    }

    /// Status channel seeded for this scheduler.
    pub fn status_channel() -> (watch::Sender<LoopStatus>, watch::Receiver<LoopStatus>) {
        watch::channel(LoopStatus::new(LoopKind::Cleanup))
    }
}
