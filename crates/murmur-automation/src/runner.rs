// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loop supervision: tick, classify the result, wait, repeat.
//!
//! The supervisor owns the failure counter and backoff state for one loop
//! and publishes them as a [`LoopStatus`]. Cancellation is observed before
//! every tick and during every wait, never inside a tick.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use murmur_core::{MurmurError, PlatformClient};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backoff::{Backoff, BackoffPolicy};
use crate::status::{LoopKind, LoopState, LoopStatus};

/// What one tick did, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Actions performed (or dry-run simulated).
    pub acted: u32,
    /// Candidates dropped by scoring or denied by the guard.
    pub skipped: u32,
    /// Per-candidate failures that did not abort the tick.
    pub failed: u32,
}

/// A unit of periodic work the supervisor drives.
#[async_trait]
pub trait AutomationLoop: Send + Sync + 'static {
    fn kind(&self) -> LoopKind;

    /// Wait between successful ticks.
    fn interval(&self) -> Duration;

    async fn tick(&mut self) -> Result<TickReport, MurmurError>;
}

pub struct LoopSupervisor<L> {
    inner: L,
    policy: BackoffPolicy,
    platform: Option<Arc<dyn PlatformClient>>,
    cancel: CancellationToken,
    status: watch::Sender<LoopStatus>,
}

impl<L: AutomationLoop> LoopSupervisor<L> {
    /// `platform` is used for the single auth refresh on expiry; loops that
    /// never talk to the platform pass `None`.
    pub fn new(
        inner: L,
        policy: BackoffPolicy,
        platform: Option<Arc<dyn PlatformClient>>,
        cancel: CancellationToken,
    ) -> (Self, watch::Receiver<LoopStatus>) {
        let (status, rx) = watch::channel(LoopStatus::new(inner.kind()));
        (
            Self {
                inner,
                policy,
                platform,
                cancel,
                status,
            },
            rx,
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<LoopStatus> {
        self.status.subscribe()
    }

    /// Run until cancelled.
    pub async fn run(mut self) {
        let kind = self.inner.kind();
        info!(loop_kind = %kind, "automation loop started");

        while !self.cancel.is_cancelled() {
            let result = self.inner.tick().await;
            let wait = self.settle(result).await;
            if !self.wait(wait).await {
                break;
            }
        }

        self.status.send_modify(|s| {
            s.state = LoopState::Cancelled;
            s.backoff = None;
        });
        info!(loop_kind = %kind, "automation loop stopped");
    }

    /// Update status from a tick result and return how long to wait.
    async fn settle(&mut self, result: Result<TickReport, MurmurError>) -> Duration {
        let kind = self.inner.kind();
        let interval = self.inner.interval();

        let error = match result {
            Ok(report) => {
                self.status.send_modify(|s| {
                    s.state = LoopState::Running;
                    s.consecutive_failures = 0;
                    s.backoff = None;
                    s.last_success_at = Some(Utc::now());
                    s.ticks += 1;
                });
                debug!(
                    loop_kind = %kind,
                    acted = report.acted,
                    skipped = report.skipped,
                    failed = report.failed,
                    "tick complete"
                );
                return interval;
            }
            Err(e) => e,
        };

        let failures = self.status.borrow().consecutive_failures.saturating_add(1);
        warn!(loop_kind = %kind, failures, error = %error, "tick failed");

        let backoff = if error.is_auth_expired() {
            self.refresh_auth(kind, failures).await
        } else {
            self.policy.after_failure(failures, &error)
        };

        let (state, wait, shown) = match backoff {
            Backoff::None => (LoopState::Running, interval, None),
            Backoff::Transient(d) => (LoopState::BackingOff, d, Some(d)),
            Backoff::Extended(d) => {
                warn!(
                    loop_kind = %kind,
                    failures,
                    pause_secs = d.as_secs(),
                    "entering extended backoff"
                );
                (LoopState::BackingOff, d, Some(d))
            }
        };

        let message = error.to_string();
        self.status.send_modify(|s| {
            s.state = state;
            s.consecutive_failures = failures;
            s.last_error = Some(message);
            s.backoff = shown;
            s.ticks += 1;
        });
        wait
    }

    async fn refresh_auth(&self, kind: LoopKind, failures: u32) -> Backoff {
        let Some(platform) = &self.platform else {
            return Backoff::Extended(self.policy.extended);
        };
        match platform.refresh_auth().await {
            Ok(()) => {
                info!(loop_kind = %kind, "platform credentials refreshed");
                if failures >= self.policy.max_consecutive_failures {
                    Backoff::Extended(self.policy.extended)
                } else {
                    Backoff::None
                }
            }
            Err(e) => {
                warn!(loop_kind = %kind, error = %e, "credential refresh failed");
                Backoff::Extended(self.policy.extended)
            }
        }
    }

    /// Sleep unless cancelled. Returns `false` on cancellation.
    async fn wait(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}
