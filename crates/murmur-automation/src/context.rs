// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborators shared by every loop, plus the inter-post delay.

use std::sync::Arc;
use std::time::Duration;

use murmur_config::model::LimitsConfig;
use murmur_core::{ContentGenerator, MurmurError, PlatformClient};
use murmur_safety::SafetyGuard;
use murmur_storage::models::ActionLogEntry;
use murmur_storage::queries::action_log;
use murmur_storage::Database;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Gap between chained posts once shutdown has been requested.
const SHUTDOWN_CHAIN_GAP: Duration = Duration::from_secs(2);

/// Random pause between consecutive posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDelay {
    pub min: Duration,
    pub max: Duration,
}

impl ActionDelay {
    pub fn from_limits(limits: &LimitsConfig) -> Self {
        Self {
            min: Duration::from_secs(limits.min_action_delay_secs),
            max: Duration::from_secs(limits.max_action_delay_secs),
        }
    }

    pub fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let millis = rand::thread_rng().gen_range(self.min.as_millis()..=self.max.as_millis());
        Duration::from_millis(millis as u64)
    }

    /// Sleep for a sampled delay. Returns `false` if cancelled first.
    pub async fn pause(&self, cancel: &CancellationToken) -> bool {
        let delay = self.sample();
        if delay.is_zero() {
            return !cancel.is_cancelled();
        }
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    /// Sleep between two posts of a chain that must not be left half done.
    /// Cancellation shortens the wait to a brief gap instead of aborting it.
    pub async fn pause_in_chain(&self, cancel: &CancellationToken) {
        let delay = self.sample();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => tokio::time::sleep(delay.min(SHUTDOWN_CHAIN_GAP)).await,
        }
    }
}

/// Everything a loop needs to do its job.
#[derive(Clone)]
pub struct LoopContext {
    pub db: Database,
    pub guard: SafetyGuard,
    pub platform: Arc<dyn PlatformClient>,
    pub generator: Arc<dyn ContentGenerator>,
    pub dry_run: bool,
    pub delay: ActionDelay,
    pub cancel: CancellationToken,
}

impl LoopContext {
    /// Append to the action log. A failed write is logged, never fatal.
    pub async fn log(&self, entry: ActionLogEntry) {
        if let Err(e) = self.try_log(&entry).await {
            warn!(action = %entry.action_type, error = %e, "failed to write action log");
        }
    }

    async fn try_log(&self, entry: &ActionLogEntry) -> Result<(), MurmurError> {
        action_log::log_action(&self.db, entry).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_stays_in_range() {
        let delay = ActionDelay {
            min: Duration::from_secs(2),
            max: Duration::from_secs(5),
        };
        for _ in 0..100 {
            let d = delay.sample();
            assert!(d >= delay.min && d <= delay.max);
        }
        assert_eq!(ActionDelay::none().sample(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_is_cancellable() {
        let delay = ActionDelay {
            min: Duration::from_secs(600),
            max: Duration::from_secs(600),
        };
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(!delay.pause(&cancel).await);
    }

    #[tokio::test(start_paused = true)]
    async fn chain_pause_is_shortened_not_aborted() {
        let delay = ActionDelay {
            min: Duration::from_secs(600),
            max: Duration::from_secs(600),
        };
        let cancel = CancellationToken::new();
        cancel.cancel();
        let start = tokio::time::Instant::now();
        delay.pause_in_chain(&cancel).await;
        let waited = start.elapsed();
        assert!(waited >= SHUTDOWN_CHAIN_GAP && waited < delay.min);
    }
}
