// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rate limiting over the persisted per-action counters.
//!
//! `check` plus `record` suits action types only one loop uses (tweet,
//! thread). Contended ones go through `acquire`, which checks and counts in a
//! single transaction.

use chrono::{DateTime, Utc};
use murmur_config::model::LimitsConfig;
use murmur_core::{ActionType, MurmurError};
use murmur_storage::models::RateLimitState;
use murmur_storage::queries::rate_limits::{self, AcquireOutcome};
use murmur_storage::Database;
use tracing::debug;

use crate::denial::{Decision, DenialReason};

#[derive(Clone)]
pub struct RateLimiter {
    db: Database,
}

impl RateLimiter {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Seed counters for every action type that has none yet.
    pub async fn init(&self, limits: &LimitsConfig) -> Result<(), MurmurError> {
        rate_limits::init_rate_limits(&self.db, limits).await
    }

    /// Whether one more `action` fits in the current period. Does not count it.
    pub async fn check(&self, action: ActionType) -> Result<Decision, MurmurError> {
        self.check_at(action, Utc::now()).await
    }

    pub async fn check_at(
        &self,
        action: ActionType,
        now: DateTime<Utc>,
    ) -> Result<Decision, MurmurError> {
        let decision = match rate_limits::check_at(&self.db, action, now).await? {
            None => Ok(()),
            Some(state) if state.has_capacity() => Ok(()),
            Some(state) => Err(DenialReason::RateLimited {
                action,
                current: state.request_count,
                max: state.max_requests,
            }),
        };
        Ok(decision)
    }

    /// Count one completed `action`.
    pub async fn record(&self, action: ActionType) -> Result<(), MurmurError> {
        rate_limits::increment(&self.db, action).await
    }

    pub async fn record_at(&self, action: ActionType, now: DateTime<Utc>) -> Result<(), MurmurError> {
        rate_limits::increment_at(&self.db, action, now).await
    }

    /// Check and count in one step.
    pub async fn acquire(&self, action: ActionType) -> Result<Decision, MurmurError> {
        self.acquire_at(action, Utc::now()).await
    }

    pub async fn acquire_at(
        &self,
        action: ActionType,
        now: DateTime<Utc>,
    ) -> Result<Decision, MurmurError> {
        match rate_limits::acquire_at(&self.db, action, now).await? {
            AcquireOutcome::Unlimited => Ok(Ok(())),
            AcquireOutcome::Granted { count, max } => {
                debug!(action = %action, count, max, "rate limit acquired");
                Ok(Ok(()))
            }
            AcquireOutcome::Exhausted { count, max } => Ok(Err(DenialReason::RateLimited {
                action,
                current: count,
                max,
            })),
        }
    }

    /// Snapshot of every counter.
    pub async fn usage(&self) -> Result<Vec<RateLimitState>, MurmurError> {
        rate_limits::usage(&self.db).await
    }
}
