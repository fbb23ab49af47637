// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted per-action counters with period-based reset.
//!
//! Every read path applies a pending period reset before returning, so callers
//! never see a stale count. `acquire_at` performs read, reset and increment
//! inside one `BEGIN IMMEDIATE` transaction.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use murmur_config::model::LimitsConfig;
use murmur_core::{ActionType, MurmurError};
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use crate::database::Database;
use crate::models::{format_timestamp, parse_timestamp, RateLimitState};

/// Result of an atomic check-and-increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// No row exists for the action type; nothing is limited.
    Unlimited,
    /// The counter was incremented to `count`.
    Granted { count: u32, max: u32 },
    /// The period's budget is spent; nothing changed.
    Exhausted { count: u32, max: u32 },
}

impl AcquireOutcome {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Exhausted { .. })
    }
}

/// Default `(max_requests, period_seconds)` for each action type.
pub fn seed_values(limits: &LimitsConfig) -> [(ActionType, u32, u64); 5] {
    [
        (ActionType::Reply, limits.max_replies_per_day, 86_400),
        (ActionType::Tweet, limits.max_tweets_per_day, 86_400),
        (ActionType::Thread, limits.max_threads_per_week, 604_800),
        (
            ActionType::Search,
            limits.max_searches_per_window,
            limits.search_window_secs,
        ),
        (
            ActionType::MentionCheck,
            limits.max_mention_checks_per_window,
            limits.mention_check_window_secs,
        ),
    ]
}

/// Insert a row for every action type that does not have one yet.
///
/// Existing rows keep their counters and limits.
pub async fn init_rate_limits(db: &Database, limits: &LimitsConfig) -> Result<(), MurmurError> {
    init_rate_limits_at(db, limits, Utc::now()).await
}

pub async fn init_rate_limits_at(
    db: &Database,
    limits: &LimitsConfig,
    now: DateTime<Utc>,
) -> Result<(), MurmurError> {
    let seeds = seed_values(limits);
    let period_start = format_timestamp(now);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            for (action, max_requests, period_seconds) in seeds {
                tx.execute(
                    "INSERT OR IGNORE INTO rate_limits
                     (action_type, request_count, period_start, max_requests, period_seconds)
                     VALUES (?1, 0, ?2, ?3, ?4)",
                    params![action.to_string(), period_start, max_requests, period_seconds as i64],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Load the row for `action`, resetting it first if its period has elapsed.
/// `None` means the action type is unlimited.
pub async fn check(db: &Database, action: ActionType) -> Result<Option<RateLimitState>, MurmurError> {
    check_at(db, action, Utc::now()).await
}

pub async fn check_at(
    db: &Database,
    action: ActionType,
    now: DateTime<Utc>,
) -> Result<Option<RateLimitState>, MurmurError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let state = load_fresh(&tx, action, now)?;
            tx.commit()?;
            Ok(state)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count one use of `action`. Applies a pending reset first and never pushes
/// the counter past its maximum.
pub async fn increment(db: &Database, action: ActionType) -> Result<(), MurmurError> {
    increment_at(db, action, Utc::now()).await
}

pub async fn increment_at(
    db: &Database,
    action: ActionType,
    now: DateTime<Utc>,
) -> Result<(), MurmurError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            if load_fresh(&tx, action, now)?.is_some() {
                tx.execute(
                    "UPDATE rate_limits
                     SET request_count = MIN(request_count + 1, max_requests)
                     WHERE action_type = ?1",
                    params![action.to_string()],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Atomically check capacity and take one unit of it.
pub async fn acquire(db: &Database, action: ActionType) -> Result<AcquireOutcome, MurmurError> {
    acquire_at(db, action, Utc::now()).await
}

pub async fn acquire_at(
    db: &Database,
    action: ActionType,
    now: DateTime<Utc>,
) -> Result<AcquireOutcome, MurmurError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let outcome = match load_fresh(&tx, action, now)? {
                None => AcquireOutcome::Unlimited,
                Some(state) if !state.has_capacity() => AcquireOutcome::Exhausted {
                    count: state.request_count,
                    max: state.max_requests,
                },
                Some(state) => {
                    tx.execute(
                        "UPDATE rate_limits SET request_count = request_count + 1
                         WHERE action_type = ?1",
                        params![action.to_string()],
                    )?;
                    AcquireOutcome::Granted {
                        count: state.request_count + 1,
                        max: state.max_requests,
                    }
                }
            };
            tx.commit()?;
            Ok(outcome)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Every counter, with pending resets applied, ordered by action type.
pub async fn usage(db: &Database) -> Result<Vec<RateLimitState>, MurmurError> {
    usage_at(db, Utc::now()).await
}

pub async fn usage_at(db: &Database, now: DateTime<Utc>) -> Result<Vec<RateLimitState>, MurmurError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let keys: Vec<String> = {
                let mut stmt =
                    tx.prepare("SELECT action_type FROM rate_limits ORDER BY action_type")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect::<Result<_, _>>()?
            };
            let mut states = Vec::with_capacity(keys.len());
            for key in keys {
                let action = parse_action(&key)?;
                if let Some(state) = load_fresh(&tx, action, now)? {
                    states.push(state);
                }
            }
            tx.commit()?;
            Ok(states)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn parse_action(key: &str) -> Result<ActionType, rusqlite::Error> {
    ActionType::from_str(key).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Read a row and persist a reset if its period is over.
///
/// An unparseable `period_start` is treated as expired.
fn load_fresh(
    conn: &rusqlite::Connection,
    action: ActionType,
    now: DateTime<Utc>,
) -> Result<Option<RateLimitState>, rusqlite::Error> {
    let key = action.to_string();
    let row = conn
        .query_row(
            "SELECT request_count, period_start, max_requests, period_seconds
             FROM rate_limits WHERE action_type = ?1",
            params![key],
            |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((request_count, raw_start, max_requests, period_seconds)) = row else {
        return Ok(None);
    };

    let mut state = RateLimitState {
        action,
        request_count,
        period_start: parse_timestamp(&raw_start).unwrap_or(DateTime::<Utc>::MIN_UTC),
        max_requests,
        period_seconds: period_seconds.max(0) as u64,
    };

    if state.is_expired(now) {
        conn.execute(
            "UPDATE rate_limits SET request_count = 0, period_start = ?1 WHERE action_type = ?2",
            params![format_timestamp(now), key],
        )?;
        tracing::debug!(action = %action, previous = state.request_count, "rate limit period reset");
        state.request_count = 0;
        state.period_start = now;
    }

    Ok(Some(state))
}
