// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retention pass: prunes history tables on a fixed schedule.
//!
//! Deletes run in one transaction, children before parents. `rate_limits`
//! is never touched. A `VACUUM` follows when enough rows were removed.

use chrono::{DateTime, Duration, Utc};
use murmur_core::MurmurError;
use rusqlite::params;
use serde::Serialize;
use tracing::{debug, info};

use crate::database::Database;
use crate::models::format_timestamp;

/// Unreplied discovered tweets expire after this many days regardless of the
/// configured retention window.
pub const UNREPLIED_CANDIDATE_DAYS: i64 = 7;

/// Action-log entries expire after this many days.
pub const ACTION_LOG_DAYS: i64 = 14;

/// Total deleted rows above which the database is compacted.
pub const VACUUM_THRESHOLD: u64 = 1_000;

/// Rows removed per table by one cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupStats {
    pub replies: u64,
    pub unreplied_candidates: u64,
    pub replied_candidates: u64,
    pub thread_tweets: u64,
    pub threads: u64,
    pub original_tweets: u64,
    pub action_log: u64,
    pub vacuumed: bool,
}

impl CleanupStats {
    pub fn total(&self) -> u64 {
        self.replies
            + self.unreplied_candidates
            + self.replied_candidates
            + self.thread_tweets
            + self.threads
            + self.original_tweets
            + self.action_log
    }
}

/// Run one cleanup pass against the wall clock.
pub async fn run_cleanup(db: &Database, retention_days: u32) -> Result<CleanupStats, MurmurError> {
    run_cleanup_at(db, retention_days, Utc::now()).await
}

pub async fn run_cleanup_at(
    db: &Database,
    retention_days: u32,
    now: DateTime<Utc>,
) -> Result<CleanupStats, MurmurError> {
    let retention_cutoff = format_timestamp(now - Duration::days(i64::from(retention_days)));
    let unreplied_cutoff = format_timestamp(now - Duration::days(UNREPLIED_CANDIDATE_DAYS));
    let log_cutoff = format_timestamp(now - Duration::days(ACTION_LOG_DAYS));

    let mut stats = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut stats = CleanupStats::default();

            stats.replies = tx.execute(
                "DELETE FROM replies_sent WHERE created_at < ?1",
                params![retention_cutoff],
            )? as u64;

            stats.unreplied_candidates = tx.execute(
                "DELETE FROM discovered_tweets WHERE replied_to = 0 AND discovered_at < ?1",
                params![unreplied_cutoff],
            )? as u64;

            stats.replied_candidates = tx.execute(
                "DELETE FROM discovered_tweets WHERE replied_to = 1 AND discovered_at < ?1",
                params![retention_cutoff],
            )? as u64;

            stats.thread_tweets = tx.execute(
                "DELETE FROM thread_tweets
                 WHERE created_at < ?1
                    OR thread_id IN (SELECT id FROM threads WHERE created_at < ?1)",
                params![retention_cutoff],
            )? as u64;

            stats.threads = tx.execute(
                "DELETE FROM threads WHERE created_at < ?1
                 AND id NOT IN (SELECT thread_id FROM thread_tweets)",
                params![retention_cutoff],
            )? as u64;

            stats.original_tweets = tx.execute(
                "DELETE FROM original_tweets WHERE created_at < ?1",
                params![retention_cutoff],
            )? as u64;

            stats.action_log = tx.execute(
                "DELETE FROM action_log WHERE created_at < ?1",
                params![log_cutoff],
            )? as u64;

            tx.commit()?;
            Ok(stats)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if stats.total() > VACUUM_THRESHOLD {
        debug!(deleted = stats.total(), "compacting database");
        db.connection()
            .call(|conn| conn.execute_batch("VACUUM"))
            .await
            .map_err(crate::database::map_tr_err)?;
        stats.vacuumed = true;
    }

    info!(
        replies = stats.replies,
        unreplied_candidates = stats.unreplied_candidates,
        replied_candidates = stats.replied_candidates,
        thread_tweets = stats.thread_tweets,
        threads = stats.threads,
        original_tweets = stats.original_tweets,
        action_log = stats.action_log,
        vacuumed = stats.vacuumed,
        "retention cleanup finished"
    );

    Ok(stats)
}
