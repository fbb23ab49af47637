// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply history: the source of truth for exact and phrasing dedup.

use std::str::FromStr;

use murmur_core::MurmurError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{RecordStatus, ReplyRecord};

/// Insert a reply record. Returns the auto-generated row id.
///
/// A second `sent` record for the same target violates the unique index and
/// surfaces as a storage error.
pub async fn insert_reply(db: &Database, reply: &ReplyRecord) -> Result<i64, MurmurError> {
    let reply = reply.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO replies_sent
                 (target_tweet_id, reply_tweet_id, reply_content, created_at, status, error_message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    reply.target_tweet_id,
                    reply.reply_tweet_id,
                    reply.reply_content,
                    reply.created_at,
                    reply.status.to_string(),
                    reply.error_message,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Whether a non-failed reply to `target_tweet_id` exists.
///
/// Dry-run records count, so a dry run does not keep proposing the same target.
pub async fn has_replied(db: &Database, target_tweet_id: &str) -> Result<bool, MurmurError> {
    let target = target_tweet_id.to_string();
    db.connection()
        .call(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM replies_sent
                 WHERE target_tweet_id = ?1 AND status != 'failed')",
                params![target],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// How many reply posts to `target_tweet_id` have failed.
pub async fn failed_attempts(db: &Database, target_tweet_id: &str) -> Result<u32, MurmurError> {
    let target = target_tweet_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM replies_sent
                 WHERE target_tweet_id = ?1 AND status = 'failed'",
                params![target],
                |row| row.get(0),
            )?;
            Ok(u32::try_from(count).unwrap_or(u32::MAX))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Content of the `limit` most recent non-failed replies, newest first.
pub async fn recent_reply_contents(db: &Database, limit: u32) -> Result<Vec<String>, MurmurError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT reply_content FROM replies_sent
                 WHERE status != 'failed'
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| row.get(0))?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recent replies of any status, newest first.
pub async fn recent_replies(db: &Database, limit: u32) -> Result<Vec<ReplyRecord>, MurmurError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, target_tweet_id, reply_tweet_id, reply_content, created_at,
                        status, error_message
                 FROM replies_sent
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                let status: String = row.get(5)?;
                Ok(ReplyRecord {
                    id: row.get(0)?,
                    target_tweet_id: row.get(1)?,
                    reply_tweet_id: row.get(2)?,
                    reply_content: row.get(3)?,
                    created_at: row.get(4)?,
                    status: RecordStatus::from_str(&status).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            5,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                    error_message: row.get(6)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of non-failed replies created at or after `since` (a persisted timestamp).
pub async fn count_replies_since(db: &Database, since: &str) -> Result<u64, MurmurError> {
    let since = since.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM replies_sent WHERE status != 'failed' AND created_at >= ?1",
                params![since],
                |row| row.get(0),
            )?;
            Ok(count.max(0) as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
