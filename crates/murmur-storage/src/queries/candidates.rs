// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tweets surfaced by the discovery loop.

use murmur_core::MurmurError;
use rusqlite::{params, OptionalExtension, Row};

use crate::database::Database;
use crate::models::DiscoveredCandidate;

const COLUMNS: &str = "id, author_id, author_username, author_followers, content, like_count,
     retweet_count, reply_count, relevance_score, matched_keyword, discovered_at, replied_to";

fn row_to_candidate(row: &Row<'_>) -> Result<DiscoveredCandidate, rusqlite::Error> {
    Ok(DiscoveredCandidate {
        id: row.get(0)?,
        author_id: row.get(1)?,
        author_username: row.get(2)?,
        author_followers: row.get::<_, i64>(3)?.max(0) as u64,
        content: row.get(4)?,
        like_count: row.get::<_, i64>(5)?.max(0) as u64,
        retweet_count: row.get::<_, i64>(6)?.max(0) as u64,
        reply_count: row.get::<_, i64>(7)?.max(0) as u64,
        relevance_score: row.get(8)?,
        matched_keyword: row.get(9)?,
        discovered_at: row.get(10)?,
        replied_to: row.get(11)?,
    })
}

fn clamp_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Insert a candidate on first sighting. Returns `false` if it was already known.
pub async fn insert_candidate(
    db: &Database,
    candidate: &DiscoveredCandidate,
) -> Result<bool, MurmurError> {
    let c = candidate.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO discovered_tweets
                 (id, author_id, author_username, author_followers, content, like_count,
                  retweet_count, reply_count, relevance_score, matched_keyword, discovered_at,
                  replied_to)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    c.id,
                    c.author_id,
                    c.author_username,
                    clamp_i64(c.author_followers),
                    c.content,
                    clamp_i64(c.like_count),
                    clamp_i64(c.retweet_count),
                    clamp_i64(c.reply_count),
                    c.relevance_score,
                    c.matched_keyword,
                    c.discovered_at,
                    c.replied_to,
                ],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_candidate(db: &Database, id: &str) -> Result<Option<DiscoveredCandidate>, MurmurError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM discovered_tweets WHERE id = ?1"),
                params![id],
                row_to_candidate,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flag a candidate as replied to. Unknown ids are ignored.
pub async fn mark_candidate_replied(db: &Database, id: &str) -> Result<(), MurmurError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE discovered_tweets SET replied_to = 1 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Unreplied candidates scoring at least `min_score`, best first.
pub async fn unreplied_above_score(
    db: &Database,
    min_score: f64,
    limit: u32,
) -> Result<Vec<DiscoveredCandidate>, MurmurError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM discovered_tweets
                 WHERE replied_to = 0 AND relevance_score >= ?1
                 ORDER BY relevance_score DESC, discovered_at DESC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![min_score, limit], row_to_candidate)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
