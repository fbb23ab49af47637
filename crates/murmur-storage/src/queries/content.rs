// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Original tweets and threads posted by the content loops.

use chrono::{DateTime, Utc};
use murmur_core::MurmurError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::{parse_timestamp, OriginalTweetRecord, ThreadRecord, ThreadTweetRecord};

/// Insert an original tweet record. Returns the row id.
pub async fn insert_original_tweet(
    db: &Database,
    record: &OriginalTweetRecord,
) -> Result<i64, MurmurError> {
    let r = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO original_tweets (tweet_id, content, topic, created_at, status, error_message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    r.tweet_id,
                    r.content,
                    r.topic,
                    r.created_at,
                    r.status.to_string(),
                    r.error_message,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Creation time of the newest non-failed original tweet.
pub async fn last_original_tweet_at(db: &Database) -> Result<Option<DateTime<Utc>>, MurmurError> {
    latest_timestamp(
        db,
        "SELECT MAX(created_at) FROM original_tweets WHERE status != 'failed'",
    )
    .await
}

/// Insert a thread and its posted tweets in one transaction. Returns the thread id.
pub async fn insert_thread(
    db: &Database,
    thread: &ThreadRecord,
    tweets: &[ThreadTweetRecord],
) -> Result<i64, MurmurError> {
    let t = thread.clone();
    let tweets = tweets.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO threads
                 (topic, planned_count, tweet_count, root_tweet_id, created_at, status, error_message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    t.topic,
                    t.planned_count,
                    t.tweet_count,
                    t.root_tweet_id,
                    t.created_at,
                    t.status.to_string(),
                    t.error_message,
                ],
            )?;
            let thread_id = tx.last_insert_rowid();
            for tweet in &tweets {
                tx.execute(
                    "INSERT INTO thread_tweets (thread_id, position, tweet_id, content, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![thread_id, tweet.position, tweet.tweet_id, tweet.content, t.created_at],
                )?;
            }
            tx.commit()?;
            Ok(thread_id)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Creation time of the newest non-failed thread (partial chains count).
pub async fn last_thread_at(db: &Database) -> Result<Option<DateTime<Utc>>, MurmurError> {
    latest_timestamp(db, "SELECT MAX(created_at) FROM threads WHERE status != 'failed'").await
}

/// Load a thread row by id.
pub async fn get_thread(db: &Database, id: i64) -> Result<Option<ThreadRecord>, MurmurError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, topic, planned_count, tweet_count, root_tweet_id, created_at,
                        status, error_message
                 FROM threads WHERE id = ?1",
                params![id],
                |row| {
                    let status: String = row.get(6)?;
                    Ok(ThreadRecord {
                        id: row.get(0)?,
                        topic: row.get(1)?,
                        planned_count: row.get(2)?,
                        tweet_count: row.get(3)?,
                        root_tweet_id: row.get(4)?,
                        created_at: row.get(5)?,
                        status: status.parse().map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                6,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?,
                        error_message: row.get(7)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Child tweets of a thread, in position order.
pub async fn thread_tweets(db: &Database, thread_id: i64) -> Result<Vec<ThreadTweetRecord>, MurmurError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT position, tweet_id, content FROM thread_tweets
                 WHERE thread_id = ?1 ORDER BY position",
            )?;
            let rows = stmt.query_map(params![thread_id], |row| {
                Ok(ThreadTweetRecord {
                    position: row.get(0)?,
                    tweet_id: row.get(1)?,
                    content: row.get(2)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

async fn latest_timestamp(
    db: &Database,
    sql: &'static str,
) -> Result<Option<DateTime<Utc>>, MurmurError> {
    let raw: Option<String> = db
        .connection()
        .call(move |conn| conn.query_row(sql, [], |row| row.get(0)))
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
