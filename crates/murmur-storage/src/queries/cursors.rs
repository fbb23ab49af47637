// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value progress markers that survive restarts.

use chrono::Utc;
use murmur_core::MurmurError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::format_timestamp;

/// Cursor key for the newest mention already processed.
pub const MENTIONS_SINCE_ID: &str = "mentions_since_id";

pub async fn get_cursor(db: &Database, key: &str) -> Result<Option<String>, MurmurError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT value FROM cursors WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn set_cursor(db: &Database, key: &str, value: &str) -> Result<(), MurmurError> {
    let key = key.to_string();
    let value = value.to_string();
    let now = format_timestamp(Utc::now());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO cursors (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
