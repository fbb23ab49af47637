// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only action audit log.

use std::str::FromStr;

use murmur_core::{ActionStatus, MurmurError};
use rusqlite::params;

use crate::database::Database;
use crate::models::ActionLogEntry;

/// Append an entry. Returns the row id.
pub async fn log_action(db: &Database, entry: &ActionLogEntry) -> Result<i64, MurmurError> {
    let action_type = entry.action_type.clone();
    let status = entry.status.to_string();
    let message = entry.message.clone();
    let metadata = entry.metadata.as_ref().map(|m| m.to_string());
    let created_at = entry.created_at.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO action_log (action_type, status, message, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![action_type, status, message, metadata, created_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The `limit` newest entries, newest first.
pub async fn recent_actions(db: &Database, limit: u32) -> Result<Vec<ActionLogEntry>, MurmurError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, action_type, status, message, metadata, created_at
                 FROM action_log ORDER BY created_at DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                let status: String = row.get(2)?;
                let metadata: Option<String> = row.get(4)?;
                Ok(ActionLogEntry {
                    id: row.get(0)?,
                    action_type: row.get(1)?,
                    status: ActionStatus::from_str(&status).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            2,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                    message: row.get(3)?,
                    // Malformed metadata is dropped rather than failing the whole read.
                    metadata: metadata.and_then(|m| serde_json::from_str(&m).ok()),
                    created_at: row.get(5)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Entry counts per status since `since` (a persisted timestamp), sorted by status.
pub async fn status_counts_since(
    db: &Database,
    since: &str,
) -> Result<Vec<(String, u64)>, MurmurError> {
    let since = since.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT status, COUNT(*) FROM action_log
                 WHERE created_at >= ?1 GROUP BY status ORDER BY status",
            )?;
            let rows = stmt.query_map(params![since], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?.max(0) as u64))
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of entries with the given action type and status.
pub async fn count_actions(
    db: &Database,
    action_type: &str,
    status: ActionStatus,
) -> Result<u64, MurmurError> {
    let action_type = action_type.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM action_log WHERE action_type = ?1 AND status = ?2",
                params![action_type, status],
                |row| row.get(0),
            )?;
            Ok(count.max(0) as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
