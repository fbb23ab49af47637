// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema migrations, embedded from `migrations/` at compile time.

use murmur_core::MurmurError;
use tracing::info;

refinery::embed_migrations!("migrations");

/// Bring the schema up to date. Returns how many migrations were applied.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<usize, MurmurError> {
    let report = migrations::runner()
        .run(conn)
        .map_err(|e| MurmurError::Storage { source: e.into() })?;

    let applied = report.applied_migrations();
    for m in applied {
        info!(version = m.version(), name = %m.name(), "applied schema migration");
    }
    Ok(applied.len())
}
