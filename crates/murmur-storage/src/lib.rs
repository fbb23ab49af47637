// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Murmur growth agent.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, typed query modules for rate limits,
//! replies, discovered candidates, original content, the action log and loop
//! cursors, plus the retention pass that prunes them.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod retention;

pub use database::Database;
pub use models::*;
pub use retention::{run_cleanup, run_cleanup_at, CleanupStats};
