// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod action_log;
pub mod candidates;
pub mod content;
pub mod cursors;
pub mod rate_limits;
pub mod replies;
