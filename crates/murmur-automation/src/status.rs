// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Externally visible loop state, published over a `watch` channel.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};

/// Which supervised task a status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    Mentions,
    Discovery,
    Content,
    Thread,
    Cleanup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Running,
    BackingOff,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopStatus {
    pub kind: LoopKind,
    pub state: LoopState,
    /// Failed ticks since the last successful one.
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_success_at: Option<DateTime<Utc>>,
    /// Current backoff wait, while backing off.
    pub backoff: Option<Duration>,
    pub ticks: u64,
}

impl LoopStatus {
    pub fn new(kind: LoopKind) -> Self {
        Self {
            kind,
            state: LoopState::Running,
            consecutive_failures: 0,
            last_error: None,
            last_success_at: None,
            backoff: None,
            ticks: 0,
        }
    }
}
