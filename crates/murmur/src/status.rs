// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `murmur status` command implementation.
//!
//! Reads rate-limit counters and the action log from the configured
//! database. Works whether or not the agent is running.

use std::io::IsTerminal;

use chrono::{Duration, Utc};
use murmur_config::MurmurConfig;
use murmur_core::MurmurError;
use murmur_safety::RateLimiter;
use murmur_storage::queries::action_log;
use murmur_storage::{ActionLogEntry, RateLimitState, format_timestamp};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LimitUsage {
    pub action: String,
    pub used: u32,
    pub max: u32,
    pub resets_at: String,
}

impl From<&RateLimitState> for LimitUsage {
    fn from(state: &RateLimitState) -> Self {
        Self {
            action: state.action.to_string(),
            used: state.request_count,
            max: state.max_requests,
            resets_at: format_timestamp(state.resets_at()),
        }
    }
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub agent: String,
    pub dry_run: bool,
    pub limits: Vec<LimitUsage>,
    /// Action-log counts per status over the last 24 hours.
    pub last_24h: Vec<(String, u64)>,
    pub recent_actions: Vec<ActionLogEntry>,
}

pub async fn run_status(
    config: &MurmurConfig,
    json: bool,
    plain: bool,
    actions: u32,
) -> Result<(), MurmurError> {
    let db = crate::open_database(config).await?;
    let usage = RateLimiter::new(db.clone()).usage().await?;
    let since = format_timestamp(Utc::now() - Duration::hours(24));
    let status = StatusResponse {
        agent: config.agent.name.clone(),
        dry_run: config.agent.dry_run,
        limits: usage.iter().map(LimitUsage::from).collect(),
        last_24h: action_log::status_counts_since(&db, &since).await?,
        recent_actions: action_log::recent_actions(&db, actions).await?,
    };
    db.close().await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&status, use_color);
    }
    Ok(())
}

fn usage_bar(used: u32, max: u32) -> String {
    const WIDTH: u32 = 20;
    let filled = if max == 0 {
        WIDTH
    } else {
        (used.min(max) * WIDTH) / max
    };
    format!(
        "[{}{}]",
        "#".repeat(filled as usize),
        ".".repeat((WIDTH - filled) as usize)
    )
}

fn print_status(status: &StatusResponse, use_color: bool) {
    use colored::Colorize;

    println!();
    println!(
        "  murmur status ({}{})",
        status.agent,
        if status.dry_run { ", dry run" } else { "" }
    );
    println!("  {}", "-".repeat(50));

    for limit in &status.limits {
        let bar = usage_bar(limit.used, limit.max);
        let exhausted = limit.used >= limit.max;
        let line = format!(
            "    {:<14} {bar} {:>4}/{:<4} resets {}",
            limit.action, limit.used, limit.max, limit.resets_at
        );
        if use_color && exhausted {
            println!("{}", line.red());
        } else if use_color {
            println!("{}", line.green());
        } else {
            println!("{line}");
        }
    }

    if !status.last_24h.is_empty() {
        println!();
        let counts: Vec<String> = status
            .last_24h
            .iter()
            .map(|(s, n)| format!("{s}={n}"))
            .collect();
        println!("    last 24h: {}", counts.join(", "));
    }

    if !status.recent_actions.is_empty() {
        println!();
        println!("    recent actions:");
        for entry in &status.recent_actions {
            println!(
                "      {} {:<8} {:<8} {}",
                entry.created_at,
                entry.action_type,
                entry.status,
                entry.message.as_deref().unwrap_or("")
            );
        }
    }
    println!();
}
