// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Collects every violation instead of failing on the first one.

use crate::diagnostic::ConfigError;
use crate::model::MurmurConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &MurmurConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.agent.log_level
        ));
    }

    let scoring = &config.scoring;
    if scoring.threshold > 100 {
        fail(format!(
            "scoring.threshold must be between 0 and 100, got {}",
            scoring.threshold
        ));
    }
    for (name, value) in [
        ("keyword_relevance_max", scoring.keyword_relevance_max),
        ("follower_count_max", scoring.follower_count_max),
        ("recency_max", scoring.recency_max),
        ("engagement_rate_max", scoring.engagement_rate_max),
    ] {
        if !value.is_finite() || value < 0.0 {
            fail(format!("scoring.{name} must be a non-negative number, got {value}"));
        }
    }

    let limits = &config.limits;
    if limits.min_action_delay_secs > limits.max_action_delay_secs {
        fail(format!(
            "limits.min_action_delay_secs ({}) must not exceed limits.max_action_delay_secs ({})",
            limits.min_action_delay_secs, limits.max_action_delay_secs
        ));
    }
    if !(limits.similarity_threshold > 0.0 && limits.similarity_threshold <= 1.0) {
        fail(format!(
            "limits.similarity_threshold must be in (0, 1], got {}",
            limits.similarity_threshold
        ));
    }
    if limits.search_window_secs == 0 || limits.mention_check_window_secs == 0 {
        fail("limits.*_window_secs must be greater than zero".to_string());
    }
    if limits.max_reply_attempts == 0 {
        fail("limits.max_reply_attempts must be at least 1".to_string());
    }

    let intervals = &config.intervals;
    for (name, value) in [
        ("mentions_check_secs", intervals.mentions_check_secs),
        ("discovery_search_secs", intervals.discovery_search_secs),
        ("content_check_secs", intervals.content_check_secs),
        ("cleanup_interval_secs", intervals.cleanup_interval_secs),
    ] {
        if value == 0 {
            fail(format!("intervals.{name} must be greater than zero"));
        }
    }

    let automation = &config.automation;
    if automation.max_consecutive_failures == 0 {
        fail("automation.max_consecutive_failures must be at least 1".to_string());
    }
    if automation.backoff_base_secs > automation.backoff_max_secs {
        fail(format!(
            "automation.backoff_base_secs ({}) must not exceed automation.backoff_max_secs ({})",
            automation.backoff_base_secs, automation.backoff_max_secs
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }
    if config.storage.retention_days == 0 {
        fail("storage.retention_days must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
