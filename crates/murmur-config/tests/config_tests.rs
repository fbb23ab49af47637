// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Murmur configuration system.

use murmur_config::diagnostic::ConfigError;
use murmur_config::model::MurmurConfig;
use murmur_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_murmur_config() {
    let toml = r#"
[agent]
name = "growth-bot"
log_level = "debug"
dry_run = true

[business]
product_name = "Acme"
product_keywords = ["acme cli", "deploy"]
competitor_keywords = ["rivalsoft"]
industry_topics = ["platform engineering"]

[scoring]
threshold = 60
keyword_relevance_max = 40.0

[limits]
max_replies_per_day = 10
min_action_delay_secs = 5
max_action_delay_secs = 10

[storage]
database_path = "/tmp/murmur-test.db"
retention_days = 30
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "growth-bot");
    assert!(config.agent.dry_run);
    assert_eq!(config.business.product_name, "Acme");
    assert_eq!(config.business.product_keywords, vec!["acme cli", "deploy"]);
    assert_eq!(config.scoring.threshold, 60);
    assert_eq!(config.limits.max_replies_per_day, 10);
    assert_eq!(config.limits.max_tweets_per_day, 4);
    assert_eq!(config.storage.database_path, "/tmp/murmur-test.db");
    assert_eq!(config.storage.retention_days, 30);
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").expect("empty config is valid");
    let defaults = MurmurConfig::default();
    assert_eq!(config.scoring.threshold, defaults.scoring.threshold);
    assert_eq!(config.limits.max_threads_per_week, 1);
    assert_eq!(config.intervals.mentions_check_secs, 300);
    assert!(!config.agent.dry_run);
}

#[test]
fn written_defaults_load_back_unchanged() {
    let mut config = MurmurConfig::default();
    config.business.product_keywords = vec!["tracing".into()];
    config.limits.max_replies_per_day = 7;

    let written = toml::to_string(&config).expect("config serializes");
    let loaded = load_and_validate_str(&written).expect("written config is valid");

    assert_eq!(loaded.business.product_keywords, vec!["tracing".to_string()]);
    assert_eq!(loaded.limits.max_replies_per_day, 7);
    assert_eq!(loaded.scoring.threshold, config.scoring.threshold);
    assert_eq!(loaded.storage.database_path, config.storage.database_path);
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = "[limits]\nmax_replys_per_day = 3\n";
    let errors = load_and_validate_str(toml).expect_err("unknown key must fail");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, section, suggestion: Some(s), span: Some(_), .. }
                if key == "max_replys_per_day" && section == "limits" && s == "max_replies_per_day"
        )
    });
    assert!(found, "expected suggestion, got {errors:?}");
}

#[test]
fn unknown_section_is_rejected() {
    let toml = "[telegram]\nbot_token = \"x\"\n";
    assert!(load_and_validate_str(toml).is_err());
}

#[test]
fn wrong_type_is_reported() {
    let toml = "[scoring]\nthreshold = \"high\"\n";
    let errors = load_and_validate_str(toml).expect_err("string threshold must fail");
    assert!(!errors.is_empty());
}

#[test]
fn semantic_validation_runs_after_parse() {
    let toml = "[scoring]\nthreshold = 150\n";
    let errors = load_and_validate_str(toml).expect_err("threshold > 100 must fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

#[test]
fn merged_keywords_deduplicate_across_lists() {
    let toml = r#"
[business]
product_keywords = ["Rust", "async runtime"]
competitor_keywords = ["rust", " ", "Tokio"]
industry_topics = ["observability"]
"#;
    let config = load_and_validate_str(toml).expect("valid");
    let merged = config.business.merged_keywords();
    assert_eq!(merged, vec!["Rust", "async runtime", "Tokio"]);
}
