// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Murmur - operator CLI for the growth agent's safety-and-decision core.
//!
//! Inspects limits and the audit trail, runs retention once or on a
//! schedule, and validates configuration.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod status;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use murmur_automation::CleanupScheduler;
use murmur_automation::shutdown::install_signal_handler;
use murmur_config::MurmurConfig;
use murmur_core::MurmurError;
use murmur_storage::Database;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Murmur - autonomous growth agent core.
#[derive(Parser, Debug)]
#[command(name = "murmur", version, about, long_about = None)]
struct Cli {
    /// Config file to load instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show rate-limit usage and recent actions.
    Status {
        /// Output JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
        /// Number of recent actions to show.
        #[arg(long, default_value_t = 10)]
        actions: u32,
    },
    /// Run one retention pass now.
    Cleanup,
    /// Run scheduled retention until interrupted.
    Maintain,
    /// Validate configuration and exit.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => murmur_config::load_and_validate_path(path),
        None => murmur_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            murmur_config::render_errors(errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Status {
            json,
            plain,
            actions,
        }) => status::run_status(&config, json, plain, actions).await,
        Some(Commands::Cleanup) => run_cleanup(&config).await,
        Some(Commands::Maintain) => run_maintain(&config).await,
        Some(Commands::CheckConfig) => {
            println!(
                "murmur: config ok (agent.name={}, keywords={}, topics={})",
                config.agent.name,
                config.business.merged_keywords().len(),
                config.business.industry_topics.len()
            );
            Ok(())
        }
        None => {
            println!("murmur: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("murmur: {e}");
        std::process::exit(1);
    }
}

/// Open the configured database and make sure every counter exists.
pub(crate) async fn open_database(config: &MurmurConfig) -> Result<Database, MurmurError> {
    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?;
    murmur_storage::queries::rate_limits::init_rate_limits(&db, &config.limits).await?;
    Ok(db)
}

async fn run_cleanup(config: &MurmurConfig) -> Result<(), MurmurError> {
    let db = open_database(config).await?;
    let stats = murmur_storage::run_cleanup(&db, config.storage.retention_days).await?;
    info!(removed = stats.total(), vacuumed = stats.vacuumed, "cleanup finished");
    println!(
        "removed {} rows (replies {}, candidates {}, threads {}, tweets {}, actions {}){}",
        stats.total(),
        stats.replies,
        stats.unreplied_candidates + stats.replied_candidates,
        stats.threads + stats.thread_tweets,
        stats.original_tweets,
        stats.action_log,
        if stats.vacuumed { ", vacuumed" } else { "" }
    );
    db.close().await
}

async fn run_maintain(config: &MurmurConfig) -> Result<(), MurmurError> {
    let db = open_database(config).await?;
    let cancel = CancellationToken::new();
    install_signal_handler(cancel.clone());

    let scheduler = CleanupScheduler::new(
        db.clone(),
        config.storage.retention_days,
        Duration::from_secs(config.intervals.cleanup_interval_secs),
    );
    let (status, _rx) = CleanupScheduler::status_channel();
    scheduler.run(cancel, status).await;
    db.close().await
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("murmur={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
