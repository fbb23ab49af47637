// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end loop testing.
//!
//! `TestHarness` assembles a temp SQLite database with seeded rate limits,
//! a safety guard, mock collaborators, and a [`LoopContext`] with no
//! inter-post delay, so a single `tick()` can be driven and asserted on.

use std::sync::Arc;

use chrono::Utc;
use murmur_automation::{ActionDelay, LoopContext};
use murmur_config::model::{BusinessConfig, LimitsConfig, MurmurConfig};
use murmur_core::types::EngagementMetrics;
use murmur_core::{AuthorInfo, MurmurError, TweetCandidate};
use murmur_safety::SafetyGuard;
use murmur_storage::Database;
use murmur_storage::queries::rate_limits;
use tokio_util::sync::CancellationToken;

use crate::mock_generator::MockGenerator;
use crate::mock_platform::MockPlatform;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: MurmurConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: MurmurConfig::default(),
        }
    }

    pub fn with_limits(mut self, limits: LimitsConfig) -> Self {
        self.config.limits = limits;
        self
    }

    pub fn with_business(mut self, business: BusinessConfig) -> Self {
        self.config.business = business;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.agent.dry_run = dry_run;
        self
    }

    /// Adjust any other part of the config.
    pub fn configure(mut self, f: impl FnOnce(&mut MurmurConfig)) -> Self {
        f(&mut self.config);
        self
    }

    pub async fn build(self) -> Result<TestHarness, MurmurError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| MurmurError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");
        let db_path = db_path.to_string_lossy().to_string();

        let mut config = self.config;
        config.storage.database_path = db_path.clone();

        let db = Database::open(&db_path).await?;
        rate_limits::init_rate_limits(&db, &config.limits).await?;
        let guard = SafetyGuard::new(db.clone(), &config.limits);

        Ok(TestHarness {
            platform: Arc::new(MockPlatform::new()),
            generator: Arc::new(MockGenerator::new()),
            db,
            guard,
            config,
            cancel: CancellationToken::new(),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock collaborators and temp storage.
pub struct TestHarness {
    pub platform: Arc<MockPlatform>,
    pub generator: Arc<MockGenerator>,
    /// Temp database, removed on drop.
    pub db: Database,
    pub guard: SafetyGuard,
    pub config: MurmurConfig,
    pub cancel: CancellationToken,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Loop context wired to the mocks, honouring the configured dry-run flag.
    pub fn context(&self) -> LoopContext {
        LoopContext {
            db: self.db.clone(),
            guard: self.guard.clone(),
            platform: self.platform.clone(),
            generator: self.generator.clone(),
            dry_run: self.config.agent.dry_run,
            delay: ActionDelay::none(),
            cancel: self.cancel.clone(),
        }
    }
}

/// A fresh tweet by `@user_<id>` with the given follower count.
pub fn tweet(id: &str, text: &str, followers: u64) -> TweetCandidate {
    TweetCandidate {
        id: id.to_string(),
        text: text.to_string(),
        created_at: Utc::now().to_rfc3339(),
        author: AuthorInfo {
            id: format!("author-{id}"),
            username: format!("user_{id}"),
            followers_count: followers,
        },
        metrics: EngagementMetrics::default(),
    }
}
