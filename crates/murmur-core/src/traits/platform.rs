// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Social platform client boundary.

use async_trait::async_trait;

use crate::error::PlatformError;
use crate::types::TweetCandidate;

/// Read/post primitives of the social platform API.
///
/// Timeouts and transport retries are the implementation's business; the
/// automation loops only react to the returned error category.
#[async_trait]
pub trait PlatformClient: Send + Sync + 'static {
    /// Recent tweets matching a keyword.
    async fn search(&self, keyword: &str) -> Result<Vec<TweetCandidate>, PlatformError>;

    /// Mentions newer than `since_id` (all recent mentions when `None`).
    async fn mentions_since(
        &self,
        since_id: Option<&str>,
    ) -> Result<Vec<TweetCandidate>, PlatformError>;

    /// Publish an original tweet, returning its id.
    async fn post(&self, text: &str) -> Result<String, PlatformError>;

    /// Publish a reply to `parent_id`, returning the new tweet id.
    async fn reply(&self, parent_id: &str, text: &str) -> Result<String, PlatformError>;

    /// Refresh expired credentials.
    async fn refresh_auth(&self) -> Result<(), PlatformError>;
}
