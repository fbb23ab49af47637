// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content generation boundary (LLM-backed in production).

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::types::{AuthorInfo, TweetCandidate};

/// Produces reply, tweet, and thread text.
#[async_trait]
pub trait ContentGenerator: Send + Sync + 'static {
    async fn generate_reply(
        &self,
        candidate: &TweetCandidate,
        author: &AuthorInfo,
    ) -> Result<String, GenerationError>;

    async fn generate_tweet(&self, topic: &str) -> Result<String, GenerationError>;

    /// Returns the thread's tweets in posting order. `count_hint` is advisory.
    async fn generate_thread(
        &self,
        topic: &str,
        count_hint: usize,
    ) -> Result<Vec<String>, GenerationError>;
}
