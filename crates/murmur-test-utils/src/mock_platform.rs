// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock platform client for deterministic testing.
//!
//! Each method pops its next result from a FIFO queue. `post` and `reply`
//! share one queue so a thread chain can be scripted in posting order. When a
//! queue is empty the call succeeds with a generated id (or an empty list).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use murmur_core::{PlatformClient, PlatformError, TweetCandidate};
use tokio::sync::Mutex;

/// A recorded call, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Search(String),
    Mentions(Option<String>),
    Post(String),
    Reply { parent_id: String, text: String },
    RefreshAuth,
}

impl PlatformCall {
    /// Whether this call publishes something.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Post(_) | Self::Reply { .. })
    }
}

#[derive(Default)]
pub struct MockPlatform {
    searches: Mutex<VecDeque<Result<Vec<TweetCandidate>, PlatformError>>>,
    mentions: Mutex<VecDeque<Result<Vec<TweetCandidate>, PlatformError>>>,
    writes: Mutex<VecDeque<Result<String, PlatformError>>>,
    refreshes: Mutex<VecDeque<Result<(), PlatformError>>>,
    calls: Mutex<Vec<PlatformCall>>,
    next_id: AtomicU64,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next `search`.
    pub async fn push_search(&self, result: Result<Vec<TweetCandidate>, PlatformError>) {
        self.searches.lock().await.push_back(result);
    }

    /// Queue the result of the next `mentions_since`.
    pub async fn push_mentions(&self, result: Result<Vec<TweetCandidate>, PlatformError>) {
        self.mentions.lock().await.push_back(result);
    }

    /// Queue the result of the next `post` or `reply`.
    pub async fn push_write(&self, result: Result<String, PlatformError>) {
        self.writes.lock().await.push_back(result);
    }

    pub async fn push_refresh(&self, result: Result<(), PlatformError>) {
        self.refreshes.lock().await.push_back(result);
    }

    pub async fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().await.clone()
    }

    /// Posts and replies attempted so far, including failed ones.
    pub async fn writes(&self) -> Vec<PlatformCall> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.is_write())
            .cloned()
            .collect()
    }

    async fn record(&self, call: PlatformCall) {
        self.calls.lock().await.push(call);
    }

    async fn next_write(&self) -> Result<String, PlatformError> {
        match self.writes.lock().await.pop_front() {
            Some(result) => result,
            None => {
                let n = self.next_id.fetch_add(1, Ordering::SeqCst);
                Ok(format!("mock-{}", 1_000 + n))
            }
        }
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    async fn search(&self, keyword: &str) -> Result<Vec<TweetCandidate>, PlatformError> {
        self.record(PlatformCall::Search(keyword.to_string())).await;
        self.searches
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn mentions_since(
        &self,
        since_id: Option<&str>,
    ) -> Result<Vec<TweetCandidate>, PlatformError> {
        self.record(PlatformCall::Mentions(since_id.map(str::to_string)))
            .await;
        self.mentions
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn post(&self, text: &str) -> Result<String, PlatformError> {
        self.record(PlatformCall::Post(text.to_string())).await;
        self.next_write().await
    }

    async fn reply(&self, parent_id: &str, text: &str) -> Result<String, PlatformError> {
        self.record(PlatformCall::Reply {
            parent_id: parent_id.to_string(),
            text: text.to_string(),
        })
        .await;
        self.next_write().await
    }

    async fn refresh_auth(&self) -> Result<(), PlatformError> {
        self.record(PlatformCall::RefreshAuth).await;
        self.refreshes.lock().await.pop_front().unwrap_or(Ok(()))
    }
}
