// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock content generator for deterministic testing.
//!
//! Scripted results are popped first. Unscripted replies cycle through a
//! fixed pool of sentences that are far apart under phrasing similarity, so
//! up to eight consecutive default replies never trip the dedup check.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use murmur_core::{AuthorInfo, ContentGenerator, GenerationError, TweetCandidate};
use tokio::sync::Mutex;

const DEFAULT_REPLIES: [&str; 8] = [
    "Interesting take, the benchmarks look solid.",
    "Have you tried profiling the hot loop first?",
    "We ran into the same issue last quarter.",
    "Curious how this holds up under heavy load.",
    "Nice writeup! Bookmarking for later.",
    "Memory usage dropped a lot once we switched.",
    "Great question; docs cover part of it.",
    "Which version are you running right now?",
];

#[derive(Default)]
pub struct MockGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    tweets: Mutex<VecDeque<Result<String, GenerationError>>>,
    threads: Mutex<VecDeque<Result<Vec<String>, GenerationError>>>,
    reply_calls: AtomicUsize,
    tweet_calls: AtomicUsize,
    thread_calls: AtomicUsize,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_reply(&self, result: Result<String, GenerationError>) {
        self.replies.lock().await.push_back(result);
    }

    pub async fn push_tweet(&self, result: Result<String, GenerationError>) {
        self.tweets.lock().await.push_back(result);
    }

    pub async fn push_thread(&self, result: Result<Vec<String>, GenerationError>) {
        self.threads.lock().await.push_back(result);
    }

    pub fn reply_calls(&self) -> usize {
        self.reply_calls.load(Ordering::SeqCst)
    }

    pub fn tweet_calls(&self) -> usize {
        self.tweet_calls.load(Ordering::SeqCst)
    }

    pub fn thread_calls(&self) -> usize {
        self.thread_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn generate_reply(
        &self,
        _candidate: &TweetCandidate,
        _author: &AuthorInfo,
    ) -> Result<String, GenerationError> {
        let n = self.reply_calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.lock().await.pop_front() {
            Some(result) => result,
            None => Ok(DEFAULT_REPLIES[n % DEFAULT_REPLIES.len()].to_string()),
        }
    }

    async fn generate_tweet(&self, topic: &str) -> Result<String, GenerationError> {
        let n = self.tweet_calls.fetch_add(1, Ordering::SeqCst);
        match self.tweets.lock().await.pop_front() {
            Some(result) => result,
            None => Ok(format!("Some thoughts on {topic} (#{n})")),
        }
    }

    async fn generate_thread(
        &self,
        topic: &str,
        count_hint: usize,
    ) -> Result<Vec<String>, GenerationError> {
        self.thread_calls.fetch_add(1, Ordering::SeqCst);
        match self.threads.lock().await.pop_front() {
            Some(result) => result,
            None => Ok((1..=count_hint.max(1))
                .map(|i| format!("{topic}, part {i}"))
                .collect()),
        }
    }
}
