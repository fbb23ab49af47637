// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relevance scoring for reply candidates.
//!
//! Four pure signal functions map tweet and author attributes onto bounded
//! sub-scores; the [`ScoringEngine`] sums them into a 0-100 total and a
//! reply/skip verdict.

pub mod engine;
pub mod signals;

pub use engine::{ScoringEngine, TweetScore};
