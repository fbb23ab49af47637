// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Murmur growth agent.
//!
//! This crate provides the error types, the closed set of action types and
//! outcome statuses, the candidate/author shapes passed between components,
//! and the traits for the two external collaborators the automation loops
//! depend on: the social platform client and the content generator.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{GenerationError, MurmurError, PlatformError};
pub use types::{ActionStatus, ActionType, AuthorInfo, EngagementMetrics, TweetCandidate};

pub use traits::{ContentGenerator, PlatformClient};
