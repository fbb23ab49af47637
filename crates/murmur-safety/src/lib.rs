// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Safety layer for the Murmur growth agent.
//!
//! Everything that decides whether a posting action may happen right now:
//! persisted rate limits, reply dedup (exact and phrasing similarity), and
//! the [`SafetyGuard`] facade the automation loops call before posting.

pub mod dedup;
pub mod denial;
pub mod guard;
pub mod rate_limit;

pub use dedup::DedupChecker;
pub use denial::{Decision, DenialReason};
pub use guard::SafetyGuard;
pub use rate_limit::RateLimiter;
