// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business denials. These are outcomes, not errors.

use std::fmt;

use murmur_core::ActionType;
use serde::Serialize;

/// Why the guard refused an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    /// The action type's budget for the current period is spent.
    RateLimited {
        action: ActionType,
        current: u32,
        max: u32,
    },
    /// A non-failed reply to this tweet already exists.
    AlreadyReplied { id: String },
    /// Posting a reply to this tweet already failed too many times.
    AttemptsExhausted { id: String, attempts: u32 },
    /// The proposed text is too close to a recent reply.
    SimilarPhrasing,
}

impl DenialReason {
    /// Short stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::AlreadyReplied { .. } => "already_replied",
            Self::AttemptsExhausted { .. } => "attempts_exhausted",
            Self::SimilarPhrasing => "similar_phrasing",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited {
                action,
                current,
                max,
            } => write!(f, "{action} rate limit reached ({current}/{max})"),
            Self::AlreadyReplied { id } => write!(f, "already replied to tweet {id}"),
            Self::AttemptsExhausted { id, attempts } => {
                write!(f, "gave up on tweet {id} after {attempts} failed replies")
            }
            Self::SimilarPhrasing => f.write_str("reply phrasing too similar to a recent reply"),
        }
    }
}

/// Outcome of a guard check: `Ok(())` means go ahead.
pub type Decision = Result<(), DenialReason>;
