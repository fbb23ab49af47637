// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Murmur growth agent.
//!
//! Infrastructure failures travel as [`MurmurError`]. Business denials
//! (rate limited, duplicate, similar phrasing) are not errors and live in
//! `murmur-safety` as `DenialReason`.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across Murmur crates.
#[derive(Debug, Error)]
pub enum MurmurError {
    /// Configuration errors (invalid values detected at runtime).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failure reported by the social platform client.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Failure reported by the content generator.
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MurmurError {
    /// Whether the failure is worth an exponential backoff rather than a
    /// plain "try again next tick".
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Platform(e) => e.is_transient(),
            Self::Generation(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Server-provided retry hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Platform(PlatformError::RateLimited { retry_after }) => *retry_after,
            _ => None,
        }
    }

    /// Whether the platform reported expired credentials.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Platform(PlatformError::AuthExpired))
    }
}

/// Error categories surfaced by a [`PlatformClient`](crate::PlatformClient).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform throttled the request.
    #[error("rate limited by platform (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// Access token expired; a refresh may recover.
    #[error("authentication expired")]
    AuthExpired,

    /// Transport-level failure (DNS, connect, reset).
    #[error("network error: {0}")]
    Network(String),

    /// Anything else the platform rejected.
    #[error("{0}")]
    Other(String),
}

impl PlatformError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network(_))
    }

    /// The platform refused this specific request; repeating it will not help.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

/// Error categories surfaced by a [`ContentGenerator`](crate::ContentGenerator).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The provider could not be reached.
    #[error("content provider unreachable: {0}")]
    Unreachable(String),

    /// The provider throttled the request.
    #[error("content provider rate limited")]
    RateLimited,

    /// The provider answered with something that could not be used.
    #[error("unparseable generation output: {0}")]
    Unparseable(String),
}

impl GenerationError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_rate_limit_is_transient_and_carries_hint() {
        let err = MurmurError::from(PlatformError::RateLimited {
            retry_after: Some(Duration::from_secs(90)),
        });
        assert!(err.is_transient());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(90)));
        assert!(!err.is_auth_expired());
    }

    #[test]
    fn only_other_is_a_rejection() {
        assert!(PlatformError::Other("tweet deleted".into()).is_rejected());
        assert!(!PlatformError::Network("reset".into()).is_rejected());
        assert!(!PlatformError::AuthExpired.is_rejected());
        assert!(!PlatformError::RateLimited { retry_after: None }.is_rejected());
    }

    #[test]
    fn auth_expiry_is_not_transient() {
        let err = MurmurError::from(PlatformError::AuthExpired);
        assert!(!err.is_transient());
        assert!(err.is_auth_expired());
    }

    #[test]
    fn storage_errors_are_not_transient() {
        let err = MurmurError::Storage {
            source: "disk full".into(),
        };
        assert!(!err.is_transient());
        assert_eq!(err.retry_after(), None);
        assert_eq!(err.to_string(), "storage error: disk full");
    }

    #[test]
    fn unparseable_generation_is_not_transient() {
        assert!(!GenerationError::Unparseable("empty".into()).is_transient());
        assert!(GenerationError::RateLimited.is_transient());
    }
}
