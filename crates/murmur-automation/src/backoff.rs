// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! How long a loop waits after a failed tick.

use std::time::Duration;

use murmur_config::model::AutomationConfig;
use murmur_core::MurmurError;

/// What the supervisor does after a failed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Not worth backing off; wait the normal interval.
    None,
    /// Exponential (or server-directed) wait for a transient failure.
    Transient(Duration),
    /// Too many failures in a row, or unrecoverable auth.
    Extended(Duration),
}

#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
    pub extended: Duration,
    pub max_consecutive_failures: u32,
}

impl BackoffPolicy {
    pub fn from_config(config: &AutomationConfig) -> Self {
        Self {
            base: Duration::from_secs(config.backoff_base_secs),
            max: Duration::from_secs(config.backoff_max_secs),
            extended: Duration::from_secs(config.extended_backoff_secs),
            max_consecutive_failures: config.max_consecutive_failures,
        }
    }

    /// `base * 2^(n-1)`, capped at `max`.
    pub fn exponential(&self, consecutive_failures: u32) -> Duration {
        let exp = consecutive_failures.saturating_sub(1).min(31);
        self.base.saturating_mul(1u32 << exp).min(self.max)
    }

    /// Decide the wait after the `consecutive_failures`-th failure in a row.
    pub fn after_failure(&self, consecutive_failures: u32, error: &MurmurError) -> Backoff {
        if consecutive_failures >= self.max_consecutive_failures {
            return Backoff::Extended(self.extended);
        }
        if !error.is_transient() {
            return Backoff::None;
        }
        match error.retry_after() {
            Some(hint) => Backoff::Transient(hint),
            None => Backoff::Transient(self.exponential(consecutive_failures)),
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&AutomationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::{GenerationError, PlatformError};

    fn network() -> MurmurError {
        PlatformError::Network("reset".into()).into()
    }

    #[test]
    fn exponential_escalation() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.exponential(1), Duration::from_secs(30));
        assert_eq!(policy.exponential(2), Duration::from_secs(60));
        assert_eq!(policy.exponential(4), Duration::from_secs(240));
        assert_eq!(policy.exponential(6), Duration::from_secs(900));
        assert_eq!(policy.exponential(u32::MAX), Duration::from_secs(900));
    }

    #[test]
    fn retry_after_hint_wins() {
        let policy = BackoffPolicy::default();
        let err: MurmurError = PlatformError::RateLimited {
            retry_after: Some(Duration::from_secs(77)),
        }
        .into();
        assert_eq!(
            policy.after_failure(1, &err),
            Backoff::Transient(Duration::from_secs(77))
        );
    }

    #[test]
    fn permanent_errors_do_not_back_off() {
        let policy = BackoffPolicy::default();
        let err = MurmurError::Internal("bug".into());
        assert_eq!(policy.after_failure(1, &err), Backoff::None);
        let err: MurmurError = GenerationError::Unparseable("junk".into()).into();
        assert_eq!(policy.after_failure(2, &err), Backoff::None);
    }

    #[test]
    fn threshold_switches_to_extended() {
        let policy = BackoffPolicy::default();
        assert_eq!(
            policy.after_failure(9, &network()),
            Backoff::Transient(Duration::from_secs(900))
        );
        assert_eq!(
            policy.after_failure(10, &network()),
            Backoff::Extended(Duration::from_secs(3600))
        );
        assert_eq!(
            policy.after_failure(11, &MurmurError::Internal("x".into())),
            Backoff::Extended(Duration::from_secs(3600))
        );
    }
}
