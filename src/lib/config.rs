// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ErrorKind, JsonDisplay, NetrecError};

const DEFAULT_COMMIT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_VERIFY_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_VERIFY_INTERVAL_MS: u64 = 500;
const DEFAULT_VERIFY_MAX_INTERVAL_MS: u64 = 4_000;
const MAX_VERIFY_ATTEMPTS: u32 = 100;

/// Exponential backoff used when verifying post-apply state.
///
/// Attempt `n` (starting from 1) failing waits
/// `min(interval_ms * 2^(n-1), max_interval_ms)` before attempt `n+1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonDisplay)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
pub struct NetrecVerifyRetry {
    #[serde(default = "default_verify_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_verify_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_verify_max_interval_ms")]
    pub max_interval_ms: u64,
}

impl Default for NetrecVerifyRetry {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_VERIFY_MAX_ATTEMPTS,
            interval_ms: DEFAULT_VERIFY_INTERVAL_MS,
            max_interval_ms: DEFAULT_VERIFY_MAX_INTERVAL_MS,
        }
    }
}

impl NetrecVerifyRetry {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval_ms: interval.as_millis() as u64,
            max_interval_ms: (interval.as_millis() as u64)
                .saturating_mul(8),
        }
    }

    /// Delay after failed attempt `attempt` (1 based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(
            self.interval_ms
                .saturating_mul(factor)
                .min(self.max_interval_ms.max(self.interval_ms)),
        )
    }

    /// Total time spent sleeping when every attempt fails.
    pub fn budget(&self) -> Duration {
        (1..self.max_attempts.max(1))
            .map(|i| self.delay(i))
            .fold(Duration::ZERO, |total, d| total.saturating_add(d))
    }
}

/// Options of a single apply action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonDisplay)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
pub struct NetrecApplyOption {
    /// Lease of the checkpoint. When expired before commit, the backend
    /// reverts all changes by itself.
    #[serde(default = "default_commit_timeout_ms")]
    pub commit_timeout_ms: u64,
    /// Skip verification of post-apply state.
    #[serde(default)]
    pub no_verify: bool,
    /// Cancel the apply (with rollback) if not finished in time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_timeout_ms: Option<u64>,
    #[serde(default)]
    pub verify_retry: NetrecVerifyRetry,
}

impl Default for NetrecApplyOption {
    fn default() -> Self {
        Self {
            commit_timeout_ms: DEFAULT_COMMIT_TIMEOUT_MS,
            no_verify: false,
            apply_timeout_ms: None,
            verify_retry: NetrecVerifyRetry::default(),
        }
    }
}

impl NetrecApplyOption {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit_timeout(mut self, timeout: Duration) -> Self {
        self.commit_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn apply_timeout(mut self, timeout: Duration) -> Self {
        self.apply_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn no_verify(mut self, no_verify: bool) -> Self {
        self.no_verify = no_verify;
        self
    }

    pub fn verify_retry(mut self, retry: NetrecVerifyRetry) -> Self {
        self.verify_retry = retry;
        self
    }

    pub(crate) fn commit_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.commit_timeout_ms)
    }

    pub(crate) fn apply_timeout_duration(&self) -> Option<Duration> {
        self.apply_timeout_ms.map(Duration::from_millis)
    }

    /// The checkpoint lease must outlive the whole verification retry,
    /// otherwise the backend may revert a change that is about to converge.
    pub fn validate(&self) -> Result<(), NetrecError> {
        if self.commit_timeout_ms == 0 {
            return Err(NetrecError::new(
                ErrorKind::ValidationError,
                "commit-timeout-ms: should be bigger than 0".to_string(),
            ));
        }
        if self.verify_retry.max_attempts == 0 {
            return Err(NetrecError::new(
                ErrorKind::ValidationError,
                "verify-retry.max-attempts: should be bigger than 0"
                    .to_string(),
            ));
        }
        if self.verify_retry.max_attempts > MAX_VERIFY_ATTEMPTS {
            return Err(NetrecError::new(
                ErrorKind::ValidationError,
                format!(
                    "verify-retry.max-attempts: should not be bigger than \
                     {MAX_VERIFY_ATTEMPTS}"
                ),
            ));
        }
        if !self.no_verify
            && self.verify_retry.budget() >= self.commit_timeout_duration()
        {
            return Err(NetrecError::new(
                ErrorKind::ValidationError,
                format!(
                    "commit-timeout-ms: checkpoint lease {}ms should be \
                     longer than verification retry budget {}ms",
                    self.commit_timeout_ms,
                    self.verify_retry.budget().as_millis()
                ),
            ));
        }
        Ok(())
    }
}

fn default_commit_timeout_ms() -> u64 {
    DEFAULT_COMMIT_TIMEOUT_MS
}

fn default_verify_max_attempts() -> u32 {
    DEFAULT_VERIFY_MAX_ATTEMPTS
}

fn default_verify_interval_ms() -> u64 {
    DEFAULT_VERIFY_INTERVAL_MS
}

fn default_verify_max_interval_ms() -> u64 {
    DEFAULT_VERIFY_MAX_INTERVAL_MS
}
