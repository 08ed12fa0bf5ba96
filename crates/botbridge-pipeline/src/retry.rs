// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry engine with exponential backoff for transient failures.
//!
//! Classification is a best-effort heuristic over error variants and message
//! substrings; the predicate is pluggable so a typed taxonomy from the
//! underlying clients can replace it without touching the loop. False
//! negatives (a retryable error classified fatal) are accepted.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use botbridge_core::{BridgeError, ErrorCode};

/// Message substrings that mark a failure as network-ish and retryable.
const NETWORK_MARKERS: &[&str] = &[
    "econnrefused",
    "econnreset",
    "etimedout",
    "enotfound",
    "eai_again",
    "timeout",
    "timed out",
    "dns",
    "network",
    "connection refused",
    "connection reset",
    "socket hang up",
    "temporarily unavailable",
];

/// Backoff parameters. `max_retries` counts retries, not attempts: an
/// operation runs at most `max_retries + 1` times.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before the given attempt number:
    /// `initial_delay_ms * backoff_multiplier^(attempt - 2)`, capped at
    /// `max_delay_ms`. Attempt 1 runs immediately in the loop; the value for
    /// it is still defined (half the initial delay at multiplier 2).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let raw = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32 - 2);
        let capped = raw.min(self.max_delay_ms as f64).max(0.0);
        Duration::from_millis(capped as u64)
    }
}

/// Final classification of a failed operation.
#[derive(Debug, Clone)]
pub struct ClassifiedError {
    pub code: ErrorCode,
    pub message: String,
    pub retryable: bool,
}

/// Outcome of [`RetryEngine::execute_with_retry`]: the result plus how many
/// attempts it took.
#[derive(Debug)]
pub struct RetryReport<T> {
    pub attempts: u32,
    pub outcome: Result<T, ClassifiedError>,
}

/// Drives retryable operations to completion or exhaustion.
pub struct RetryEngine {
    policy: RetryPolicy,
    is_retryable: Box<dyn Fn(&BridgeError) -> bool + Send + Sync>,
}

impl RetryEngine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_predicate(policy, is_network_error)
    }

    /// Engine with a caller-supplied retryability predicate.
    pub fn with_predicate(
        policy: RetryPolicy,
        is_retryable: impl Fn(&BridgeError) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            policy,
            is_retryable: Box::new(is_retryable),
        }
    }

    /// Classifies an error that occurred outside the retry loop, using the
    /// engine's retryability predicate for the code mapping.
    pub fn classify_error(&self, error: &BridgeError) -> ClassifiedError {
        classify(error, (self.is_retryable)(error))
    }

    /// Runs `operation` up to `max_retries + 1` times. Attempt 1 runs
    /// immediately; each retry is preceded by a backoff sleep local to this
    /// task. A non-retryable failure aborts at once.
    pub async fn execute_with_retry<T, F, Fut>(&self, label: &str, operation: F) -> RetryReport<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, BridgeError>>,
    {
        let total_attempts = self.policy.max_retries + 1;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            if attempt > 1 {
                let delay = self.policy.delay_for_attempt(attempt);
                warn!(
                    label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
            }

            match operation().await {
                Ok(value) => {
                    return RetryReport {
                        attempts: attempt,
                        outcome: Ok(value),
                    };
                }
                Err(error) => {
                    let retryable = (self.is_retryable)(&error);
                    if retryable && attempt < total_attempts {
                        warn!(label, attempt, %error, "transient failure, will retry");
                        continue;
                    }
                    return RetryReport {
                        attempts: attempt,
                        outcome: Err(classify(&error, retryable)),
                    };
                }
            }
        }
    }
}

/// Default retryability predicate: typed network/timeout variants, then
/// message-substring matching.
pub fn is_network_error(error: &BridgeError) -> bool {
    if matches!(error, BridgeError::Network(_) | BridgeError::Timeout { .. }) {
        return true;
    }
    let message = error.to_string().to_lowercase();
    NETWORK_MARKERS.iter().any(|m| message.contains(m))
}

fn classify(error: &BridgeError, retryable: bool) -> ClassifiedError {
    let code = if retryable {
        ErrorCode::NetworkError
    } else {
        match error.code() {
            // Plain failures with no domain code of their own.
            ErrorCode::ProcessingError => ErrorCode::OperationFailed,
            code => code,
        }
    };
    ClassifiedError {
        code,
        message: error.to_string(),
        retryable,
    }
}
