//! Startup supervision of the storage connection.
//!
//! The supervisor is a small state machine:
//!
//! ```text
//! Attempting(n) --ping ok--> Ready(n)
//! Attempting(n) --ping err, n < max--> Backoff(n) --sleep--> Attempting(n + 1)
//! Attempting(n) --ping err, n = max--> Fatal(n)
//! ```
//!
//! Nothing is served until it reaches `Ready`; `Fatal` ends the process.

use std::time::Duration;

use super::store::{StorageProbe, StoreError};
use crate::utility::tracing_targets::TRACING_TARGET_BOOTSTRAP as TRACING_TARGET;

/// Bounded, fixed-interval retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of connection attempts, including the first.
    pub max_attempts: u32,
    /// Pause between two attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Creates a new policy. A zero attempt count is raised to one.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

/// Supervisor state. `Ready` and `Fatal` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// About to run attempt `n` (1-based).
    Attempting(u32),
    /// Attempt `n` failed; waiting before the next one.
    Backoff(u32),
    /// Attempt `n` succeeded.
    Ready(u32),
    /// All `n` attempts failed.
    Fatal(u32),
}

impl BootstrapState {
    /// Returns `true` for `Ready` and `Fatal`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready(_) | Self::Fatal(_))
    }
}

/// Startup could not reach storage.
#[derive(Debug, thiserror::Error)]
#[error("storage unreachable after {attempts} attempt(s): {last_error}")]
pub struct BootstrapError {
    pub attempts: u32,
    pub last_error: StoreError,
}

/// Drives a [`StorageProbe`] through the retry state machine.
#[derive(Debug, Clone)]
pub struct Supervisor {
    policy: RetryPolicy,
    state: BootstrapState,
}

impl Supervisor {
    /// Creates a supervisor poised for its first attempt.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: BootstrapState::Attempting(1),
        }
    }

    /// Returns the current state.
    #[inline]
    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Feeds the outcome of the current attempt into the state machine.
    ///
    /// Outside `Attempting` this is a no-op.
    pub fn record(&mut self, succeeded: bool) -> BootstrapState {
        if let BootstrapState::Attempting(attempt) = self.state {
            self.state = if succeeded {
                BootstrapState::Ready(attempt)
            } else if attempt >= self.policy.max_attempts {
                BootstrapState::Fatal(attempt)
            } else {
                BootstrapState::Backoff(attempt)
            };
        }

        self.state
    }

    /// Leaves `Backoff` for the next attempt. No-op in any other state.
    pub fn resume(&mut self) -> BootstrapState {
        if let BootstrapState::Backoff(attempt) = self.state {
            self.state = BootstrapState::Attempting(attempt + 1);
        }

        self.state
    }

    /// Pings until storage answers or the attempts run out.
    ///
    /// Returns the number of attempts it took.
    pub async fn run<P>(mut self, probe: &P) -> Result<u32, BootstrapError>
    where
        P: StorageProbe + ?Sized,
    {
        loop {
            let attempt = match self.state {
                BootstrapState::Attempting(attempt) => attempt,
                BootstrapState::Backoff(_) => {
                    tokio::time::sleep(self.policy.backoff).await;
                    self.resume();
                    continue;
                }
                BootstrapState::Ready(attempts) => return Ok(attempts),
                // Only reachable through `record`, which returns below.
                BootstrapState::Fatal(attempts) => {
                    return Err(BootstrapError {
                        attempts,
                        last_error: StoreError::Unavailable("no attempt recorded".into()),
                    });
                }
            };

            tracing::info!(
                target: TRACING_TARGET,
                attempt,
                max_attempts = self.policy.max_attempts,
                "Connecting to storage"
            );

            match probe.ping().await {
                Ok(()) => {
                    self.record(true);
                    tracing::info!(target: TRACING_TARGET, attempt, "Storage is reachable");
                }
                Err(error) => match self.record(false) {
                    BootstrapState::Fatal(attempts) => {
                        tracing::error!(
                            target: TRACING_TARGET,
                            attempts,
                            error = %error,
                            "Giving up on storage"
                        );
                        return Err(BootstrapError {
                            attempts,
                            last_error: error,
                        });
                    }
                    _ => tracing::warn!(
                        target: TRACING_TARGET,
                        attempt,
                        backoff_secs = self.policy.backoff.as_secs_f64(),
                        error = %error,
                        "Storage not reachable yet, retrying"
                    ),
                },
            }
        }
    }
}
