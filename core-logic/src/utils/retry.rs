use crate::traits::Outcome;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Message reported when transport-level failures exhaust the attempt bound.
pub const MAX_RETRIES_MESSAGE: &str = "Max retries";

/// Bounded exponential backoff: attempts are numbered from 1 and the wait
/// before attempt `k + 1` is `unit * 2^k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries: max_retries.max(1),
            ..Default::default()
        }
    }

    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff_unit.saturating_mul(factor)
    }

    pub fn start(&self) -> RetryState {
        RetryState::Attempting { attempt: 1 }
    }

    /// Transition out of `Attempting { attempt }` given that attempt's verdict.
    pub fn advance(&self, attempt: u32, verdict: AttemptVerdict) -> RetryState {
        match verdict {
            AttemptVerdict::Terminal(outcome) => RetryState::Terminal(outcome),
            AttemptVerdict::Retryable { on_exhausted } => {
                if attempt >= self.max_retries {
                    RetryState::Terminal(Outcome::fail(on_exhausted))
                } else {
                    RetryState::Backoff {
                        attempt,
                        delay: self.backoff_delay(attempt),
                    }
                }
            }
        }
    }
}

/// Classification of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptVerdict {
    /// Stop now with this outcome (success, unauthorized, unusable response).
    Terminal(Outcome),
    /// Try again if attempts remain; otherwise fail with `on_exhausted`.
    Retryable { on_exhausted: String },
}

impl AttemptVerdict {
    pub fn retry_as(message: impl Into<String>) -> Self {
        Self::Retryable {
            on_exhausted: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState {
    Attempting { attempt: u32 },
    Backoff { attempt: u32, delay: Duration },
    Terminal(Outcome),
}

/// Drives `attempt_fn` through the policy's state machine until a terminal outcome.
pub async fn run_with_policy<F, Fut>(
    policy: RetryPolicy,
    operation_name: &str,
    mut attempt_fn: F,
) -> Outcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AttemptVerdict>,
{
    let mut state = policy.start();
    loop {
        state = match state {
            RetryState::Attempting { attempt } => {
                let verdict = attempt_fn(attempt).await;
                policy.advance(attempt, verdict)
            }
            RetryState::Backoff { attempt, delay } => {
                debug!(
                    "{} failed (attempt {}/{}). Retrying in {:?}",
                    operation_name, attempt, policy.max_retries, delay
                );
                tokio::time::sleep(delay).await;
                RetryState::Attempting {
                    attempt: attempt + 1,
                }
            }
            RetryState::Terminal(outcome) => return outcome,
        };
    }
}
