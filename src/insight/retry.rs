use super::InsightService;
use super::error::InsightError;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{error, warn};

/// Attempts per prompt unless configured otherwise
pub const MAX_RETRIES: u32 = 3;

/// Bounded exponential backoff settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_backoff: Duration,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based): initial * 2^(attempt-1), capped
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Source of delays between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry loop states
#[derive(Debug)]
enum RetryState {
    Attempting { attempt: u32 },
    Backoff { attempt: u32, delay: Duration },
    Succeeded(String),
    Failed(InsightError),
}

/// Wraps an [`InsightService`] with bounded retries for transient failures.
///
/// Only errors where [`InsightError::is_retryable`] holds are retried. Exhausting
/// the attempts yields [`InsightError::Exhausted`] carrying the last failure.
pub struct RetryingService<S, Z = TokioSleeper> {
    inner: S,
    policy: RetryPolicy,
    sleeper: Z,
}

impl<S: InsightService> RetryingService<S, TokioSleeper> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self::with_sleeper(inner, policy, TokioSleeper)
    }
}

impl<S: InsightService, Z: Sleeper> RetryingService<S, Z> {
    pub fn with_sleeper(inner: S, policy: RetryPolicy, sleeper: Z) -> Self {
        Self {
            inner,
            policy,
            sleeper,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: InsightService, Z: Sleeper> InsightService for RetryingService<S, Z> {
    async fn generate(&self, prompt: &str, system_instruction: &str) -> Result<String, InsightError> {
        let started = Instant::now();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut state = RetryState::Attempting { attempt: 1 };

        loop {
            state = match state {
                RetryState::Attempting { attempt } => {
                    match self.inner.generate(prompt, system_instruction).await {
                        Ok(text) => RetryState::Succeeded(text),
                        Err(e) if !e.is_retryable() => RetryState::Failed(e),
                        Err(e) if attempt >= max_attempts => {
                            error!(attempts = attempt, error = %e, "max retries reached");
                            RetryState::Failed(InsightError::Exhausted {
                                attempts: attempt,
                                elapsed: started.elapsed(),
                                last: Box::new(e),
                            })
                        }
                        Err(e) => {
                            let delay = self.policy.backoff_for(attempt);
                            warn!(
                                attempt,
                                max_attempts,
                                delay_ms = delay.as_millis() as u64,
                                error = %e,
                                "retrying after transient error"
                            );
                            RetryState::Backoff { attempt, delay }
                        }
                    }
                }
                RetryState::Backoff { attempt, delay } => {
                    self.sleeper.sleep(delay).await;
                    RetryState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                RetryState::Succeeded(text) => return Ok(text),
                RetryState::Failed(e) => return Err(e),
            };
        }
    }
}
