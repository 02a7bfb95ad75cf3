//! Retry interceptor with exponential backoff
//!
//! A failed request moves through `Attempting -> Waiting -> Attempting ...`
//! until it succeeds or gives up. The attempt counter lives in the state
//! value itself and is threaded through [`RetryPolicy::transition`]; nothing
//! about a retry chain is stored on the shared client configuration.

use crate::config::SdkConfig;
use crate::error::{SdkError, SdkResult};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Deterministic exponential backoff without jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSchedule {
    base: Duration,
}

impl BackoffSchedule {
    /// Create a schedule with the given unit delay
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Delay before retry number `retry` (1-based): `base * 2^retry`.
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor)
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

/// State of a single retry chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Issuing attempt number `attempt` (0 for the first call)
    Attempting { attempt: u32 },
    /// Attempt `attempt` failed; sleeping `delay` before the next one
    Waiting { attempt: u32, delay: Duration },
    /// The request succeeded after `attempts` calls
    Succeeded { attempts: u32 },
    /// The chain gave up after `attempts` calls
    Exhausted { attempts: u32 },
}

impl RetryState {
    /// Whether no further transition can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, RetryState::Succeeded { .. } | RetryState::Exhausted { .. })
    }
}

/// Input driving a [`RetryState`] transition.
#[derive(Debug, Clone, Copy)]
pub enum RetryEvent<'a> {
    /// The current attempt returned a success status
    Succeeded,
    /// The current attempt failed with this error
    Failed(&'a SdkError),
    /// The backoff delay elapsed
    Slept,
}

/// Bounded retry policy for outbound requests.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_retries: u32,
    schedule: BackoffSchedule,
}

impl RetryPolicy {
    /// Create a policy allowing `max_retries` retries after the first call
    pub fn new(max_retries: u32, schedule: BackoffSchedule) -> Self {
        Self {
            max_retries,
            schedule,
        }
    }

    /// Build the policy described by the client configuration
    pub fn from_config(config: &SdkConfig) -> Self {
        Self::new(
            config.max_retries,
            BackoffSchedule::new(config.retry_base_delay),
        )
    }

    /// Maximum number of retries
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Backoff schedule used between retries
    pub fn schedule(&self) -> BackoffSchedule {
        self.schedule
    }

    /// Pure state transition of the retry state machine.
    ///
    /// Terminal states absorb every event, as do events that make no sense
    /// for the current state.
    pub fn transition(&self, state: RetryState, event: RetryEvent<'_>) -> RetryState {
        match (state, event) {
            (RetryState::Attempting { attempt }, RetryEvent::Succeeded) => {
                RetryState::Succeeded {
                    attempts: attempt + 1,
                }
            }
            (RetryState::Attempting { attempt }, RetryEvent::Failed(error)) => {
                if error.is_cancelled() || !error.is_retryable() || attempt >= self.max_retries {
                    RetryState::Exhausted {
                        attempts: attempt + 1,
                    }
                } else {
                    RetryState::Waiting {
                        attempt,
                        delay: self.schedule.delay(attempt + 1),
                    }
                }
            }
            (RetryState::Waiting { attempt, .. }, RetryEvent::Slept) => RetryState::Attempting {
                attempt: attempt + 1,
            },
            (state, _) => state,
        }
    }

    /// Run `operation` until it succeeds or the policy gives up.
    ///
    /// `operation` receives the attempt number. Cancelling `cancel` aborts
    /// both in-flight attempts and backoff sleeps with [`SdkError::Cancelled`];
    /// a cancelled chain is never retried.
    pub async fn execute<F, Fut, T>(&self, cancel: &CancellationToken, operation: F) -> SdkResult<T>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = SdkResult<T>>,
    {
        let mut state = RetryState::Attempting { attempt: 0 };
        let mut outcome: Option<SdkResult<T>> = None;

        while !state.is_terminal() {
            state = match state {
                RetryState::Attempting { attempt } => {
                    let result = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => Err(SdkError::Cancelled),
                        result = operation(attempt) => result,
                    };
                    let next = match &result {
                        Ok(_) => self.transition(state, RetryEvent::Succeeded),
                        Err(error) => self.transition(state, RetryEvent::Failed(error)),
                    };
                    outcome = Some(result);
                    next
                }
                RetryState::Waiting { attempt, delay } => {
                    info!(
                        retry = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying request"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            outcome = Some(Err(SdkError::Cancelled));
                            RetryState::Exhausted { attempts: attempt + 1 }
                        }
                        _ = tokio::time::sleep(delay) => self.transition(state, RetryEvent::Slept),
                    }
                }
                terminal => terminal,
            };
        }

        match (&state, &outcome) {
            (RetryState::Exhausted { attempts }, Some(Err(error))) => {
                if error.is_retryable() {
                    warn!(attempts, error = %error, "Max retries exhausted");
                } else {
                    debug!(attempts, error = %error, "Request failed without retry");
                }
            }
            (RetryState::Succeeded { attempts }, _) if *attempts > 1 => {
                info!(attempts, "Request succeeded after retry");
            }
            _ => {}
        }

        outcome.unwrap_or(Err(SdkError::Cancelled))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, BackoffSchedule::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn server_error() -> SdkError {
        SdkError::ServerError {
            status: 503,
            message: "unavailable".to_string(),
        }
    }

    #[test]
    fn test_backoff_doubles_from_two_seconds() {
        let schedule = BackoffSchedule::default();
        for attempt in 0..3u32 {
            assert_eq!(
                schedule.delay(attempt + 1),
                Duration::from_secs(2u64.pow(attempt + 1))
            );
        }
    }

    #[test]
    fn test_backoff_saturates() {
        let schedule = BackoffSchedule::new(Duration::from_secs(1));
        assert_eq!(schedule.delay(40), Duration::from_secs(u32::MAX as u64));
    }

    #[test]
    fn test_transition_waits_then_attempts_again() {
        let policy = RetryPolicy::default();
        let error = server_error();

        let waiting = policy.transition(
            RetryState::Attempting { attempt: 0 },
            RetryEvent::Failed(&error),
        );
        assert_eq!(
            waiting,
            RetryState::Waiting {
                attempt: 0,
                delay: Duration::from_secs(2)
            }
        );
        assert_eq!(
            policy.transition(waiting, RetryEvent::Slept),
            RetryState::Attempting { attempt: 1 }
        );
    }

    #[test]
    fn test_transition_exhausts_after_third_retry() {
        let policy = RetryPolicy::default();
        let error = server_error();

        assert_eq!(
            policy.transition(RetryState::Attempting { attempt: 3 }, RetryEvent::Failed(&error)),
            RetryState::Exhausted { attempts: 4 }
        );
    }

    #[test]
    fn test_transition_never_retries_cancellation() {
        let policy = RetryPolicy::default();
        for attempt in 0..=3 {
            assert_eq!(
                policy.transition(
                    RetryState::Attempting { attempt },
                    RetryEvent::Failed(&SdkError::Cancelled)
                ),
                RetryState::Exhausted {
                    attempts: attempt + 1
                }
            );
        }
    }

    #[test]
    fn test_terminal_states_absorb_events() {
        let policy = RetryPolicy::default();
        let done = RetryState::Succeeded { attempts: 1 };
        assert_eq!(policy.transition(done, RetryEvent::Slept), done);
        let error = server_error();
        let exhausted = RetryState::Exhausted { attempts: 4 };
        assert_eq!(policy.transition(exhausted, RetryEvent::Failed(&error)), exhausted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_retries_with_exponential_delays() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let result: SdkResult<()> = policy
            .execute(&CancellationToken::new(), |_| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(server_error())
                }
            })
            .await;

        assert!(matches!(result, Err(SdkError::ServerError { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 2s + 4s + 8s of backoff
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(14));
        assert!(elapsed < Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_succeeds_after_transient_failure() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute(&CancellationToken::new(), |attempt| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(SdkError::Timeout(Duration::from_secs(5)))
                    } else {
                        Ok("articles")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "articles");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_does_not_retry_client_errors() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(AtomicU32::new(0));

        let result: SdkResult<()> = policy
            .execute(&CancellationToken::new(), |_| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(SdkError::AuthenticationError("bad key".to_string()))
                }
            })
            .await;

        assert!(matches!(result, Err(SdkError::AuthenticationError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff_stops_the_chain() {
        let policy = RetryPolicy::default();
        let cancel = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let result: SdkResult<()> = policy
            .execute(&cancel, |_| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(server_error())
                }
            })
            .await;

        assert!(matches!(result, Err(SdkError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_token_never_calls() {
        let policy = RetryPolicy::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = Arc::new(AtomicU32::new(0));

        let result: SdkResult<()> = policy
            .execute(&cancel, |_| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        assert!(matches!(result, Err(SdkError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
