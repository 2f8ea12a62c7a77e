//! Resilient dispatch of payloads to the provider.
//!
//! A [`Dispatcher`] sends one payload per call, classifies every attempt into
//! an [`Outcome`] and retries rate limits and transport failures with
//! exponential backoff plus jitter:
//!
//! ```text
//! Idle -> Attempting(0) -> Success                    (2xx)
//!                       -> Fatal(Provider)            (non-2xx, non-429)
//!                       -> Backoff -> Attempting(i+1) (429 / transport, attempts left)
//!                       -> Fatal(ExhaustedRetries)    (429 / transport, last attempt)
//! ```
//!
//! Retry state lives on the stack of [`Dispatcher::dispatch`]; concurrent
//! calls on one dispatcher never share it.

use std::time::Duration;

use rand::Rng;
use uuid::Uuid;

use crate::request::Payload;
use crate::transport::{ProviderResponse, Transport};
use crate::{mlog_debug, mlog_warn, Error, Result};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_JITTER_MS: u64 = 500;

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_jitter: Duration::from_millis(DEFAULT_MAX_JITTER_MS),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Default::default()
        }
    }

    /// Delay before the attempt following `attempt_index`:
    /// `2^attempt_index * base_delay + uniform[0, max_jitter)`.
    pub fn backoff_delay<R: Rng + ?Sized>(&self, attempt_index: u32, rng: &mut R) -> Duration {
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt_index));
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rng.gen_range(0..jitter_ms))
        };
        exponential + jitter
    }
}

/// Classification of a single attempt.
#[derive(Debug)]
pub enum Outcome {
    Success(String),
    RetryableFailure(Error),
    FatalFailure(Error),
}

impl Outcome {
    pub fn classify(result: Result<ProviderResponse>) -> Self {
        match result {
            Ok(response) if response.is_success() => Outcome::Success(response.body),
            Ok(response) => {
                let err = Error::Provider {
                    status: response.status,
                };
                if err.is_retryable() {
                    Outcome::RetryableFailure(err)
                } else {
                    Outcome::FatalFailure(err)
                }
            }
            Err(err) if err.is_retryable() => Outcome::RetryableFailure(err),
            Err(err) => Outcome::FatalFailure(err),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RetryState {
    attempt_index: u32,
    max_attempts: u32,
}

impl RetryState {
    fn new(max_attempts: u32) -> Self {
        Self {
            attempt_index: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    fn is_final_attempt(&self) -> bool {
        self.attempt_index + 1 >= self.max_attempts
    }

    fn attempts_made(&self) -> u32 {
        self.attempt_index + 1
    }
}

pub struct Dispatcher<T: Transport> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, RetryPolicy::default())
    }

    pub fn with_policy(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `payload` until it succeeds, fails fatally, or runs out of attempts.
    ///
    /// Returns the raw response body of the first 2xx response.
    ///
    /// # Errors
    ///
    /// - `Error::Provider` for any non-2xx status other than 429, after one attempt
    /// - `Error::ExhaustedRetries` when the final attempt is rate limited or
    ///   fails in transport
    pub async fn dispatch(&self, payload: &Payload) -> Result<String> {
        let id = Uuid::new_v4().to_string()[..8].to_string();
        let mut state = RetryState::new(self.policy.max_attempts);

        loop {
            mlog_debug!(
                "dispatch {}: attempt {}/{}",
                id,
                state.attempts_made(),
                state.max_attempts
            );

            match Outcome::classify(self.transport.send(payload).await) {
                Outcome::Success(body) => {
                    mlog_debug!(
                        "dispatch {}: success after {} attempt(s)",
                        id,
                        state.attempts_made()
                    );
                    return Ok(body);
                }
                Outcome::FatalFailure(err) => {
                    mlog_warn!("dispatch {}: fatal failure: {}", id, err);
                    return Err(err);
                }
                Outcome::RetryableFailure(err) if state.is_final_attempt() => {
                    mlog_warn!(
                        "dispatch {}: giving up after {} attempts: {}",
                        id,
                        state.attempts_made(),
                        err
                    );
                    return Err(Error::ExhaustedRetries {
                        attempts: state.attempts_made(),
                        last_error: err.to_string(),
                    });
                }
                Outcome::RetryableFailure(err) => {
                    let delay = self
                        .policy
                        .backoff_delay(state.attempt_index, &mut rand::thread_rng());
                    mlog_debug!(
                        "dispatch {}: {} - retrying in {}ms",
                        id,
                        err,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    state.attempt_index += 1;
                }
            }
        }
    }
}
