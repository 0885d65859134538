//! Fixed-delay retry loop for one iteration's request
//!
//! Each failure is classified into a [`RetryAction`]:
//! - connection and API failures wait [`RetryConfig::retry_delay`] and try again while
//!   attempts remain,
//! - decode failures (and other transport errors) give up on the iteration at once,
//!   without waiting,
//! - anything else is fatal and is handed back to the caller.
//!
//! # Example
//!
//! ```no_run
//! use setu_fetch::config::RetryConfig;
//! use setu_fetch::retry::{Outcome, fetch_with_retry};
//! use setu_fetch::Error;
//!
//! # async fn example() -> Result<(), Error> {
//! let config = RetryConfig::default();
//! let outcome = fetch_with_retry(&config, |_attempt| async {
//!     Ok::<_, Error>(20usize)
//! })
//! .await?;
//! assert!(matches!(outcome, Outcome::Success { value: 20, .. }));
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use std::future::Future;

/// What to do after a failed attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryAction {
    /// Wait the retry delay, then try again if attempts remain
    RetryAfterDelay,
    /// Give up on the remaining attempts of this iteration immediately
    Abort,
    /// Stop the whole run
    Fatal,
}

/// Trait for errors that know how the retry loop should react to them
pub trait Classify {
    /// The reaction to this error
    fn retry_action(&self) -> RetryAction;
}

impl Classify for Error {
    fn retry_action(&self) -> RetryAction {
        match self {
            Error::Connect(_) | Error::Api { .. } => RetryAction::RetryAfterDelay,
            Error::Decode(_) | Error::Network(_) => RetryAction::Abort,
            Error::Io(_) | Error::Serialization(_) | Error::Config { .. } => RetryAction::Fatal,
        }
    }
}

/// Result of one iteration's attempts
#[derive(Debug)]
pub enum Outcome<T, E> {
    /// An attempt succeeded
    Success {
        /// The attempt's value
        value: T,
        /// Attempts used, including the successful one
        attempts: u32,
    },
    /// Every attempt failed with a retryable error
    Exhausted {
        /// Error from the final attempt
        last_error: E,
        /// Attempts used
        attempts: u32,
    },
    /// An attempt failed with an error that ends the iteration early
    Aborted {
        /// The error that stopped the iteration
        error: E,
        /// Attempts used, including the aborting one
        attempts: u32,
    },
}

impl<T, E> Outcome<T, E> {
    /// Number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            Outcome::Success { attempts, .. }
            | Outcome::Exhausted { attempts, .. }
            | Outcome::Aborted { attempts, .. } => *attempts,
        }
    }

    /// True if an attempt succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Run `operation` up to `config.max_attempts` times
///
/// The closure receives the 1-based attempt number. A `Fatal` error is returned as `Err`;
/// every other failure ends up in the returned [`Outcome`]. There is no wait after the
/// final attempt.
pub async fn fetch_with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
) -> Result<Outcome<T, E>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        tracing::debug!(attempt, max_attempts, "Sending request");

        let error = match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Request succeeded after retry");
                }
                return Ok(Outcome::Success {
                    value,
                    attempts: attempt,
                });
            }
            Err(e) => e,
        };

        match error.retry_action() {
            RetryAction::Fatal => return Err(error),
            RetryAction::Abort => {
                tracing::error!(
                    error = %error,
                    attempt,
                    max_attempts,
                    "Request failed, giving up on this iteration"
                );
                return Ok(Outcome::Aborted {
                    error,
                    attempts: attempt,
                });
            }
            RetryAction::RetryAfterDelay => {
                tracing::error!(error = %error, attempt, max_attempts, "Attempt failed");

                if attempt >= max_attempts {
                    tracing::error!("Max retries reached, moving to next iteration");
                    return Ok(Outcome::Exhausted {
                        last_error: error,
                        attempts: attempt,
                    });
                }

                tracing::info!(
                    delay_secs = config.retry_delay.as_secs_f64(),
                    "Waiting before retrying"
                );
                tokio::time::sleep(config.retry_delay).await;
            }
        }
    }
}
