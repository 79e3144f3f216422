//! Retry policy: bounded attempts with full-jitter exponential backoff.
//!
//! One [`RetryPolicy`] governs one logical request. The delay before retry
//! `n` is drawn uniformly from `[0, min(max_delay, base_delay * 2^(n-1))]`.
//! Full jitter spreads concurrent retries out instead of synchronizing them.
//! When the server supplied a rate-limit hint, the hint acts as a floor on
//! the wait — it can lengthen the computed backoff but never shorten it.

use rand::Rng;
use std::time::Duration;

/// Bounds on re-attempts and backoff for one logical request.
///
/// # Examples
///
/// ```
/// use courtside::RetryPolicy;
/// use std::time::Duration;
///
/// // 4 total attempts, backoff ceiling 1s, 2s, 4s (capped at 10s).
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_retries, 3);
///
/// let aggressive = RetryPolicy {
///     max_retries: 5,
///     base_delay: Duration::from_millis(250),
///     max_delay: Duration::from_secs(30),
///     ..RetryPolicy::default()
/// };
/// assert_eq!(aggressive.max_retries, 5);
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries. Total attempts = `max_retries + 1`.
    pub max_retries: u32,

    /// Backoff ceiling for the first retry; doubles each retry after.
    pub base_delay: Duration,

    /// Upper bound on the backoff ceiling.
    pub max_delay: Duration,

    /// Upper bound applied to a server-supplied rate-limit hint, so a
    /// hostile or confused `Retry-After` cannot stall a request for hours.
    pub max_hint_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_hint_wait: Duration::from_secs(300),
        }
    }
}

impl RetryPolicy {
    /// Returns `true` if another attempt is allowed after `attempts_made`
    /// attempts have completed.
    pub fn allows_retry(&self, attempts_made: u32) -> bool {
        attempts_made <= self.max_retries
    }

    /// Computes the wait before the next attempt.
    ///
    /// `attempts_made` is the number of attempts already completed
    /// (1-indexed: 1 after the initial attempt failed). `hint` is the
    /// server-suggested wait from a 429 response, if any.
    pub fn backoff_delay(&self, attempts_made: u32, hint: Option<Duration>) -> Duration {
        let exponent = attempts_made.saturating_sub(1).min(31);
        let ceiling = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);
        let delay = ceiling.mul_f64(rand::thread_rng().gen::<f64>());

        match hint {
            Some(hint) => delay.max(hint.min(self.max_hint_wait)),
            None => delay,
        }
    }
}
