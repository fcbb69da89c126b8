use std::time::Duration;

use crate::config::RetryConfig;

/// High-level classification of a fetch failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Network-level failure (connection refused, DNS, reset).
    Connection,
    /// HTTP status that is retryable but not strictly throttling (5xx).
    Http5xx(u16),
    /// Anything else (4xx, malformed payload). Never retried.
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up; the controller shows the error and goes inert.
    NoRetry,
    /// Fetch again after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff policy with caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of consecutive attempts (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::halt()
    }
}

impl RetryPolicy {
    /// Single attempt: the first failure is final.
    pub fn halt() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Build from the optional `[retry]` config section; `None` means halt.
    pub fn from_config(cfg: Option<&RetryConfig>) -> Self {
        match cfg {
            None => Self::halt(),
            Some(r) => {
                let max_delay = Duration::from_secs(r.max_delay_secs);
                // NaN and negatives mean no delay; anything too big for a Duration is the cap.
                let base_delay = if r.base_delay_secs.is_nan() || r.base_delay_secs <= 0.0 {
                    Duration::ZERO
                } else {
                    Duration::try_from_secs_f64(r.base_delay_secs).unwrap_or(max_delay)
                };
                Self {
                    max_attempts: r.max_attempts.max(1),
                    base_delay: base_delay.min(max_delay),
                    max_delay,
                }
            }
        }
    }

    /// Decide what to do after failed attempt number `attempt` (1-based).
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::Other => RetryDecision::NoRetry,
            ErrorKind::Timeout
            | ErrorKind::Connection
            | ErrorKind::Throttled
            | ErrorKind::Http5xx(_) => {
                // base * 2^(attempt-1), capped.
                let exp = 1u32 << attempt.saturating_sub(1).min(8);
                let delay = self.base_delay.saturating_mul(exp).min(self.max_delay);
                RetryDecision::RetryAfter(delay)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> RetryPolicy {
        RetryPolicy::from_config(Some(&RetryConfig {
            max_attempts: 5,
            base_delay_secs: 0.5,
            max_delay_secs: 4,
        }))
    }

    #[test]
    fn default_policy_never_retries() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(1, ErrorKind::Connection), RetryDecision::NoRetry);
        assert_eq!(p.decide(1, ErrorKind::Timeout), RetryDecision::NoRetry);
    }

    #[test]
    fn no_retry_for_other() {
        assert_eq!(enabled().decide(1, ErrorKind::Other), RetryDecision::NoRetry);
    }

    #[test]
    fn exponential_backoff_grows_and_is_capped() {
        let p = enabled();
        assert_eq!(
            p.decide(1, ErrorKind::Timeout),
            RetryDecision::RetryAfter(Duration::from_millis(500))
        );
        assert_eq!(
            p.decide(2, ErrorKind::Timeout),
            RetryDecision::RetryAfter(Duration::from_secs(1))
        );
        assert_eq!(
            p.decide(4, ErrorKind::Throttled),
            RetryDecision::RetryAfter(Duration::from_secs(4))
        );
    }

    #[test]
    fn respects_max_attempts() {
        let p = enabled();
        assert!(matches!(
            p.decide(4, ErrorKind::Http5xx(502)),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(5, ErrorKind::Http5xx(502)), RetryDecision::NoRetry);
    }

    #[test]
    fn oversized_base_delay_is_capped() {
        for base_delay_secs in [f64::INFINITY, 1e30] {
            let p = RetryPolicy::from_config(Some(&RetryConfig {
                max_attempts: 3,
                base_delay_secs,
                max_delay_secs: 30,
            }));
            assert_eq!(p.base_delay, Duration::from_secs(30));
            assert_eq!(
                p.decide(1, ErrorKind::Connection),
                RetryDecision::RetryAfter(Duration::from_secs(30))
            );
        }
    }

    #[test]
    fn zero_attempts_in_config_means_one() {
        let p = RetryPolicy::from_config(Some(&RetryConfig {
            max_attempts: 0,
            base_delay_secs: 1.0,
            max_delay_secs: 1,
        }));
        assert_eq!(p.max_attempts, 1);
        assert_eq!(p.decide(1, ErrorKind::Connection), RetryDecision::NoRetry);
    }
}
