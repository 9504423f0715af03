use std::time::Duration;

use crate::config::RetryConfig;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Stop and report the last error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Fixed-count retry with a constant backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay between two consecutive attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from the optional `[retry]` config section.
    pub fn from_config(cfg: Option<&RetryConfig>) -> Self {
        match cfg {
            Some(c) => Self {
                max_attempts: c.max_attempts.max(1),
                backoff: Duration::from_secs_f64(c.backoff_secs.max(0.0)),
            },
            None => Self::default(),
        }
    }

    /// Decide what to do after `attempt` failed.
    ///
    /// `attempt` is 1-based. The final attempt never sleeps.
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            RetryDecision::NoRetry
        } else {
            RetryDecision::RetryAfter(self.backoff)
        }
    }
}
