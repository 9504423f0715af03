//! Retry loop: run a closure until success or policy says stop.

use std::time::Duration;

use super::policy::{RetryDecision, RetryPolicy};

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On failure, calls `sleep` with the backoff duration then tries again.
///
/// The closure receives the 1-based attempt number. Production passes
/// `std::thread::sleep`; tests count the delays instead.
pub fn run_with_retry_sleeping<T, E, F, S>(
    policy: &RetryPolicy,
    mut sleep: S,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
    S: FnMut(Duration),
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(d) => {
                    sleep(d);
                    attempt += 1;
                }
            },
        }
    }
}
