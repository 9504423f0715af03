//! Retry and backoff policy.
//!
//! A small, reusable retrying-call abstraction: the policy decides whether an
//! attempt may be repeated and how long to wait, the runner drives the loop.
//! The image fetcher is the only caller today, but nothing here knows about
//! HTTP.

mod policy;
mod run;

pub use policy::{RetryDecision, RetryPolicy};
pub use run::run_with_retry_sleeping;
