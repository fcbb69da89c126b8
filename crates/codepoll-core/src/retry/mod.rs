//! Retry and backoff policy for failed fetches.
//!
//! Off by default: a failed fetch halts polling unless the config carries a
//! `[retry]` section. When enabled, failures are classified (timeouts,
//! throttling, connection failures) and retried with exponential backoff.

mod classify;
mod policy;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
