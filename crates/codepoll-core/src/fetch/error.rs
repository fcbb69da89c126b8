//! Fetch error type, kept typed so the retry policy can classify it.

use thiserror::Error;

/// Error returned by a single `/codes/` fetch.
///
/// Every variant surfaces to the user as the same "Error loading codes" message;
/// the variant only matters for logging and retry classification.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Body was not a valid codes payload.
    #[error("malformed codes payload: {0}")]
    Parse(#[from] serde_json::Error),
    /// The blocking fetch task panicked or was cancelled.
    #[error("fetch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
