//! Countdown arithmetic shared by the controller and its tests.
//!
//! All functions are pure over `tokio::time::Instant` so they follow the
//! paused test clock.

use std::time::Duration;
use tokio::time::Instant;

/// Delay from a successful fetch until the countdown starts: `max(valid - threshold, 0)`.
pub fn countdown_start_delay(valid: Duration, threshold: Duration) -> Duration {
    valid.saturating_sub(threshold)
}

/// Signed seconds from `now` until `expiry` (negative once expired).
pub fn remaining_secs(expiry: Instant, now: Instant) -> f64 {
    if expiry >= now {
        (expiry - now).as_secs_f64()
    } else {
        -(now - expiry).as_secs_f64()
    }
}

/// Whole seconds to display, or `None` when the countdown should be blank.
///
/// Shown only while fewer than `threshold` seconds remain; past expiry reads 0.
pub fn countdown_display(expiry: Instant, now: Instant, threshold: Duration) -> Option<u64> {
    let remaining = remaining_secs(expiry, now);
    if remaining < threshold.as_secs_f64() {
        Some(remaining.max(0.0).round() as u64)
    } else {
        None
    }
}

/// True once the ticker should stop: strictly more than `threshold` remains.
///
/// A tick landing exactly on the threshold keeps ticking; that is where the
/// first tick lands for any `valid >= threshold`.
pub fn countdown_expired(expiry: Instant, now: Instant, threshold: Duration) -> bool {
    remaining_secs(expiry, now) > threshold.as_secs_f64()
}
