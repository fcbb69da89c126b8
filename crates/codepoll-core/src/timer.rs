//! Cancellable timers owned by the controller loop.
//!
//! Each timer is a deadline the loop awaits inside `tokio::select!`. Disarmed
//! timers never complete, so cancelling is just clearing the deadline; nothing
//! is left running in the background after a stop.

use std::future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Deadlines past this horizon are clamped to it.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `at + delay` without overflowing; very long delays land on a far-future
/// deadline that never fires in practice.
pub fn deadline_after(at: Instant, delay: Duration) -> Instant {
    at.checked_add(delay.min(FAR_FUTURE))
        .or_else(|| at.checked_add(Duration::from_secs(86_400)))
        .unwrap_or(at)
}

/// One-shot deadline that can be rearmed or cancelled.
#[derive(Debug, Default)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or rearm) the timer for `at`.
    pub fn schedule_at(&mut self, at: Instant) {
        self.deadline = Some(at);
    }

    pub fn schedule_in(&mut self, delay: Duration) {
        self.schedule_at(deadline_after(Instant::now(), delay));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Completes at the deadline and disarms. Pending forever while disarmed.
    ///
    /// Cancel-safe: if dropped before completion the deadline stays armed.
    pub async fn fired(&mut self) -> Instant {
        match self.deadline {
            Some(at) => {
                sleep_until(at).await;
                self.deadline = None;
                at
            }
            None => future::pending().await,
        }
    }
}

/// Periodic deadline: first tick at `start_at`, then every `period`.
#[derive(Debug)]
pub struct RepeatingTimer {
    period: Duration,
    next: Option<Instant>,
}

impl RepeatingTimer {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start (or restart) ticking with the first tick at `at`.
    pub fn start_at(&mut self, at: Instant) {
        self.next = Some(at);
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub fn next_at(&self) -> Option<Instant> {
        self.next
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// Completes at the next tick and schedules the one after. Pending forever
    /// while cancelled. Cancel-safe like `Timer::fired`.
    pub async fn tick(&mut self) -> Instant {
        match self.next {
            Some(at) => {
                sleep_until(at).await;
                self.next = Some(deadline_after(at, self.period));
                at
            }
            None => future::pending().await,
        }
    }
}
