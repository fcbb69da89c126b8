//! Code refresh controller.
//!
//! Owns the page, the code expiry and both timers. One refresh is in flight at
//! most: the next one is only scheduled once the previous fetch has been
//! applied. Lifecycle is explicit: `start()` spawns the loop, the returned
//! handle's `stop()` cancels every pending timer and hands back the final page.
//!
//! State machine: `Idle -> Fetching -> {Rendered, Retrying, Errored}`.
//! `Rendered` and `Retrying` always lead back to `Fetching`; `Errored` is terminal.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::CodepollConfig;
use crate::countdown::{countdown_display, countdown_expired, countdown_start_delay};
use crate::fetch::FetchError;
use crate::model::CodeSet;
use crate::page::Page;
use crate::render::Renderer;
use crate::retry::{self, RetryDecision, RetryPolicy};
use crate::source::CodeSource;
use crate::timer::{deadline_after, RepeatingTimer, Timer};

/// Timing and failure knobs for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Countdown is shown while fewer than this remain before expiry.
    pub countdown_threshold: Duration,
    /// Countdown tick period.
    pub tick_interval: Duration,
    /// Floor for the delay before the next refresh.
    pub min_refresh_interval: Duration,
    /// What to do after a failed fetch. Defaults to halting.
    pub retry: RetryPolicy,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&CodepollConfig::default())
    }
}

impl From<&CodepollConfig> for ControllerSettings {
    fn from(cfg: &CodepollConfig) -> Self {
        Self {
            countdown_threshold: cfg.countdown_threshold(),
            tick_interval: cfg.tick_interval(),
            min_refresh_interval: cfg.min_refresh_interval(),
            retry: RetryPolicy::from_config(cfg.retry.as_ref()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Fetching,
    Rendered,
    /// A fetch failed and another attempt is scheduled.
    Retrying { attempt: u32 },
    /// Fetching failed for good; the error message is on the page.
    Errored,
    Stopped,
}

impl ControllerState {
    /// True once the loop will do no further work.
    pub fn is_final(self) -> bool {
        matches!(self, ControllerState::Errored | ControllerState::Stopped)
    }
}

enum Event {
    Stop,
    Refresh,
    Tick,
}

pub struct Controller<S, R> {
    source: S,
    renderer: R,
    settings: ControllerSettings,
    page: Page,
    expiry: Option<Instant>,
    refresh_timer: Timer,
    countdown: RepeatingTimer,
    consecutive_failures: u32,
    state: ControllerState,
    state_tx: watch::Sender<ControllerState>,
}

impl<S: CodeSource, R: Renderer> Controller<S, R> {
    pub fn new(source: S, renderer: R, settings: ControllerSettings) -> Self {
        let (state_tx, _) = watch::channel(ControllerState::Idle);
        Self {
            source,
            renderer,
            countdown: RepeatingTimer::new(settings.tick_interval),
            settings,
            page: Page::new(),
            expiry: None,
            refresh_timer: Timer::new(),
            consecutive_failures: 0,
            state: ControllerState::Idle,
            state_tx,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state_tx.subscribe()
    }

    /// When the codes on the page rotate, if any were fetched.
    pub fn expiry(&self) -> Option<Instant> {
        self.expiry
    }

    pub fn next_refresh_at(&self) -> Option<Instant> {
        self.refresh_timer.deadline()
    }

    /// Next countdown tick (the countdown start right after a refresh).
    pub fn next_countdown_tick_at(&self) -> Option<Instant> {
        self.countdown.next_at()
    }

    /// Fetch once and apply the result: schedule the next refresh and the
    /// countdown, merge the codes and render; or handle the failure.
    pub async fn refresh(&mut self) {
        self.set_state(ControllerState::Fetching);
        let result = self.source.fetch().await;
        self.apply_fetch(result);
    }

    /// One countdown step: show the remaining whole seconds while under the
    /// threshold, blank otherwise, and stop ticking once strictly above it.
    pub fn countdown_tick(&mut self) {
        let threshold = self.settings.countdown_threshold;
        let Some(expiry) = self.expiry else {
            self.countdown.cancel();
            return;
        };
        let now = Instant::now();
        if countdown_expired(expiry, now, threshold) {
            self.countdown.cancel();
        }
        let before = self.page.countdown;
        self.page.show_countdown(countdown_display(expiry, now, threshold));
        if self.page.countdown != before {
            self.render();
        }
    }

    /// Spawn the controller loop; the first refresh happens immediately.
    pub fn start(mut self) -> ControllerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let state_rx = self.subscribe();
        self.refresh_timer.schedule_at(Instant::now());
        let task = tokio::spawn(self.run(stop_rx));
        ControllerHandle {
            stop_tx,
            state_rx,
            task,
        }
    }

    async fn run(mut self, mut stop_rx: watch::Receiver<bool>) -> Page {
        tracing::debug!(
            threshold = ?self.settings.countdown_threshold,
            tick = ?self.settings.tick_interval,
            "controller started"
        );
        while self.state != ControllerState::Errored {
            let event = tokio::select! {
                biased;
                _ = stop_rx.changed() => Event::Stop,
                _ = self.refresh_timer.fired() => Event::Refresh,
                _ = self.countdown.tick() => Event::Tick,
            };
            match event {
                Event::Stop => break,
                Event::Tick => self.countdown_tick(),
                Event::Refresh => {
                    self.set_state(ControllerState::Fetching);
                    let result = tokio::select! {
                        biased;
                        _ = stop_rx.changed() => None,
                        r = self.source.fetch() => Some(r),
                    };
                    match result {
                        Some(r) => self.apply_fetch(r),
                        None => break,
                    }
                }
            }
        }

        self.refresh_timer.cancel();
        self.countdown.cancel();
        if self.state != ControllerState::Errored {
            self.set_state(ControllerState::Stopped);
        }
        tracing::debug!(state = ?self.state, "controller finished");
        self.page
    }

    fn apply_fetch(&mut self, result: Result<CodeSet, FetchError>) {
        match result {
            Ok(set) => self.on_codes(set),
            Err(e) => self.on_failure(e),
        }
    }

    fn on_codes(&mut self, set: CodeSet) {
        let now = Instant::now();
        let valid = set.valid_for();
        let expiry = deadline_after(now, valid);
        self.consecutive_failures = 0;
        self.expiry = Some(expiry);
        self.refresh_timer.schedule_at(deadline_after(
            now,
            valid.max(self.settings.min_refresh_interval),
        ));
        self.countdown.start_at(deadline_after(
            now,
            countdown_start_delay(valid, self.settings.countdown_threshold),
        ));

        let outcome = self.page.apply_codes(&set);
        // Drop whatever the previous cycle's countdown left on screen.
        self.page.show_countdown(countdown_display(
            expiry,
            now,
            self.settings.countdown_threshold,
        ));
        tracing::debug!(
            updated = outcome.updated,
            appended = outcome.appended,
            valid = ?valid,
            "codes refreshed"
        );
        self.render();
        self.set_state(ControllerState::Rendered);
    }

    fn on_failure(&mut self, err: FetchError) {
        self.consecutive_failures += 1;
        let attempt = self.consecutive_failures;
        let kind = retry::classify(&err);
        match self.settings.retry.decide(attempt, kind) {
            RetryDecision::RetryAfter(delay) => {
                tracing::warn!(attempt, ?kind, ?delay, "fetching codes failed, retrying: {}", err);
                self.refresh_timer.schedule_in(delay);
                self.set_state(ControllerState::Retrying { attempt });
            }
            RetryDecision::NoRetry => {
                tracing::warn!(attempt, ?kind, "fetching codes failed, polling stopped: {}", err);
                self.refresh_timer.cancel();
                self.countdown.cancel();
                self.expiry = None;
                self.page.show_error();
                self.render();
                self.set_state(ControllerState::Errored);
            }
        }
    }

    fn render(&mut self) {
        if let Err(e) = self.renderer.render(&self.page) {
            tracing::warn!("render failed: {}", e);
        }
    }

    fn set_state(&mut self, state: ControllerState) {
        self.state = state;
        self.state_tx.send_replace(state);
    }
}

/// Handle to a running controller.
pub struct ControllerHandle {
    stop_tx: watch::Sender<bool>,
    state_rx: watch::Receiver<ControllerState>,
    task: JoinHandle<Page>,
}

impl ControllerHandle {
    pub fn state(&self) -> ControllerState {
        *self.state_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state_rx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel pending timers (and an in-flight fetch), then return the final page.
    pub async fn stop(self) -> Result<Page> {
        let _ = self.stop_tx.send(true);
        self.wait().await
    }

    /// Wait for the loop to end on its own (terminal error) and return the final page.
    pub async fn wait(self) -> Result<Page> {
        self.task.await.context("controller task failed")
    }
}
