// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Fixed-window rate gate.
//!
//! Admission is decided under a single lock covering rollover detection and
//! the check-and-increment of the admitted count, so no two callers can both
//! take the last slot of a window.
//!
//! Waiting callers pass through a FIFO queue first. Only the head of the
//! queue evaluates the window while it is saturated; it sleeps until the
//! exact end of the window with the state lock released, then re-validates.

use crate::error::GateError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::debug;

/// "At most `limit` admissions per `duration`". Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    limit: u32,
    duration: Duration,
}

impl Window {
    /// Validate and build a window.
    pub fn new(limit: u32, duration: Duration) -> Result<Self, GateError> {
        if limit == 0 {
            return Err(GateError::InvalidConfig("limit must be positive"));
        }
        if duration.is_zero() {
            return Err(GateError::InvalidConfig("duration must be positive"));
        }
        if Instant::now().checked_add(duration).is_none() {
            return Err(GateError::InvalidConfig("duration is too large"));
        }
        Ok(Self { limit, duration })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// Mutable window bookkeeping. Only ever touched under `RateGate::state`.
#[derive(Debug, Default)]
struct GateState {
    /// Start of the current window; `None` until the first admission attempt.
    window_start: Option<Instant>,
    /// Admissions recorded against `window_start`, in `0..=limit`.
    admitted: u32,
}

/// Outcome of one evaluation of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Admitted,
    /// Window is saturated until the given instant, or for good when its end
    /// is past what the clock can represent.
    Saturated(Option<Instant>),
}

impl GateState {
    /// Roll the window if it has expired, then try to take a slot.
    fn admit(&mut self, window: &Window, now: Instant) -> Admission {
        let current = self.window_start;
        let start = match current {
            Some(start) if window_end(start, window).map_or(true, |end| now < end) => start,
            previous => {
                if previous.is_some() {
                    debug!(admitted = self.admitted, "window rolled over");
                }
                self.window_start = Some(now);
                self.admitted = 0;
                now
            }
        };

        if self.admitted < window.limit {
            self.admitted += 1;
            Admission::Admitted
        } else {
            Admission::Saturated(window_end(start, window))
        }
    }
}

/// End of the window opened at `start`; `None` if it lies beyond the clock's range.
fn window_end(start: Instant, window: &Window) -> Option<Instant> {
    start.checked_add(window.duration)
}

/// Sleep until the window ends. A window that never ends never wakes.
async fn wait_for_rollover(until: Option<Instant>) {
    match until {
        Some(until) => sleep_until(until).await,
        None => std::future::pending().await,
    }
}

/// Thread-safe admission gate.
///
/// Clones share the same window state and wait queue.
#[derive(Debug, Clone)]
pub struct RateGate {
    window: Window,
    state: Arc<Mutex<GateState>>,
    /// FIFO turnstile; the holder is the only caller allowed to wait on the window.
    queue: Arc<Mutex<()>>,
}

impl RateGate {
    /// Create a gate admitting at most `limit` callers per `duration`.
    pub fn new(limit: u32, duration: Duration) -> Result<Self, GateError> {
        Ok(Self::with_window(Window::new(limit, duration)?))
    }

    /// Create a gate from an already validated window.
    pub fn with_window(window: Window) -> Self {
        Self {
            window,
            state: Arc::new(Mutex::new(GateState::default())),
            queue: Arc::new(Mutex::new(())),
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn limit(&self) -> u32 {
        self.window.limit
    }

    pub fn duration(&self) -> Duration {
        self.window.duration
    }

    /// Wait until a slot is reserved for the caller.
    pub async fn acquire(&self) {
        let _ticket = self.queue.lock().await;
        while let Admission::Saturated(until) = self.evaluate().await {
            wait_for_rollover(until).await;
        }
    }

    /// Wait until a slot is reserved, or until `cancel` completes.
    ///
    /// A cancelled call leaves the gate exactly as if it had never been made.
    /// If `cancel` is already complete the call fails without evaluating the
    /// window, even when a slot is free.
    pub async fn acquire_with<F>(&self, cancel: F) -> Result<(), GateError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        let _ticket = tokio::select! {
            biased;
            () = &mut cancel => return Err(GateError::Cancelled),
            ticket = self.queue.lock() => ticket,
        };

        loop {
            let until = match self.evaluate().await {
                Admission::Admitted => return Ok(()),
                Admission::Saturated(until) => until,
            };

            tokio::select! {
                biased;
                () = &mut cancel => return Err(GateError::Cancelled),
                () = wait_for_rollover(until) => {}
            }
        }
    }

    /// Wait at most `max_wait` for a slot. Expiry is reported as `Cancelled`.
    pub async fn acquire_timeout(&self, max_wait: Duration) -> Result<(), GateError> {
        self.acquire_with(sleep(max_wait)).await
    }

    /// Take a slot only if one is free right now and nobody is queued ahead.
    pub async fn try_acquire(&self) -> bool {
        let Ok(_ticket) = self.queue.try_lock() else {
            return false;
        };
        self.evaluate().await == Admission::Admitted
    }

    async fn evaluate(&self) -> Admission {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let admission = state.admit(&self.window, now);
        if let Admission::Saturated(until) = admission {
            debug!(
                limit = self.window.limit,
                wait_ms = until
                    .map(|until| until.saturating_duration_since(now).as_millis())
                    .map_or(u64::MAX, |ms| u64::try_from(ms).unwrap_or(u64::MAX)),
                "window saturated"
            );
        }
        admission
    }
}
