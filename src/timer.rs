//! Match countdown shown on the overlay.
//!
//! The timer keeps its own clock and never touches tournament state; the
//! snapshot service only reads it through [`TimerSource`].

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Default match length.
pub const DEFAULT_MATCH_SECONDS: u64 = 180;

/// Read-only view of a countdown.
pub trait TimerSource: Send + Sync {
    fn status(&self) -> TimerStatus;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStatus {
    /// Configured match length in seconds.
    pub duration: u64,
    /// Seconds left, rounded up so a fresh timer shows the full duration.
    pub remaining: u64,
    pub is_running: bool,
}

#[derive(Debug)]
struct Clock {
    duration: Duration,
    /// Time consumed by earlier runs that were paused.
    banked: Duration,
    running_since: Option<Instant>,
}

impl Clock {
    fn elapsed(&self, now: Instant) -> Duration {
        let live = self
            .running_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or_default();
        (self.banked + live).min(self.duration)
    }

    fn expired(&self, now: Instant) -> bool {
        self.elapsed(now) >= self.duration
    }
}

/// Start / pause / reset countdown.
#[derive(Debug)]
pub struct MatchTimer {
    clock: Mutex<Clock>,
}

impl MatchTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            clock: Mutex::new(Clock {
                duration,
                banked: Duration::ZERO,
                running_since: None,
            }),
        }
    }

    pub fn from_secs(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }

    /// Start or resume. Does nothing once the countdown has run out.
    pub fn start(&self) -> TimerStatus {
        let now = Instant::now();
        let mut clock = self.clock.lock().expect("timer lock poisoned");
        if clock.running_since.is_none() && !clock.expired(now) {
            clock.running_since = Some(now);
            tracing::debug!("match timer started");
        }
        status_at(&clock, now)
    }

    pub fn pause(&self) -> TimerStatus {
        let now = Instant::now();
        let mut clock = self.clock.lock().expect("timer lock poisoned");
        if clock.running_since.is_some() {
            let banked = clock.elapsed(now);
            clock.banked = banked;
            clock.running_since = None;
            tracing::debug!(elapsed = ?banked, "match timer paused");
        }
        status_at(&clock, now)
    }

    /// Stop and rewind to the full duration.
    pub fn reset(&self) -> TimerStatus {
        let now = Instant::now();
        let mut clock = self.clock.lock().expect("timer lock poisoned");
        clock.banked = Duration::ZERO;
        clock.running_since = None;
        tracing::debug!("match timer reset");
        status_at(&clock, now)
    }
}

impl TimerSource for MatchTimer {
    fn status(&self) -> TimerStatus {
        let clock = self.clock.lock().expect("timer lock poisoned");
        status_at(&clock, Instant::now())
    }
}

fn status_at(clock: &Clock, now: Instant) -> TimerStatus {
    let remaining = clock.duration - clock.elapsed(now);
    TimerStatus {
        duration: clock.duration.as_secs(),
        remaining: remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0),
        is_running: clock.running_since.is_some() && !clock.expired(now),
    }
}
