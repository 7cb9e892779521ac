//! Clock and tick pacing utilities.
//!
//! Everything time-dependent in MouseKeys (toggle debounce, acceleration
//! ramps, tick cadence) works on monotonic [`Instant`]s. This module provides:
//! - A [`MonotonicClock`] abstraction with a system and a manual implementation
//! - A [`TickPacer`] for fixed-period loops anchored to absolute deadlines

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Source of monotonic instants.
pub trait MonotonicClock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The process monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl MonotonicClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Create a manual clock anchored to the current instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Paces a fixed-period loop.
///
/// Deadlines are absolute (`start + n * interval`) so sleep jitter does not
/// accumulate. When the loop falls more than one full interval behind, the
/// schedule is re-anchored to the current instant instead of firing a burst
/// of catch-up ticks.
#[derive(Debug)]
pub struct TickPacer {
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl TickPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_deadline: None,
        }
    }

    /// Create a pacer targeting the given Hz rate.
    pub fn from_hz(target_hz: u32) -> Self {
        Self::new(Duration::from_nanos(1_000_000_000 / target_hz.max(1) as u64))
    }

    /// Target interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Compute how long to wait from `now` before the next tick fires, and
    /// advance the schedule. The first call never waits.
    pub fn schedule(&mut self, now: Instant) -> Duration {
        match self.next_deadline {
            None => {
                self.next_deadline = Some(now + self.interval);
                Duration::ZERO
            }
            Some(deadline) if now >= deadline + self.interval => {
                // Fell behind by more than a whole period; re-anchor.
                self.next_deadline = Some(now + self.interval);
                Duration::ZERO
            }
            Some(deadline) => {
                self.next_deadline = Some(deadline + self.interval);
                deadline.saturating_duration_since(now)
            }
        }
    }

    /// Block the current thread until the next tick is due.
    pub fn wait(&mut self) {
        let delay = self.schedule(Instant::now());
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
