//! Time sources feeding `now` into the frame loop.
//!
//! Only monotonicity matters: timestamps must not go backwards while the clock
//! is enabled. After a disable/enable cycle the sequence may restart from a
//! fresh base.

use crate::Timestamp;
use std::cell::Cell;

/// Anything that can report the current timestamp in milliseconds.
pub trait ClockSource {
    fn now(&self) -> Timestamp;
}

/// Browser high-resolution clock (`performance.now()`).
///
/// Falls back to `Date.now()` where the Performance API is missing. Both share
/// no origin, so a host should stick to one source for a whole round.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceClock;

impl ClockSource for PerformanceClock {
    fn now(&self) -> Timestamp {
        gloo_utils::window()
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }
}

/// Clamps a raw timestamp stream into a non-decreasing one.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Cell<Option<Timestamp>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw frame timestamp; returns it, or the previous value if the
    /// raw clock stepped backwards.
    pub fn observe(&self, raw: Timestamp) -> Timestamp {
        let now = match self.last.get() {
            Some(last) if raw < last => last,
            _ => raw,
        };
        self.last.set(Some(now));
        now
    }

    pub fn last(&self) -> Option<Timestamp> {
        self.last.get()
    }

    /// Forget the base; the next `observe` starts a new enabled period.
    pub fn disable(&self) {
        self.last.set(None);
    }
}

/// Hand-driven clock for tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms.max(0.0));
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}
