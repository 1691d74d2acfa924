// Wall-clock sources
//
// Times are expressed as a `Duration` since the clock's own origin, so a
// manual clock and the system clock are interchangeable behind `Clock`.

use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

/// Source of wall-clock time for the frame pacer
pub trait Clock {
    /// Time elapsed since this clock's origin
    fn now(&self) -> Duration;

    /// Block for up to `duration`. May return early.
    fn sleep(&self, duration: Duration);
}

/// Monotonic host clock
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Manually driven clock
///
/// Time only moves when `advance`/`set` is called or when the pacer sleeps;
/// sleeping advances the clock by exactly the requested amount. Clones share
/// the same time, so a test can keep a handle while the pacer owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
    sleeps: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Create a manual clock starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    /// Jump to an absolute time
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    /// Number of times `sleep` has been called
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.set(self.sleeps.get() + 1);
        self.advance(duration);
    }
}
