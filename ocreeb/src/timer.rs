//! Timer service.
//!
//! The core never sleeps. Pending work is a due [`Instant`] which is compared with
//! [`Clock::now`] whenever the event loop ticks.

use core::cell::Cell;

use embassy_time::{Duration, Instant};

/// Monotonic millisecond clock
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Clock backed by the embassy time driver
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock which only moves when told to, for host simulation and tests
#[derive(Debug, Default)]
pub struct ManualClock {
    ticks: Cell<u64>,
}

impl ManualClock {
    pub const fn new() -> Self {
        Self { ticks: Cell::new(0) }
    }

    /// Set the current time in milliseconds
    pub fn set_millis(&self, ms: u64) {
        self.ticks.set(Instant::from_millis(ms).as_ticks());
    }

    pub fn advance(&self, duration: Duration) {
        self.ticks.set(self.ticks.get() + duration.as_ticks());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.ticks.get())
    }
}
