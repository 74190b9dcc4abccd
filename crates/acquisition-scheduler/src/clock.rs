//! Timing Primitive
//!
//! The scheduler only needs to read a monotonic clock and block until an
//! absolute deadline. [`MonotonicClock`] does that on the host;
//! [`ManualClock`] is a deterministic clock for tests.

use crate::error::TimerError;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Shortest period the host clock is trusted with (20 µs)
pub const MIN_PERIOD: Duration = Duration::from_micros(20);

/// Default window spent spinning before a deadline (50 µs)
pub const DEFAULT_SPIN_THRESHOLD: Duration = Duration::from_micros(50);

/// Monotonic clock with absolute-deadline waits
pub trait Clock: Send + Sync + 'static {
    /// Current time
    fn now(&self) -> Instant;

    /// Block until `deadline` has passed (returns at once if it already has)
    fn wait_until(&self, deadline: Instant);

    /// Refuse periods this clock cannot hold
    fn check_period(&self, period: Duration) -> Result<(), TimerError> {
        if period.is_zero() {
            return Err(TimerError::ZeroPeriod);
        }
        Ok(())
    }
}

/// Host monotonic clock
///
/// Sleeps until `spin_threshold` before the deadline, then spins. OS sleep
/// granularity is far coarser than a 125 µs period, so the tail must spin.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    spin_threshold: Duration,
}

impl MonotonicClock {
    /// Create a clock spinning for the last `spin_threshold` of each wait
    pub fn new(spin_threshold: Duration) -> Self {
        Self { spin_threshold }
    }

    /// Get the spin window
    pub fn spin_threshold(&self) -> Duration {
        self.spin_threshold
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new(DEFAULT_SPIN_THRESHOLD)
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wait_until(&self, deadline: Instant) {
        loop {
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            let remaining = deadline - now;
            if remaining > self.spin_threshold {
                std::thread::sleep(remaining - self.spin_threshold);
            } else {
                std::hint::spin_loop();
            }
        }
    }

    fn check_period(&self, period: Duration) -> Result<(), TimerError> {
        if period.is_zero() {
            return Err(TimerError::ZeroPeriod);
        }
        if period < MIN_PERIOD {
            return Err(TimerError::PeriodTooShort {
                period,
                min: MIN_PERIOD,
            });
        }
        Ok(())
    }
}

/// Clock that only moves when told to
///
/// `wait_until` jumps straight to the deadline, so a tick loop driven by it
/// runs as fast as the CPU allows while seeing perfectly regular time.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: Instant) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    /// Set time, ignoring moves into the past
    pub fn set(&self, to: Instant) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        if to > *now {
            *now = to;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait_until(&self, deadline: Instant) {
        self.set(deadline);
    }
}
