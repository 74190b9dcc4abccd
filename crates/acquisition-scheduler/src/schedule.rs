//! Self-Correcting Tick Schedule
//!
//! Deadlines live on a fixed grid `first + k * period`. Each tick computes
//! the next deadline from the previous deadline, never from the time the
//! tick finished, so per-tick latency does not accumulate into drift.

use std::time::{Duration, Instant};

/// Result of advancing the schedule past one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    /// Next deadline to arm
    pub deadline: Instant,
    /// Grid slots skipped because the tick ran past them
    pub overruns: u64,
}

/// Absolute-deadline schedule with a fixed period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    next_deadline: Instant,
    period: Duration,
}

impl TickSchedule {
    /// Create a schedule whose first deadline is `first_deadline`
    pub fn new(first_deadline: Instant, period: Duration) -> Self {
        Self {
            next_deadline: first_deadline,
            period,
        }
    }

    /// Create a schedule whose first deadline is one period after `now`
    pub fn starting_at(now: Instant, period: Duration) -> Self {
        Self::new(now + period, period)
    }

    /// Get the deadline currently armed
    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Get the period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Move to the deadline after the one that just fired
    ///
    /// The result is `previous + period`. If the tick ran so long that this
    /// slot is no longer in the future, whole periods are skipped until it
    /// is, keeping the grid phase.
    pub fn advance(&mut self, now: Instant) -> Advance {
        let mut deadline = self.next_deadline + self.period;
        let mut overruns = 0;

        if deadline <= now {
            let period_ns = self.period.as_nanos().max(1);
            let skipped = (now - deadline).as_nanos() / period_ns + 1;
            let step = (period_ns * skipped).min(u64::MAX as u128) as u64;
            deadline += Duration::from_nanos(step);
            overruns = skipped.min(u64::MAX as u128) as u64;
        }

        self.next_deadline = deadline;
        Advance { deadline, overruns }
    }
}
