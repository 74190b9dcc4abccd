//! Tick Statistics

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated from the tick context
#[derive(Debug, Default)]
pub struct TickStats {
    ticks: AtomicU64,
    samples: AtomicU64,
    bus_errors: AtomicU64,
    overruns: AtomicU64,
}

/// Point-in-time copy of [`TickStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickSnapshot {
    /// Ticks executed
    pub ticks: u64,
    /// Samples written to the ring
    pub samples: u64,
    /// Bus transactions that failed (no sample for that tick)
    pub bus_errors: u64,
    /// Grid slots skipped because a tick ran long
    pub overruns: u64,
}

impl TickStats {
    pub(crate) fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sample(&self) {
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_bus_error(&self) {
        self.bus_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_overruns(&self, count: u64) {
        self.overruns.fetch_add(count, Ordering::Relaxed);
    }

    /// Copy the counters
    pub fn snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            samples: self.samples.load(Ordering::Relaxed),
            bus_errors: self.bus_errors.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }
}

impl TickSnapshot {
    /// Fraction of ticks that produced no sample
    pub fn drop_ratio(&self) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        self.bus_errors as f64 / self.ticks as f64
    }
}
