//! Scheduler Error Types

use std::time::Duration;
use thiserror::Error;

/// The timing primitive refused to arm
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// A zero period would tick forever without waiting
    #[error("Tick period must be non-zero")]
    ZeroPeriod,

    /// The clock cannot hold this cadence
    #[error("Tick period {period:?} is below the clock's minimum of {min:?}")]
    PeriodTooShort { period: Duration, min: Duration },

    /// The tick thread could not be created
    #[error("Failed to spawn tick thread: {0}")]
    Spawn(String),
}

/// Errors surfaced by scheduler control operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// Arming the periodic timer failed at start
    #[error("Failed to arm acquisition timer: {0}")]
    TimerArm(#[from] TimerError),

    /// A previous tick thread panicked while holding the codec
    #[error("ADC codec lost after tick thread failure")]
    CodecLost,
}
