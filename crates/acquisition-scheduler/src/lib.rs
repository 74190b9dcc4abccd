//! ADC Acquisition Scheduler
//!
//! Runs the converter at a fixed cadence on a dedicated tick thread and
//! feeds each sample into the shared ring. Deadlines follow an absolute grid
//! so scheduling latency never turns into drift.

mod clock;
mod error;
mod schedule;
mod scheduler;
mod stats;

pub use clock::{Clock, ManualClock, MonotonicClock, DEFAULT_SPIN_THRESHOLD, MIN_PERIOD};
pub use error::{SchedulerError, TimerError};
pub use schedule::{Advance, TickSchedule};
pub use scheduler::{
    AcquisitionScheduler, AcquisitionState, SchedulerConfig, TickContext, TICK_PERIOD,
};
pub use stats::{TickSnapshot, TickStats};
