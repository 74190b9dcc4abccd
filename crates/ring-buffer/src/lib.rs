//! Lock-Free Sample Ring
//!
//! Provides the fixed-capacity circular store shared between the sampling
//! tick and the stream consumer. The tick is the only writer; the consumer
//! only ever reads the write cursor and copies out what it has not seen.

mod buffer;
mod cursor;

pub use buffer::{SampleRing, DEFAULT_CAPACITY};
pub use cursor::{Available, PositionTracker};

use thiserror::Error;

/// Errors building a ring
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    /// A ring needs at least one slot
    #[error("Ring capacity must be non-zero")]
    ZeroCapacity,
}
