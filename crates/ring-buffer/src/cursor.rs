//! Consumer-side position tracking
//!
//! The ring only publishes its write cursor. A consumer keeps the cursor it
//! saw last time and treats the distance travelled since then, modulo the
//! capacity, as new data. A consumer that sleeps through a whole cycle sees
//! no new data at all; that loss is not detectable from the cursor alone.

use crate::SampleRing;

/// New samples since the previous poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Available {
    /// First new slot
    pub start: usize,
    /// Number of new samples
    pub len: usize,
}

impl Available {
    /// Check if nothing new arrived
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Remembers the last observed write cursor
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    last_pos: usize,
}

impl PositionTracker {
    /// Start tracking from the ring's current cursor
    pub fn new(ring: &SampleRing) -> Self {
        Self {
            last_pos: ring.current_position(),
        }
    }

    /// Start tracking from an explicit cursor value
    pub fn starting_at(pos: usize) -> Self {
        Self { last_pos: pos }
    }

    /// Get the last observed cursor
    pub fn last_position(&self) -> usize {
        self.last_pos
    }

    /// Snapshot the cursor and return the range written since the last poll
    pub fn poll(&mut self, ring: &SampleRing) -> Available {
        let pos = ring.current_position();
        let available = Available {
            start: self.last_pos,
            len: distance(self.last_pos, pos, ring.capacity()),
        };
        self.last_pos = pos;
        available
    }
}

/// `(pos - last) mod capacity`
pub fn distance(last: usize, pos: usize, capacity: usize) -> usize {
    (pos + capacity - last % capacity) % capacity
}
