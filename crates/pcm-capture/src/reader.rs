//! Consumer Read Path
//!
//! Polls the ring's write cursor and hands everything written since the
//! previous poll to a sink. Runs in the consumer's own context; it never
//! blocks the tick.

use crate::sink::SampleSink;
use ring_buffer::{PositionTracker, SampleRing};
use tracing::trace;

/// Copies newly captured samples out of the ring
#[derive(Debug, Default)]
pub struct PcmReader {
    tracker: PositionTracker,
    scratch: Vec<u8>,
    delivered: u64,
}

impl PcmReader {
    /// Start reading from the ring's current cursor
    pub fn new(ring: &SampleRing) -> Self {
        Self {
            tracker: PositionTracker::new(ring),
            scratch: Vec::with_capacity(ring.capacity()),
            delivered: 0,
        }
    }

    /// Forget unread data and continue from the current cursor
    pub fn resync(&mut self, ring: &SampleRing) {
        self.tracker = PositionTracker::new(ring);
    }

    /// Deliver new samples to `sink`, returning how many were delivered
    pub fn poll<S: SampleSink + ?Sized>(&mut self, ring: &SampleRing, sink: &mut S) -> usize {
        let available = self.tracker.poll(ring);
        if available.is_empty() {
            return 0;
        }

        self.scratch.clear();
        ring.copy_range(available.start, available.len, &mut self.scratch);
        sink.consume(&self.scratch);
        self.delivered += available.len as u64;

        trace!("Delivered {} samples from slot {}", available.len, available.start);
        available.len
    }

    /// Total samples delivered
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_poll_delivers_in_order() {
        let ring = SampleRing::new(8).unwrap();
        let mut reader = PcmReader::new(&ring);
        let mut sink: Vec<u8> = Vec::new();

        for sample in 0..6 {
            ring.write(sample);
        }
        assert_eq!(reader.poll(&ring, &mut sink), 6);

        for sample in 6..10 {
            ring.write(sample);
        }
        assert_eq!(reader.poll(&ring, &mut sink), 4);
        assert_eq!(sink, (0..10).collect::<Vec<u8>>());
        assert_eq!(reader.delivered(), 10);

        assert_eq!(reader.poll(&ring, &mut sink), 0);
    }

    #[test]
    fn test_resync_skips_stale_data() {
        let ring = SampleRing::new(8).unwrap();
        let mut reader = PcmReader::new(&ring);
        for sample in 0..3 {
            ring.write(sample);
        }
        reader.resync(&ring);
        ring.write(42);

        let mut sink: Vec<u8> = Vec::new();
        reader.poll(&ring, &mut sink);
        assert_eq!(sink, vec![42]);
    }

    proptest! {
        #[test]
        fn polling_within_a_cycle_loses_nothing(
            capacity in 2usize..64,
            chunks in proptest::collection::vec(0usize..64, 0..40)
        ) {
            let ring = SampleRing::new(capacity).unwrap();
            let mut reader = PcmReader::new(&ring);
            let mut written = Vec::new();
            let mut sink: Vec<u8> = Vec::new();
            let mut next = 0u8;

            for chunk in chunks {
                // a poll must come before the cursor laps the reader
                for _ in 0..chunk % capacity {
                    ring.write(next);
                    written.push(next);
                    next = next.wrapping_add(1);
                }
                reader.poll(&ring, &mut sink);
            }

            prop_assert_eq!(sink, written);
        }
    }
}
