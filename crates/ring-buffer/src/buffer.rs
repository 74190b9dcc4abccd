//! Lock-Free Ring Buffer Implementation

use crate::RingError;
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};

/// Default buffer capacity (8192 samples = ~1 s at 8 kHz)
pub const DEFAULT_CAPACITY: usize = 8192;

/// Single-writer ring of 8-bit samples
///
/// `pos` is the slot that receives the next write. The writer stores the
/// sample first and publishes the advanced cursor with `Release`; a reader
/// that observes a cursor with `Acquire` sees every sample before it.
/// Neither side ever waits on the other.
pub struct SampleRing {
    /// Pre-allocated storage
    storage: Box<[AtomicU8]>,
    /// Write cursor, always in `[0, capacity)`
    pos: AtomicUsize,
    /// Total samples written (for statistics)
    total_written: AtomicU64,
}

impl SampleRing {
    /// Create a new ring with given capacity, zero-filled
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        if capacity == 0 {
            return Err(RingError::ZeroCapacity);
        }
        Ok(Self::allocate(capacity))
    }

    /// Create a ring with default capacity (8192 samples)
    pub fn with_default_capacity() -> Self {
        Self::allocate(DEFAULT_CAPACITY)
    }

    fn allocate(capacity: usize) -> Self {
        let storage: Vec<AtomicU8> = (0..capacity).map(|_| AtomicU8::new(0)).collect();
        Self {
            storage: storage.into_boxed_slice(),
            pos: AtomicUsize::new(0),
            total_written: AtomicU64::new(0),
        }
    }

    /// Store a sample at the cursor and advance it, overwriting the oldest
    /// sample once the ring is full
    ///
    /// Must only be called from one context at a time.
    pub fn write(&self, sample: u8) {
        let pos = self.pos.load(Ordering::Relaxed);
        self.storage[pos].store(sample, Ordering::Relaxed);
        self.pos.store((pos + 1) % self.storage.len(), Ordering::Release);
        self.total_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the slot that will receive the next write
    pub fn current_position(&self) -> usize {
        self.pos.load(Ordering::Acquire)
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Get total samples written (for statistics)
    pub fn total_written(&self) -> u64 {
        self.total_written.load(Ordering::Relaxed)
    }

    /// Read one slot, wrapping the index
    pub fn read_at(&self, index: usize) -> u8 {
        self.storage[index % self.storage.len()].load(Ordering::Relaxed)
    }

    /// Append `len` samples starting at slot `start` to `out`, wrapping
    /// past the end of the storage
    pub fn copy_range(&self, start: usize, len: usize, out: &mut Vec<u8>) {
        let capacity = self.storage.len();
        let len = len.min(capacity);
        out.reserve(len);
        for i in 0..len {
            out.push(self.storage[(start + i) % capacity].load(Ordering::Relaxed));
        }
    }

    /// Copy the whole storage in slot order
    pub fn snapshot(&self) -> Vec<u8> {
        self.storage.iter().map(|slot| slot.load(Ordering::Relaxed)).collect()
    }
}

impl std::fmt::Debug for SampleRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleRing")
            .field("capacity", &self.capacity())
            .field("pos", &self.current_position())
            .field("total_written", &self.total_written())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_zero_capacity() {
        assert_eq!(SampleRing::new(0).unwrap_err(), RingError::ZeroCapacity);
    }

    #[test]
    fn test_default_capacity() {
        let ring = SampleRing::with_default_capacity();
        assert_eq!(ring.capacity(), 8192);
        assert_eq!(ring.current_position(), 0);
    }

    #[test]
    fn test_write_and_wrap() {
        let ring = SampleRing::new(4).unwrap();
        for sample in [255, 1, 100, 0] {
            ring.write(sample);
        }
        assert_eq!(ring.snapshot(), vec![255, 1, 100, 0]);
        assert_eq!(ring.current_position(), 0);
        assert_eq!(ring.total_written(), 4);
    }

    #[test]
    fn test_overwrite_oldest() {
        let ring = SampleRing::new(4).unwrap();
        for sample in 1..=6 {
            ring.write(sample);
        }
        // 5 and 6 replaced 1 and 2
        assert_eq!(ring.snapshot(), vec![5, 6, 3, 4]);
        assert_eq!(ring.current_position(), 2);
    }

    #[test]
    fn test_full_cycle_replaces_content() {
        let ring = SampleRing::new(8).unwrap();
        for _ in 0..3 {
            ring.write(7);
        }
        let start = ring.current_position();
        for sample in 10..18 {
            ring.write(sample);
        }
        assert_eq!(ring.current_position(), start);
        let mut out = Vec::new();
        ring.copy_range(start, 8, &mut out);
        assert_eq!(out, (10..18).collect::<Vec<u8>>());
    }

    #[test]
    fn test_copy_range_wraps() {
        let ring = SampleRing::new(5).unwrap();
        for sample in 0..7 {
            ring.write(sample);
        }
        let mut out = Vec::new();
        ring.copy_range(3, 4, &mut out);
        assert_eq!(out, vec![3, 4, 5, 6]);
        assert_eq!(ring.read_at(7), 2);
    }

    #[test]
    fn test_concurrent_reader_sees_published_samples() {
        let ring = Arc::new(SampleRing::new(1024).unwrap());
        let writer = {
            let ring = Arc::clone(&ring);
            std::thread::spawn(move || {
                for i in 0..100_000u32 {
                    ring.write((i % 256) as u8);
                }
            })
        };

        while !writer.is_finished() {
            assert!(ring.current_position() < 1024);
        }
        writer.join().unwrap();
        assert_eq!(ring.current_position(), 100_000 % 1024);
        assert_eq!(ring.total_written(), 100_000);
    }

    proptest! {
        #[test]
        fn write_is_a_rotation(capacity in 1usize..64, pre in 0usize..200, k in 0usize..500) {
            let ring = SampleRing::new(capacity).unwrap();
            for _ in 0..pre {
                ring.write(0);
            }
            let pos0 = ring.current_position();
            for i in 0..k {
                ring.write(i as u8);
            }
            prop_assert_eq!(ring.current_position(), (pos0 + k) % capacity);
        }
    }
}
