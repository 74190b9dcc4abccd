//! Sample Sinks
//!
//! The endpoint on the other side of a capture link. Sinks receive the
//! PCM bytes the reader copied out of the ring, in capture order.

use serde::Serialize;

/// U8 PCM silence level
pub const U8_SILENCE: u8 = 128;

/// Consumer of captured PCM
pub trait SampleSink {
    /// Take a block of newly captured samples
    fn consume(&mut self, samples: &[u8]);
}

impl SampleSink for Vec<u8> {
    fn consume(&mut self, samples: &[u8]) {
        self.extend_from_slice(samples);
    }
}

impl<S: SampleSink + ?Sized> SampleSink for &mut S {
    fn consume(&mut self, samples: &[u8]) {
        (**self).consume(samples);
    }
}

/// Level summary since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LevelReport {
    /// Samples seen
    pub samples: u64,
    /// Largest distance from silence (0-128)
    pub peak: u8,
    /// Root mean square distance from silence
    pub rms: f64,
}

/// Peak and RMS meter for U8 PCM
#[derive(Debug, Clone, Default)]
pub struct LevelMeter {
    samples: u64,
    peak: u8,
    sum_squares: u64,
}

impl LevelMeter {
    /// Create an empty meter
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarize what was consumed so far
    pub fn report(&self) -> LevelReport {
        let rms = if self.samples == 0 {
            0.0
        } else {
            (self.sum_squares as f64 / self.samples as f64).sqrt()
        };
        LevelReport {
            samples: self.samples,
            peak: self.peak,
            rms,
        }
    }

    /// Summarize and start over
    pub fn take_report(&mut self) -> LevelReport {
        let report = self.report();
        *self = Self::default();
        report
    }
}

impl SampleSink for LevelMeter {
    fn consume(&mut self, samples: &[u8]) {
        for &sample in samples {
            let level = sample.abs_diff(U8_SILENCE);
            self.peak = self.peak.max(level);
            self.sum_squares += level as u64 * level as u64;
        }
        self.samples += samples.len() as u64;
    }
}
