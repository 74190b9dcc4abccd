//! Stream Format Negotiation
//!
//! The source produces exactly one format. Anything else is refused before
//! capture starts.

use adc_protocol::profile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// PCM sample encodings a client may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// 8-bit unsigned, silence at 128
    U8,
    /// 8-bit signed
    S8,
    /// 16-bit signed little endian
    S16Le,
    /// 16-bit unsigned little endian
    U16Le,
}

impl SampleFormat {
    /// Bytes per sample
    pub fn width(&self) -> usize {
        match self {
            SampleFormat::U8 | SampleFormat::S8 => 1,
            SampleFormat::S16Le | SampleFormat::U16Le => 2,
        }
    }
}

/// Requested stream parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamProfile {
    /// Frames per second
    pub rate_hz: u32,
    /// Interleaved channels
    pub channels: u8,
    /// Sample encoding
    pub format: SampleFormat,
}

impl StreamProfile {
    /// The only profile the converter source supports: 8 kHz, mono, U8
    pub const ADC_PCM_U8: StreamProfile = StreamProfile {
        rate_hz: profile::SAMPLE_RATE_HZ,
        channels: profile::CHANNELS,
        format: SampleFormat::U8,
    };

    /// Stream bandwidth in bytes per second
    pub fn bytes_per_second(&self) -> usize {
        self.rate_hz as usize * self.channels as usize * self.format.width()
    }
}

impl Default for StreamProfile {
    fn default() -> Self {
        Self::ADC_PCM_U8
    }
}

/// Profile mismatch, naming the first offending field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidProfileError {
    #[error("Unsupported sample rate {0} Hz, source runs at 8000 Hz")]
    Rate(u32),

    #[error("Unsupported channel count {0}, source is mono")]
    Channels(u8),

    #[error("Unsupported sample format {0:?}, source produces U8")]
    Format(SampleFormat),
}

/// Accept only [`StreamProfile::ADC_PCM_U8`]
pub fn validate_profile(requested: &StreamProfile) -> Result<(), InvalidProfileError> {
    let supported = StreamProfile::ADC_PCM_U8;
    if requested.rate_hz != supported.rate_hz {
        return Err(InvalidProfileError::Rate(requested.rate_hz));
    }
    if requested.channels != supported.channels {
        return Err(InvalidProfileError::Channels(requested.channels));
    }
    if requested.format != supported.format {
        return Err(InvalidProfileError::Format(requested.format));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_fixed_profile() {
        assert!(validate_profile(&StreamProfile::ADC_PCM_U8).is_ok());
        assert_eq!(StreamProfile::ADC_PCM_U8.bytes_per_second(), 8000);
    }

    #[test]
    fn test_rejects_each_field() {
        let base = StreamProfile::ADC_PCM_U8;

        let rate = StreamProfile { rate_hz: 16000, ..base };
        assert_eq!(validate_profile(&rate), Err(InvalidProfileError::Rate(16000)));

        let stereo = StreamProfile { channels: 2, ..base };
        assert_eq!(validate_profile(&stereo), Err(InvalidProfileError::Channels(2)));

        let wide = StreamProfile {
            format: SampleFormat::S16Le,
            ..base
        };
        assert_eq!(
            validate_profile(&wide),
            Err(InvalidProfileError::Format(SampleFormat::S16Le))
        );
    }

    #[test]
    fn test_rate_checked_first() {
        let all_wrong = StreamProfile {
            rate_hz: 44100,
            channels: 2,
            format: SampleFormat::S16Le,
        };
        assert_eq!(validate_profile(&all_wrong), Err(InvalidProfileError::Rate(44100)));
    }
}
