//! ADC Command Encoding and Response Decoding
//!
//! One conversion is a 3-byte full-duplex exchange:
//!
//! | byte | sent                          | received                     |
//! |------|-------------------------------|------------------------------|
//! | 0    | start bit (`0x01`)            | don't care                   |
//! | 1    | `(SGL/DIFF \| channel) << 4`  | null bit + `B9 B8` in bits 1..0 |
//! | 2    | `0x00` (clocks the response)  | `B7..B0`                     |

use crate::error::BusError;
use serde::{Deserialize, Serialize};

/// Length of one command/response frame
pub const FRAME_LEN: usize = 3;

/// Start bit, alone in the first command byte
pub const START_BIT: u8 = 0x01;

/// Single-ended input select flag (upper bit of the control nibble)
pub const SINGLE_ENDED: u8 = 0x08;

/// Highest multiplexer channel of the converter
pub const MAX_CHANNEL: u8 = 7;

/// Largest 10-bit conversion result
pub const RAW_MAX: u16 = 0x03FF;

/// 8-bit unsigned PCM sample, the unit stored in the ring buffer
pub type Sample = u8;

/// One 10-bit conversion result (0-1023)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RawReading(u16);

impl RawReading {
    /// Wrap a raw value, rejecting anything wider than 10 bits
    pub fn new(value: u16) -> Option<Self> {
        if value <= RAW_MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Get the 10-bit value
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Keep the 8 most significant bits of the reading
    pub fn truncate(self) -> Sample {
        ((self.0 >> 2) & 0xFF) as Sample
    }

    /// Bytes a converter would clock out for this reading
    pub fn to_response(self) -> [u8; FRAME_LEN] {
        [0x00, (self.0 >> 8) as u8 & 0x03, (self.0 & 0xFF) as u8]
    }
}

/// Decode the 10-bit reading from a response frame
///
/// Only the two low bits of byte 1 carry data; the rest of that byte is
/// undefined on the wire and is masked off.
pub fn decode_response(rx: &[u8; FRAME_LEN]) -> RawReading {
    RawReading((((rx[1] & 0x03) as u16) << 8) | rx[2] as u16)
}

/// A single-ended conversion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdcCommand {
    channel: u8,
}

impl AdcCommand {
    /// The only request the acquisition path issues: channel 0, single-ended
    pub const CHANNEL_0: AdcCommand = AdcCommand { channel: 0 };

    /// Build a single-ended request for `channel`
    pub fn single_ended(channel: u8) -> Result<Self, BusError> {
        if channel > MAX_CHANNEL {
            return Err(BusError::InvalidChannel(channel));
        }
        Ok(Self { channel })
    }

    /// Get the selected channel
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Encode the request frame
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        [START_BIT, (SINGLE_ENDED | self.channel) << 4, 0x00]
    }
}

impl Default for AdcCommand {
    fn default() -> Self {
        Self::CHANNEL_0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_channel_0_command() {
        assert_eq!(AdcCommand::CHANNEL_0.to_bytes(), [0x01, 0x80, 0x00]);
        assert_eq!(AdcCommand::CHANNEL_0.to_bytes()[1], 8 << 4);
    }

    #[test]
    fn test_channel_select_nibble() {
        let cmd = AdcCommand::single_ended(5).unwrap();
        assert_eq!(cmd.to_bytes(), [0x01, 0xD0, 0x00]);
        assert_eq!(AdcCommand::single_ended(8), Err(BusError::InvalidChannel(8)));
    }

    #[test]
    fn test_decode_masks_undefined_bits() {
        // 0xFE: null bit and leftover bits set, only B9 B8 = 0b10 count
        let reading = decode_response(&[0xFF, 0xFE, 0x34]);
        assert_eq!(reading.value(), 0x234);
    }

    #[test]
    fn test_decode_full_scale() {
        assert_eq!(decode_response(&[0x00, 0x03, 0xFF]).value(), 1023);
        assert_eq!(decode_response(&[0x00, 0x00, 0x00]).value(), 0);
    }

    #[test]
    fn test_truncate_examples() {
        assert_eq!(RawReading::new(1023).unwrap().truncate(), 255);
        assert_eq!(RawReading::new(400).unwrap().truncate(), 100);
        assert_eq!(RawReading::new(4).unwrap().truncate(), 1);
        assert_eq!(RawReading::new(3).unwrap().truncate(), 0);
    }

    #[test]
    fn test_reading_rejects_eleven_bits() {
        assert!(RawReading::new(1024).is_none());
    }

    proptest! {
        #[test]
        fn truncate_keeps_top_eight_bits(raw in 0u16..=RAW_MAX) {
            let sample = RawReading::new(raw).unwrap().truncate();
            prop_assert_eq!(sample as u16, raw >> 2);
        }

        #[test]
        fn decode_reads_back_encoded_response(raw in 0u16..=RAW_MAX, noise in 0u8..=0x3F) {
            let mut rx = RawReading::new(raw).unwrap().to_response();
            rx[0] = noise;
            rx[1] |= noise << 2;
            prop_assert_eq!(decode_response(&rx).value(), raw);
        }
    }
}
