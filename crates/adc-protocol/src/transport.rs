//! Bus Transport Abstraction
//!
//! The codec only needs a synchronous 3-byte duplex exchange. Real hardware
//! goes through [`crate::SpidevTransport`]; tests and dry runs use
//! [`MockTransport`].

use crate::command::{RawReading, FRAME_LEN, RAW_MAX};
use crate::error::BusError;
use std::collections::VecDeque;
use tracing::debug;

/// Synchronous full-duplex exchange of one command frame
pub trait BusTransport: Send {
    /// Clock out `tx` and return the bytes clocked in at the same time
    fn transfer(&mut self, tx: &[u8; FRAME_LEN]) -> Result<[u8; FRAME_LEN], BusError>;
}

impl<T: BusTransport + ?Sized> BusTransport for Box<T> {
    fn transfer(&mut self, tx: &[u8; FRAME_LEN]) -> Result<[u8; FRAME_LEN], BusError> {
        (**self).transfer(tx)
    }
}

/// One scripted reply of the mock transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockReply {
    /// Answer with this 10-bit reading (masked to 10 bits)
    Reading(u16),
    /// Fail the exchange with this transport status
    Fail(i32),
}

/// Triangle-wave step used once the script runs dry
const WAVE_STEP: u16 = 8;

/// Mock converter for testing (no hardware required)
///
/// Replays scripted replies first, then produces a deterministic triangle
/// wave over the full 10-bit range.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: VecDeque<MockReply>,
    wave: u16,
    rising: bool,
    transactions: u64,
    last_command: Option<[u8; FRAME_LEN]>,
}

impl MockTransport {
    /// Create a mock that only generates the triangle wave
    pub fn new() -> Self {
        debug!("Creating mock ADC transport");
        Self {
            rising: true,
            ..Default::default()
        }
    }

    /// Create a mock that replays `replies` before falling back to the wave
    pub fn scripted(replies: impl IntoIterator<Item = MockReply>) -> Self {
        let mut mock = Self::new();
        mock.script.extend(replies);
        mock
    }

    /// Queue another reply
    pub fn push(&mut self, reply: MockReply) {
        self.script.push_back(reply);
    }

    /// Number of exchanges performed, failed ones included
    pub fn transactions(&self) -> u64 {
        self.transactions
    }

    /// Last command frame received
    pub fn last_command(&self) -> Option<[u8; FRAME_LEN]> {
        self.last_command
    }

    fn next_wave(&mut self) -> u16 {
        let value = self.wave;
        if self.rising {
            if self.wave + WAVE_STEP > RAW_MAX {
                self.rising = false;
            } else {
                self.wave += WAVE_STEP;
            }
        } else if self.wave < WAVE_STEP {
            self.rising = true;
        } else {
            self.wave -= WAVE_STEP;
        }
        value
    }
}

impl BusTransport for MockTransport {
    fn transfer(&mut self, tx: &[u8; FRAME_LEN]) -> Result<[u8; FRAME_LEN], BusError> {
        self.transactions += 1;
        self.last_command = Some(*tx);

        let value = match self.script.pop_front() {
            Some(MockReply::Reading(value)) => value & RAW_MAX,
            Some(MockReply::Fail(status)) => return Err(BusError::Transfer { status }),
            None => self.next_wave(),
        };

        // Masked above, always a valid reading
        let reading = RawReading::new(value).unwrap_or_default();
        Ok(reading.to_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{decode_response, AdcCommand};

    #[test]
    fn test_script_then_wave() {
        let mut mock = MockTransport::scripted([MockReply::Reading(700), MockReply::Fail(-5)]);
        let cmd = AdcCommand::CHANNEL_0.to_bytes();

        let rx = mock.transfer(&cmd).unwrap();
        assert_eq!(decode_response(&rx).value(), 700);
        assert_eq!(mock.transfer(&cmd), Err(BusError::Transfer { status: -5 }));

        let rx = mock.transfer(&cmd).unwrap();
        assert_eq!(decode_response(&rx).value(), 0);
        let rx = mock.transfer(&cmd).unwrap();
        assert_eq!(decode_response(&rx).value(), WAVE_STEP);

        assert_eq!(mock.transactions(), 4);
        assert_eq!(mock.last_command(), Some([0x01, 0x80, 0x00]));
    }

    #[test]
    fn test_wave_stays_in_range() {
        let mut mock = MockTransport::new();
        let cmd = AdcCommand::CHANNEL_0.to_bytes();
        let mut peak = 0;
        for _ in 0..1000 {
            let value = decode_response(&mock.transfer(&cmd).unwrap()).value();
            assert!(value <= RAW_MAX);
            peak = peak.max(value);
        }
        assert!(peak > RAW_MAX - WAVE_STEP);
    }

    #[test]
    fn test_boxed_transport() {
        let mut boxed: Box<dyn BusTransport> =
            Box::new(MockTransport::scripted([MockReply::Reading(4)]));
        let rx = boxed.transfer(&AdcCommand::CHANNEL_0.to_bytes()).unwrap();
        assert_eq!(decode_response(&rx).value(), 4);
    }
}
