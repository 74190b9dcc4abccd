//! ADC Codec
//!
//! Performs one request/response exchange per call and turns the reply into
//! an 8-bit PCM sample. No buffering and no retries: a failed exchange is
//! reported once and the caller decides what to do with the slot.

use crate::command::{decode_response, AdcCommand, RawReading, Sample, FRAME_LEN};
use crate::error::BusError;
use crate::transport::BusTransport;

/// Single-channel converter codec over a bus transport
#[derive(Debug)]
pub struct AdcCodec<T> {
    transport: T,
    command: [u8; FRAME_LEN],
}

impl<T: BusTransport> AdcCodec<T> {
    /// Create a codec reading channel 0 in single-ended mode
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            command: AdcCommand::CHANNEL_0.to_bytes(),
        }
    }

    /// Acquire one sample (exactly one bus transaction)
    pub fn acquire(&mut self) -> Result<Sample, BusError> {
        self.acquire_raw().map(RawReading::truncate)
    }

    /// Acquire one full 10-bit reading (exactly one bus transaction)
    pub fn acquire_raw(&mut self) -> Result<RawReading, BusError> {
        let rx = self.transport.transfer(&self.command)?;
        Ok(decode_response(&rx))
    }

    /// Get the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the transport mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.transport
    }
}
