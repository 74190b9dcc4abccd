//! ADC Bus Protocol Implementation
//!
//! This crate provides the SPI command/response codec for MCP3008-style
//! 10-bit converters. Readings are truncated to 8-bit unsigned PCM for the
//! fixed 8 kHz mono capture profile.

mod codec;
mod command;
mod error;
#[cfg(target_os = "linux")]
mod spidev;
mod transport;

pub use codec::AdcCodec;
pub use command::{decode_response, AdcCommand, RawReading, Sample, FRAME_LEN, RAW_MAX};
pub use error::BusError;
#[cfg(target_os = "linux")]
pub use spidev::{SpidevConfig, SpidevTransport, DEFAULT_SPI_DEVICE, DEFAULT_SPI_SPEED_HZ};
pub use transport::{BusTransport, MockReply, MockTransport};

/// Fixed capture profile constants
pub mod profile {
    /// Sample rate in Hz
    pub const SAMPLE_RATE_HZ: u32 = 8000;
    /// Channel count
    pub const CHANNELS: u8 = 1;
    /// Bits per stored sample
    pub const SAMPLE_BITS: u8 = 8;
    /// Sampling period in nanoseconds (125 µs)
    pub const PERIOD_NS: u64 = 1_000_000_000 / SAMPLE_RATE_HZ as u64;
}
