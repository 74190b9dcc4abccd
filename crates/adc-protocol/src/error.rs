//! ADC Bus Error Types

use thiserror::Error;

/// Errors that can occur during a single ADC bus transaction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The duplex exchange failed with the given transport status (errno)
    #[error("SPI transfer failed with status {status}")]
    Transfer { status: i32 },

    /// The transport clocked fewer bytes than the frame needs
    #[error("Short SPI transfer: expected {expected} bytes, got {actual}")]
    ShortTransfer { expected: usize, actual: usize },

    /// Device error without an OS status code
    #[error("SPI device error: {0}")]
    Io(String),

    /// Channel outside the converter's multiplexer range
    #[error("ADC channel {0} does not exist")]
    InvalidChannel(u8),

    /// Transport was closed
    #[error("SPI device not open")]
    NotOpen,
}

impl From<std::io::Error> for BusError {
    fn from(err: std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(status) => BusError::Transfer { status },
            None => BusError::Io(err.to_string()),
        }
    }
}
