//! Linux spidev Transport
//!
//! Talks to the converter through the kernel's `/dev/spidevB.C` character
//! device. Each exchange is one `SPI_IOC_MESSAGE(1)` ioctl, which keeps chip
//! select asserted for all three bytes.

use crate::command::FRAME_LEN;
use crate::error::BusError;
use crate::transport::BusTransport;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use tracing::{debug, info};

/// Default spidev node (bus 0, chip select 0)
pub const DEFAULT_SPI_DEVICE: &str = "/dev/spidev0.0";

/// Default SPI clock (1 MHz)
pub const DEFAULT_SPI_SPEED_HZ: u32 = 1_000_000;

const SPI_IOC_MAGIC: libc::c_ulong = b'k' as libc::c_ulong;
const IOC_WRITE: libc::c_ulong = 1;

/// `_IOW(SPI_IOC_MAGIC, nr, size)`
const fn spi_iow(nr: libc::c_ulong, size: usize) -> libc::c_ulong {
    (IOC_WRITE << 30) | ((size as libc::c_ulong) << 16) | (SPI_IOC_MAGIC << 8) | nr
}

const SPI_IOC_WR_MODE: libc::c_ulong = spi_iow(1, 1);
const SPI_IOC_WR_BITS_PER_WORD: libc::c_ulong = spi_iow(3, 1);
const SPI_IOC_WR_MAX_SPEED_HZ: libc::c_ulong = spi_iow(4, 4);
const SPI_IOC_MESSAGE_1: libc::c_ulong = spi_iow(0, std::mem::size_of::<SpiIocTransfer>());

/// Matches `struct spi_ioc_transfer` from `linux/spi/spidev.h`
#[repr(C)]
#[derive(Debug, Default)]
struct SpiIocTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    pad: u8,
}

/// spidev configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpidevConfig {
    /// Device node path
    pub path: String,
    /// Maximum SPI clock in Hz
    pub speed_hz: u32,
    /// SPI mode (CPOL/CPHA), mode 0 for the converter
    pub mode: u8,
}

impl Default for SpidevConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_SPI_DEVICE.to_string(),
            speed_hz: DEFAULT_SPI_SPEED_HZ,
            mode: 0,
        }
    }
}

/// Converter attached to a Linux spidev node
#[derive(Debug)]
pub struct SpidevTransport {
    file: File,
    speed_hz: u32,
}

impl SpidevTransport {
    /// Open and configure the spidev node
    pub fn open(config: &SpidevConfig) -> Result<Self, BusError> {
        info!("Opening SPI device {} at {} Hz", config.path, config.speed_hz);

        let file = OpenOptions::new().read(true).write(true).open(&config.path)?;
        let transport = Self {
            file,
            speed_hz: config.speed_hz,
        };

        transport.write_config(SPI_IOC_WR_MODE, &config.mode)?;
        transport.write_config(SPI_IOC_WR_BITS_PER_WORD, &8u8)?;
        transport.write_config(SPI_IOC_WR_MAX_SPEED_HZ, &config.speed_hz)?;

        debug!("SPI device configured: mode {}, 8 bits per word", config.mode);
        Ok(transport)
    }

    fn write_config<V>(&self, request: libc::c_ulong, value: &V) -> Result<(), BusError> {
        // SAFETY: `value` is a live reference of the size encoded in `request`
        let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, value as *const V) };
        if ret < 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        Ok(())
    }
}

impl BusTransport for SpidevTransport {
    fn transfer(&mut self, tx: &[u8; FRAME_LEN]) -> Result<[u8; FRAME_LEN], BusError> {
        let mut rx = [0u8; FRAME_LEN];
        let xfer = SpiIocTransfer {
            tx_buf: tx.as_ptr() as u64,
            rx_buf: rx.as_mut_ptr() as u64,
            len: FRAME_LEN as u32,
            speed_hz: self.speed_hz,
            bits_per_word: 8,
            ..Default::default()
        };

        // SAFETY: both buffers outlive the call and are FRAME_LEN bytes long
        let ret = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                SPI_IOC_MESSAGE_1 as _,
                &xfer as *const SpiIocTransfer,
            )
        };
        if ret < 0 {
            let status = std::io::Error::last_os_error().raw_os_error().unwrap_or(-1);
            return Err(BusError::Transfer { status });
        }
        if ret as usize != FRAME_LEN {
            return Err(BusError::ShortTransfer {
                expected: FRAME_LEN,
                actual: ret as usize,
            });
        }
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ioctl_numbers() {
        assert_eq!(std::mem::size_of::<SpiIocTransfer>(), 32);
        assert_eq!(SPI_IOC_MESSAGE_1, 0x4020_6B00);
        assert_eq!(SPI_IOC_WR_MODE, 0x4001_6B01);
        assert_eq!(SPI_IOC_WR_MAX_SPEED_HZ, 0x4004_6B04);
    }

    #[test]
    fn test_open_missing_device() {
        let config = SpidevConfig {
            path: "/nonexistent/spidev9.9".to_string(),
            ..Default::default()
        };
        let err = SpidevTransport::open(&config).unwrap_err();
        assert_eq!(err, BusError::Transfer { status: libc::ENOENT });
    }
}
