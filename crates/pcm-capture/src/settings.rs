//! Capture configuration

use crate::error::CaptureError;
use acquisition_scheduler::SchedulerConfig;
use adc_protocol::profile::PERIOD_NS;
use ring_buffer::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "adc-capture";

/// Environment variable prefix (`ADC_CAPTURE_SPI_DEVICE`, `ADC_CAPTURE_SCHEDULER__THREAD_NAME`)
pub const ENV_PREFIX: &str = "ADC_CAPTURE";

/// Which bus transport to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Linux spidev node
    Spidev,
    /// Simulated converter
    Mock,
}

/// Capture configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Bus transport
    pub transport: TransportKind,

    /// spidev node path
    pub spi_device: String,

    /// SPI clock in Hz
    pub spi_speed_hz: u32,

    /// Ring capacity in samples
    pub buffer_capacity: usize,

    /// Consumer poll interval (milliseconds)
    pub poll_interval_ms: u64,

    /// Level/statistics log interval (seconds)
    pub report_interval_s: u64,

    /// Tick thread settings
    pub scheduler: SchedulerConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Spidev,
            spi_device: "/dev/spidev0.0".to_string(),
            spi_speed_hz: 1_000_000,
            buffer_capacity: DEFAULT_CAPACITY,
            poll_interval_ms: 20,
            report_interval_s: 5,
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl CaptureConfig {
    /// Load defaults, then the config file, then environment overrides
    ///
    /// Without `path` an `adc-capture.{toml,json,yaml}` in the working
    /// directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self, CaptureError> {
        let file = match path {
            Some(path) => ::config::File::from(path).required(true),
            None => ::config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = ::config::Config::builder()
            .add_source(file)
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;
        debug!("Loaded capture config: {:?}", loaded);
        Ok(loaded)
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml_str(toml: &str) -> Result<Self, CaptureError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
            .build()?;
        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.buffer_capacity == 0 {
            return Err(CaptureError::Config("buffer_capacity must be non-zero".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(CaptureError::Config("poll_interval_ms must be non-zero".to_string()));
        }
        // the consumer must come back before the ring wraps
        let ring_span_ms = u64::try_from(self.buffer_capacity)
            .ok()
            .and_then(|capacity| capacity.checked_mul(PERIOD_NS))
            .map(|span_ns| span_ns / 1_000_000)
            .ok_or_else(|| {
                CaptureError::Config(format!(
                    "buffer_capacity {} is too large",
                    self.buffer_capacity
                ))
            })?;
        if self.poll_interval_ms >= ring_span_ms {
            return Err(CaptureError::Config(format!(
                "poll_interval_ms {} is not shorter than one ring cycle ({} ms)",
                self.poll_interval_ms, ring_span_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.buffer_capacity, 8192);
        assert_eq!(config.transport, TransportKind::Spidev);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CaptureConfig::from_toml_str(
            r#"
            transport = "mock"
            poll_interval_ms = 10

            [scheduler]
            thread_name = "adc-test"
            "#,
        )
        .unwrap();

        assert_eq!(config.transport, TransportKind::Mock);
        assert_eq!(config.poll_interval_ms, 10);
        assert_eq!(config.scheduler.thread_name, "adc-test");
        assert_eq!(config.spi_device, "/dev/spidev0.0");
    }

    #[test]
    fn test_poll_slower_than_ring_cycle_rejected() {
        // 64 samples at 8 kHz wrap every 8 ms
        let result = CaptureConfig::from_toml_str(
            r#"
            buffer_capacity = 64
            poll_interval_ms = 20
            "#,
        );
        assert!(matches!(result, Err(CaptureError::Config(_))));
    }

    #[test]
    fn test_tick_period_not_configurable() {
        let result = CaptureConfig::from_toml_str(
            r#"
            [scheduler]
            period_ns = 1000000
            "#,
        );
        assert!(matches!(result, Err(CaptureError::Config(_))));
    }

    #[test]
    fn test_huge_buffer_capacity_rejected() {
        let config = CaptureConfig {
            buffer_capacity: usize::MAX,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CaptureError::Config(_))));

        let result = CaptureConfig::from_toml_str("buffer_capacity = 9223372036854775807");
        assert!(matches!(result, Err(CaptureError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = CaptureConfig::load(Some(Path::new("/nonexistent/adc-capture.toml")));
        assert!(matches!(result, Err(CaptureError::Config(_))));
    }
}
