//! Capture Error Types

use crate::profile::InvalidProfileError;
use acquisition_scheduler::SchedulerError;
use thiserror::Error;

/// Errors from the capture device and card
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Requested stream format does not match the source
    #[error("Invalid stream profile: {0}")]
    Profile(#[from] InvalidProfileError),

    /// Acquisition could not be started
    #[error("Acquisition error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Trigger before a profile was accepted
    #[error("Stream parameters not configured")]
    NotConfigured,

    /// Parameters changed while capturing
    #[error("Stream is running")]
    Busy,

    /// Trigger code other than start/stop
    #[error("Unsupported trigger command {0}")]
    UnsupportedTrigger(i32),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<::config::ConfigError> for CaptureError {
    fn from(err: ::config::ConfigError) -> Self {
        CaptureError::Config(err.to_string())
    }
}
