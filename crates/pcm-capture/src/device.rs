//! Capture Stream Device
//!
//! The source side of a capture link: it accepts or refuses stream
//! parameters, starts and stops acquisition, and reports the hardware
//! pointer (the ring's write cursor).

use crate::error::CaptureError;
use crate::profile::{validate_profile, StreamProfile};
use acquisition_scheduler::{
    AcquisitionScheduler, AcquisitionState, Clock, MonotonicClock, TickSnapshot,
};
use adc_protocol::BusTransport;
use ring_buffer::SampleRing;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default device name
pub const ADC_DAI_NAME: &str = "adc-dai";

/// Default capture stream name
pub const ADC_STREAM_NAME: &str = "ADC Capture";

/// Trigger commands a stream device understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerCommand {
    /// Stop capturing (code 0)
    Stop,
    /// Start capturing (code 1)
    Start,
}

impl TryFrom<i32> for TriggerCommand {
    type Error = CaptureError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TriggerCommand::Stop),
            1 => Ok(TriggerCommand::Start),
            other => Err(CaptureError::UnsupportedTrigger(other)),
        }
    }
}

/// Capability of a capture source
pub trait StreamDevice {
    /// Device name used when linking
    fn name(&self) -> &str;

    /// Human-readable stream name
    fn stream_name(&self) -> &str;

    /// Accept or refuse the stream parameters
    fn hw_params(&mut self, profile: &StreamProfile) -> Result<(), CaptureError>;

    /// Start or stop the stream
    fn trigger(&mut self, cmd: TriggerCommand) -> Result<(), CaptureError>;

    /// Current write position in frames
    fn pointer(&self) -> usize;

    /// Ring size in frames
    fn buffer_size(&self) -> usize;

    /// Ring the stream is captured into
    fn ring(&self) -> &Arc<SampleRing>;
}

/// Stream device backed by the acquisition scheduler
pub struct AdcCaptureDevice<T, C = MonotonicClock> {
    name: String,
    stream_name: String,
    scheduler: AcquisitionScheduler<T, C>,
    profile: Option<StreamProfile>,
}

impl<T, C> AdcCaptureDevice<T, C>
where
    T: BusTransport + 'static,
    C: Clock,
{
    /// Wrap a scheduler with the default device names
    pub fn new(scheduler: AcquisitionScheduler<T, C>) -> Self {
        Self {
            name: ADC_DAI_NAME.to_string(),
            stream_name: ADC_STREAM_NAME.to_string(),
            scheduler,
            profile: None,
        }
    }

    /// Override the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Get the negotiated profile
    pub fn profile(&self) -> Option<StreamProfile> {
        self.profile
    }

    /// Get the acquisition state
    pub fn state(&self) -> AcquisitionState {
        self.scheduler.state()
    }

    /// Get tick statistics
    pub fn stats(&self) -> TickSnapshot {
        self.scheduler.stats()
    }

    /// Get the scheduler
    pub fn scheduler(&self) -> &AcquisitionScheduler<T, C> {
        &self.scheduler
    }
}

impl<T, C> StreamDevice for AdcCaptureDevice<T, C>
where
    T: BusTransport + 'static,
    C: Clock,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn stream_name(&self) -> &str {
        &self.stream_name
    }

    fn hw_params(&mut self, profile: &StreamProfile) -> Result<(), CaptureError> {
        if self.scheduler.is_running() {
            return Err(CaptureError::Busy);
        }
        if let Err(e) = validate_profile(profile) {
            warn!("{}: refusing stream parameters: {}", self.name, e);
            return Err(e.into());
        }
        debug!("{}: accepted {:?}", self.name, profile);
        self.profile = Some(*profile);
        Ok(())
    }

    fn trigger(&mut self, cmd: TriggerCommand) -> Result<(), CaptureError> {
        match cmd {
            TriggerCommand::Start => {
                if self.profile.is_none() {
                    return Err(CaptureError::NotConfigured);
                }
                self.scheduler.start()?;
                info!("{}: capture started", self.name);
            }
            TriggerCommand::Stop => {
                self.scheduler.stop();
            }
        }
        Ok(())
    }

    fn pointer(&self) -> usize {
        self.scheduler.position()
    }

    fn buffer_size(&self) -> usize {
        self.scheduler.ring().capacity()
    }

    fn ring(&self) -> &Arc<SampleRing> {
        self.scheduler.ring()
    }
}
