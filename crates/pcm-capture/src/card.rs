//! Capture Card
//!
//! Composes one source [`StreamDevice`] with one [`SampleSink`] endpoint.

use crate::device::{StreamDevice, TriggerCommand};
use crate::error::CaptureError;
use crate::profile::StreamProfile;
use crate::reader::PcmReader;
use crate::sink::SampleSink;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Description of the link between the platform interface and the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaiLink {
    /// Link name
    pub name: String,
    /// Stream name exposed to clients
    pub stream_name: String,
    /// Platform-side interface
    pub cpu_dai: String,
    /// Source device name
    pub codec_dai: String,
}

impl DaiLink {
    /// Link a source device to the given platform interface
    pub fn for_device<D: StreamDevice + ?Sized>(device: &D, cpu_dai: &str) -> Self {
        Self {
            name: "ADC Audio".to_string(),
            stream_name: device.stream_name().to_string(),
            cpu_dai: cpu_dai.to_string(),
            codec_dai: device.name().to_string(),
        }
    }
}

/// Capability of a sound card composed of a source and a sink
pub trait Card {
    /// Card name
    fn name(&self) -> &str;

    /// Negotiate the stream format with the source
    fn open(&mut self, profile: &StreamProfile) -> Result<(), CaptureError>;

    /// Start capturing
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop capturing
    fn stop(&mut self) -> Result<(), CaptureError>;

    /// Move newly captured samples to the sink, returning how many moved
    fn pump(&mut self) -> usize;
}

/// Single-link capture card
pub struct CaptureCard<D, S> {
    name: String,
    link: DaiLink,
    device: D,
    sink: S,
    reader: PcmReader,
}

impl<D: StreamDevice, S: SampleSink> CaptureCard<D, S> {
    /// Compose `device` and `sink` into a card
    pub fn new(name: &str, cpu_dai: &str, device: D, sink: S) -> Self {
        let link = DaiLink::for_device(&device, cpu_dai);
        let reader = PcmReader::new(device.ring());
        info!(
            "Card {} created: {} -> {} ({})",
            name, link.codec_dai, link.cpu_dai, link.stream_name
        );
        Self {
            name: name.to_string(),
            link,
            device,
            sink,
            reader,
        }
    }

    /// Get the link description
    pub fn link(&self) -> &DaiLink {
        &self.link
    }

    /// Get the source device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Get the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get the sink mutably
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Total samples delivered to the sink
    pub fn delivered(&self) -> u64 {
        self.reader.delivered()
    }
}

impl<D: StreamDevice, S: SampleSink> Card for CaptureCard<D, S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self, profile: &StreamProfile) -> Result<(), CaptureError> {
        self.device.hw_params(profile)
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        self.reader.resync(self.device.ring());
        self.device.trigger(TriggerCommand::Start)
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.device.trigger(TriggerCommand::Stop)?;
        // whatever the last ticks wrote still belongs to this run
        self.pump();
        Ok(())
    }

    fn pump(&mut self) -> usize {
        self.reader.poll(self.device.ring(), &mut self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::AdcCaptureDevice;
    use crate::sink::LevelMeter;
    use acquisition_scheduler::{AcquisitionScheduler, SchedulerConfig};
    use adc_protocol::{AdcCodec, MockReply, MockTransport};
    use ring_buffer::SampleRing;
    use std::sync::Arc;
    use std::time::Duration;

    fn card<S: SampleSink>(
        transport: MockTransport,
        sink: S,
    ) -> CaptureCard<AdcCaptureDevice<MockTransport>, S> {
        let ring = Arc::new(SampleRing::new(8192).unwrap());
        let scheduler =
            AcquisitionScheduler::new(AdcCodec::new(transport), ring, SchedulerConfig::default());
        CaptureCard::new("adc-card", "spi0.0", AdcCaptureDevice::new(scheduler), sink)
    }

    #[test]
    fn test_link_names() {
        let card = card(MockTransport::new(), Vec::<u8>::new());
        let link = card.link();
        assert_eq!(link.codec_dai, "adc-dai");
        assert_eq!(link.cpu_dai, "spi0.0");
        assert_eq!(link.stream_name, "ADC Capture");
        assert_eq!(card.name(), "adc-card");
    }

    #[test]
    fn test_open_rejects_bad_profile() {
        let mut card = card(MockTransport::new(), Vec::<u8>::new());
        let bad = StreamProfile {
            rate_hz: 44100,
            ..StreamProfile::ADC_PCM_U8
        };
        assert!(matches!(card.open(&bad), Err(CaptureError::Profile(_))));
        assert!(matches!(card.start(), Err(CaptureError::NotConfigured)));
    }

    #[test]
    fn test_capture_reaches_sink_in_order() {
        let script = (0..64u16).map(|i| MockReply::Reading(i * 4));
        let mut card = card(MockTransport::scripted(script), Vec::<u8>::new());
        card.open(&StreamProfile::ADC_PCM_U8).unwrap();
        card.start().unwrap();

        let mut pumped = 0;
        for _ in 0..20 {
            std::thread::sleep(Duration::from_millis(1));
            pumped += card.pump();
        }
        card.stop().unwrap();

        let captured = card.sink();
        assert!(captured.len() >= 64);
        assert_eq!(&captured[..64], &(0..64u8).collect::<Vec<_>>()[..]);
        assert_eq!(card.delivered(), captured.len() as u64);
        assert!(pumped as u64 <= card.delivered());
        assert_eq!(card.delivered(), card.device().stats().samples);
    }

    #[test]
    fn test_level_meter_sink() {
        let mut card = card(MockTransport::new(), LevelMeter::new());
        card.open(&StreamProfile::ADC_PCM_U8).unwrap();
        card.start().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        card.stop().unwrap();

        let report = card.sink_mut().take_report();
        assert!(report.samples > 0);
        // the mock triangle wave sweeps the full range
        assert!(report.peak > 0);
    }
}
