//! PCM Capture Source
//!
//! Wires the periodic ADC acquisition into a capture stream: format
//! negotiation for the fixed 8 kHz mono U8 profile, a stream device that
//! starts and stops acquisition and reports the ring pointer, and a card
//! that drains new samples into a sink endpoint.

mod card;
mod device;
mod error;
mod profile;
mod reader;
mod settings;
mod sink;

pub use card::{Card, CaptureCard, DaiLink};
pub use device::{AdcCaptureDevice, StreamDevice, TriggerCommand, ADC_DAI_NAME, ADC_STREAM_NAME};
pub use error::CaptureError;
pub use profile::{validate_profile, InvalidProfileError, SampleFormat, StreamProfile};
pub use reader::PcmReader;
pub use settings::{CaptureConfig, TransportKind, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use sink::{LevelMeter, LevelReport, SampleSink, U8_SILENCE};
