//! ADC Capture Daemon
//!
//! Opens the converter, negotiates the capture profile, runs acquisition and
//! drains the ring on a tokio interval until asked to shut down.

use acquisition_scheduler::{AcquisitionScheduler, TickSnapshot};
use adc_protocol::{AdcCodec, BusTransport, MockTransport};
use anyhow::Context;
use pcm_capture::{
    AdcCaptureDevice, CaptureCard, CaptureConfig, Card, LevelMeter, StreamProfile, TransportKind,
};
use ring_buffer::SampleRing;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Card type the daemon runs
pub type AdcCard = CaptureCard<AdcCaptureDevice<Box<dyn BusTransport>>, LevelMeter>;

/// Platform interface the source is linked to
pub const CPU_DAI: &str = "spi0.0";

/// Initialize logging (`RUST_LOG` filter, INFO by default)
pub fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

/// Open the configured bus transport
pub fn open_transport(config: &CaptureConfig) -> anyhow::Result<Box<dyn BusTransport>> {
    match config.transport {
        TransportKind::Mock => {
            info!("Using simulated converter");
            Ok(Box::new(MockTransport::new()))
        }
        #[cfg(target_os = "linux")]
        TransportKind::Spidev => {
            let spi = adc_protocol::SpidevConfig {
                path: config.spi_device.clone(),
                speed_hz: config.spi_speed_hz,
                ..Default::default()
            };
            let transport = adc_protocol::SpidevTransport::open(&spi)
                .with_context(|| format!("Failed to open SPI device {}", config.spi_device))?;
            Ok(Box::new(transport))
        }
        #[cfg(not(target_os = "linux"))]
        TransportKind::Spidev => anyhow::bail!("spidev transport requires Linux"),
    }
}

/// Build the capture card around `transport`
pub fn build_card(
    config: &CaptureConfig,
    transport: Box<dyn BusTransport>,
) -> anyhow::Result<AdcCard> {
    let ring =
        Arc::new(SampleRing::new(config.buffer_capacity).context("Invalid ring capacity")?);
    let scheduler =
        AcquisitionScheduler::new(AdcCodec::new(transport), ring, config.scheduler.clone());
    let device = AdcCaptureDevice::new(scheduler);
    Ok(CaptureCard::new("adc-card", CPU_DAI, device, LevelMeter::new()))
}

/// What a capture run produced
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Samples handed to the sink
    pub delivered: u64,
    /// Tick counters at shutdown
    pub stats: TickSnapshot,
}

/// Capture until `shutdown` resolves
pub async fn run<F>(config: CaptureConfig, shutdown: F) -> anyhow::Result<RunSummary>
where
    F: Future<Output = ()>,
{
    let transport = open_transport(&config)?;
    let mut card = build_card(&config, transport)?;

    card.open(&StreamProfile::ADC_PCM_U8)?;
    card.start()?;

    let mut poll = tokio::time::interval(Duration::from_millis(config.poll_interval_ms));
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut report = tokio::time::interval(Duration::from_secs(config.report_interval_s.max(1)));
    report.set_missed_tick_behavior(MissedTickBehavior::Delay);
    report.tick().await;

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = poll.tick() => {
                card.pump();
            }
            _ = report.tick() => {
                let level = card.sink_mut().take_report();
                let stats = card.device().stats();
                info!(
                    "Level: peak {} rms {:.1} over {} samples | ticks {} bus errors {} overruns {}",
                    level.peak,
                    level.rms,
                    level.samples,
                    stats.ticks,
                    stats.bus_errors,
                    stats.overruns
                );
                if stats.bus_errors > 0 && level.samples == 0 {
                    warn!("No samples captured in the last report interval");
                }
            }
        }
    }

    card.stop()?;
    let summary = RunSummary {
        delivered: card.delivered(),
        stats: card.device().stats(),
    };
    info!(
        "Capture finished: {} samples delivered, drop ratio {:.4}",
        summary.delivered,
        summary.stats.drop_ratio()
    );
    Ok(summary)
}
