//! ADC Capture Daemon - Main Entry Point

use anyhow::Context;
use capture_daemon::{init_logging, run};
use pcm_capture::CaptureConfig;
use std::path::PathBuf;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    info!("=== ADC Capture v{} ===", env!("CARGO_PKG_VERSION"));

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = CaptureConfig::load(path.as_deref()).context("Failed to load capture config")?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C, running until killed: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown requested");
    };

    let summary = run(config, shutdown).await?;
    info!("Captured {} samples", summary.delivered);
    Ok(())
}
