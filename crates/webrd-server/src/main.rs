use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use rd_capture::XcapCapture;
use rd_encode::ImageJpegEncoder;
use rd_input::EnigoSynth;
use webrd_server::config::{Cli, Config};
use webrd_server::supervisor;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::try_from_cli(cli).context("invalid configuration")?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("invalid bind address")?;

    let capture = Arc::new(XcapCapture::new());
    let encoder = Arc::new(ImageJpegEncoder::new());
    let synth = Arc::new(EnigoSynth::new().context("failed to initialize input injection")?);

    tracing::info!(port = config.port, fullscreen = config.fullscreen, "starting webrd-server");

    supervisor::run(addr, config, capture, encoder, synth).await
}
