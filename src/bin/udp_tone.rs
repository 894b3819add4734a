//! UDP tone test - sends a sine tone as 20 ms PCM frames straight to a UDP
//! receiver, bypassing the bridge.

use anyhow::Context;
use tracing::info;

use ws_udp_bridge::config::{exit_with_usage, parse_args_or_exit, ToneCli, ToneConfig, TONE_USAGE};
use ws_udp_bridge::logging;
use ws_udp_bridge::tone::ToneSender;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli: ToneCli = parse_args_or_exit(TONE_USAGE);
    let config = ToneConfig::from_cli(&cli).unwrap_or_else(|e| exit_with_usage(&e, TONE_USAGE));

    logging::init_tracing(&config.log)?;

    let sender = ToneSender::new(&config)
        .await
        .context("failed to open UDP socket")?;

    info!(
        "Sending {}s of {}Hz tone to udp://{} ({} frames)",
        config.duration_secs,
        config.freq_hz,
        config.target,
        sender.total_frames()
    );

    let report = sender.run().await?;
    info!(frames = report.frames, bytes = report.bytes, "Tone complete");
    Ok(())
}
