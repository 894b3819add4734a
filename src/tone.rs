//! Tone-test sender
//!
//! Streams a sine tone straight to a UDP endpoint at the 20 ms frame cadence,
//! bypassing the bridge, to check a receiver's audio ingestion.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, instrument};

use crate::audio::{frame_count, AudioPacket, ToneGenerator, FRAME_DURATION};
use crate::config::{ToneConfig, UdpTarget};
use crate::error::{BridgeError, Result};

/// Summary of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneReport {
    /// Audio frames sent, excluding STRT/STOP
    pub frames: u64,
    pub bytes: u64,
}

pub struct ToneSender {
    socket: UdpSocket,
    target: UdpTarget,
    generator: ToneGenerator,
    total_frames: u64,
    framed: bool,
}

impl ToneSender {
    /// Bind an ephemeral socket for sending
    pub async fn new(config: &ToneConfig) -> Result<Self> {
        let bind: SocketAddr = if config.target.host.contains(':') {
            "[::]:0".parse()?
        } else {
            "0.0.0.0:0".parse()?
        };
        let socket = UdpSocket::bind(bind)
            .await
            .map_err(|e| BridgeError::bind(bind, e))?;

        Ok(Self {
            socket,
            target: config.target.clone(),
            generator: ToneGenerator::new(config.freq_hz),
            // The first tick always sends, even when the duration rounds down to zero frames
            total_frames: frame_count(config.duration_secs).max(1),
            framed: config.framed,
        })
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    async fn send(&self, datagram: &[u8]) -> Result<usize> {
        self.socket
            .send_to(datagram, self.target.as_socket_target())
            .await
            .map_err(|source| BridgeError::UdpSend {
                target: self.target.to_string(),
                source,
            })
    }

    /// Send every frame, one per tick, first tick one frame period from now
    #[instrument(skip_all)]
    pub async fn run(mut self) -> Result<ToneReport> {
        let mut ticker = interval_at(Instant::now() + FRAME_DURATION, FRAME_DURATION);
        let mut report = ToneReport { frames: 0, bytes: 0 };

        if self.framed {
            self.send(&AudioPacket::Start.encode()?).await?;
        }

        for seq in 0..self.total_frames {
            ticker.tick().await;

            let frame = self.generator.next_frame();
            let datagram = if self.framed {
                AudioPacket::audio(seq as u32, frame).encode()?
            } else {
                frame
            };

            self.send(&datagram).await?;
            report.frames += 1;
            report.bytes += datagram.len() as u64;
            debug!(seq, bytes = datagram.len(), "Sent tone frame");
        }

        if self.framed {
            self.send(&AudioPacket::Stop.encode()?).await?;
        }

        info!("Done.");
        Ok(report)
    }
}
