//! 16 kHz mono PCM framing
//!
//! The bridge never looks inside frames; these helpers describe what the
//! browser, the device and the tone utility put in them.

use std::f64::consts::PI;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

pub const SAMPLE_RATE_HZ: u32 = 16_000;
pub const FRAME_MS: u64 = 20;
pub const SAMPLES_PER_FRAME: usize = (SAMPLE_RATE_HZ as usize * FRAME_MS as usize) / 1000;
pub const BYTES_PER_FRAME: usize = SAMPLES_PER_FRAME * 2;
pub const FRAME_DURATION: Duration = Duration::from_millis(FRAME_MS);

/// Peak amplitude of generated tones (half scale)
pub const TONE_AMPLITUDE: f64 = 0x3fff as f64;

/// Number of whole frames in `duration_secs`
pub fn frame_count(duration_secs: f64) -> u64 {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return 0;
    }
    ((duration_secs * 1000.0) / FRAME_MS as f64).floor() as u64
}

/// Serialize samples as 16-bit signed little-endian PCM
pub fn encode_pcm16le(samples: &[i16]) -> Bytes {
    let mut buf = BytesMut::with_capacity(samples.len() * 2);
    for &sample in samples {
        buf.put_i16_le(sample);
    }
    buf.freeze()
}

/// Continuous sine wave sliced into 20 ms frames
#[derive(Debug, Clone)]
pub struct ToneGenerator {
    freq_hz: f64,
    next_sample: u64,
}

impl ToneGenerator {
    pub fn new(freq_hz: f64) -> Self {
        Self {
            freq_hz,
            next_sample: 0,
        }
    }

    /// Samples of the next frame; phase continues across frames
    pub fn next_samples(&mut self) -> [i16; SAMPLES_PER_FRAME] {
        let mut samples = [0i16; SAMPLES_PER_FRAME];
        for (i, sample) in samples.iter_mut().enumerate() {
            let t = (self.next_sample + i as u64) as f64 / SAMPLE_RATE_HZ as f64;
            *sample = ((2.0 * PI * self.freq_hz * t).sin() * TONE_AMPLITUDE) as i16;
        }
        self.next_sample += SAMPLES_PER_FRAME as u64;
        samples
    }

    /// The next frame as PCM bytes
    pub fn next_frame(&mut self) -> Bytes {
        encode_pcm16le(&self.next_samples())
    }
}

impl Iterator for ToneGenerator {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        Some(self.next_frame())
    }
}
