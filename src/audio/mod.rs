//! Audio framing shared by the tone utility and its tests
//!
//! - [`pcm`]: 16 kHz / 20 ms PCM frames and the sine generator
//! - [`packet`]: the device's tagged `STRT` / `AUD0` / `STOP` datagrams

pub mod packet;
pub mod pcm;

pub use packet::AudioPacket;
pub use pcm::{
    encode_pcm16le, frame_count, ToneGenerator, BYTES_PER_FRAME, FRAME_DURATION, FRAME_MS,
    SAMPLES_PER_FRAME, SAMPLE_RATE_HZ,
};
