//! Device audio packet framing
//!
//! The embedded device and the recorder exchange tagged datagrams:
//!
//! ```text
//! STRT                                   start of an utterance
//! STOP                                   end of an utterance
//! AUD0 | seq: u32 LE | len: u16 LE | pcm current form
//! AUD0 | len: u16 LE | pcm              legacy form, no sequence number
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{BridgeError, Result};

pub const TAG_START: &[u8; 4] = b"STRT";
pub const TAG_STOP: &[u8; 4] = b"STOP";
pub const TAG_AUDIO: &[u8; 4] = b"AUD0";

/// Header length of a sequenced audio packet
pub const AUDIO_HEADER_LEN: usize = 10;
/// Header length of a legacy audio packet
pub const LEGACY_AUDIO_HEADER_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPacket {
    Start,
    Stop,
    Audio { seq: Option<u32>, payload: Bytes },
}

impl AudioPacket {
    pub fn audio(seq: u32, payload: Bytes) -> Self {
        AudioPacket::Audio {
            seq: Some(seq),
            payload,
        }
    }

    pub fn encode(&self) -> Result<Bytes> {
        match self {
            AudioPacket::Start => Ok(Bytes::from_static(TAG_START)),
            AudioPacket::Stop => Ok(Bytes::from_static(TAG_STOP)),
            AudioPacket::Audio { seq, payload } => {
                let len = u16::try_from(payload.len())
                    .map_err(|_| BridgeError::PayloadTooLarge { len: payload.len() })?;

                let mut buf = BytesMut::with_capacity(AUDIO_HEADER_LEN + payload.len());
                buf.put_slice(TAG_AUDIO);
                if let Some(seq) = seq {
                    buf.put_u32_le(*seq);
                }
                buf.put_u16_le(len);
                buf.put_slice(payload);
                Ok(buf.freeze())
            }
        }
    }

    /// Parse a datagram; unknown tags and short packets yield `None`.
    ///
    /// A declared length longer than the datagram is clamped to what arrived.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        match &data[..4] {
            tag if tag == TAG_START => Some(AudioPacket::Start),
            tag if tag == TAG_STOP => Some(AudioPacket::Stop),
            tag if tag == TAG_AUDIO => {
                let mut rest = &data[4..];
                let seq = if data.len() >= AUDIO_HEADER_LEN {
                    Some(rest.get_u32_le())
                } else if data.len() >= LEGACY_AUDIO_HEADER_LEN {
                    None
                } else {
                    return None;
                };
                let len = rest.get_u16_le() as usize;
                let payload = Bytes::copy_from_slice(&rest[..len.min(rest.len())]);
                Some(AudioPacket::Audio { seq, payload })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_control_packets() {
        assert_eq!(AudioPacket::Start.encode().unwrap().as_ref(), b"STRT");
        assert_eq!(AudioPacket::Stop.encode().unwrap().as_ref(), b"STOP");
    }

    #[test]
    fn test_encode_sequenced_audio() {
        let packet = AudioPacket::audio(0x01020304, Bytes::from_static(&[0xAA, 0xBB]));
        let bytes = packet.encode().unwrap();
        assert_eq!(
            bytes.as_ref(),
            &[b'A', b'U', b'D', b'0', 0x04, 0x03, 0x02, 0x01, 0x02, 0x00, 0xAA, 0xBB]
        );
        assert_eq!(AudioPacket::decode(&bytes), Some(packet));
    }

    #[test]
    fn test_decode_legacy_audio() {
        let data = [b'A', b'U', b'D', b'0', 0x02, 0x00, 0x10, 0x20];
        // 8 bytes: too short for the sequenced header
        assert_eq!(
            AudioPacket::decode(&data),
            Some(AudioPacket::Audio {
                seq: None,
                payload: Bytes::from_static(&[0x10, 0x20]),
            })
        );
    }

    #[test]
    fn test_decode_clamps_declared_length() {
        let data = [b'A', b'U', b'D', b'0', 7, 0, 0, 0, 0xFF, 0x00, 0x01, 0x02];
        match AudioPacket::decode(&data) {
            Some(AudioPacket::Audio { seq, payload }) => {
                assert_eq!(seq, Some(7));
                assert_eq!(payload.as_ref(), &[0x01, 0x02]);
            }
            other => panic!("unexpected packet: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_and_short() {
        assert_eq!(AudioPacket::decode(b"AUD"), None);
        assert_eq!(AudioPacket::decode(b"AUD0\x01"), None);
        assert_eq!(AudioPacket::decode(b"PING"), None);
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let packet = AudioPacket::audio(0, Bytes::from(vec![0u8; 70_000]));
        assert!(matches!(
            packet.encode(),
            Err(BridgeError::PayloadTooLarge { len: 70_000 })
        ));
    }
}
