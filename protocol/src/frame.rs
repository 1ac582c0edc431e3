//! Control-channel frame: `type (1 byte) | length (4 bytes BE) | payload`.
//!
//! This module only deals with frames that are already fully buffered in
//! memory (used for round-trip tests and for turning a parsed frame into
//! bytes to hand to the socket). Reading a frame off a live `TcpStream` —
//! header first, then exactly `length` payload bytes, so that multiple
//! frames arriving in one read are handled correctly — is the socket
//! layer's job, in the `gpmux` binary.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::WireError;

/// Minimum size of a control frame: 1 type byte + 4 length bytes.
pub const HEADER_LEN: usize = 5;

/// The control frame types in spec.md §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    /// client -> server: UTF-8 client name.
    Register,
    /// server -> client: 1-byte id.
    SetId,
    /// server -> client: compiled rule table.
    Configuration,
    /// client -> server: UTF-8 descriptive string.
    PeripheralConnect,
    /// client -> server: UTF-8 descriptive string.
    PeripheralDisconnect,
    /// client -> server: empty payload.
    Done,
    /// either direction: UTF-8 diagnostic.
    Error,
}

impl FrameType {
    fn to_byte(self) -> u8 {
        match self {
            FrameType::Register => 1,
            FrameType::SetId => 2,
            FrameType::Configuration => 3,
            FrameType::PeripheralConnect => 4,
            FrameType::PeripheralDisconnect => 5,
            FrameType::Done => 6,
            FrameType::Error => 255,
        }
    }

    fn from_byte(byte: u8) -> Result<Self, WireError> {
        match byte {
            1 => Ok(FrameType::Register),
            2 => Ok(FrameType::SetId),
            3 => Ok(FrameType::Configuration),
            4 => Ok(FrameType::PeripheralConnect),
            5 => Ok(FrameType::PeripheralDisconnect),
            6 => Ok(FrameType::Done),
            255 => Ok(FrameType::Error),
            other => Err(WireError::UnknownFrameType(other)),
        }
    }
}

/// A fully decoded control frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlFrame {
    pub frame_type: FrameType,
    pub payload: Bytes,
}

impl ControlFrame {
    pub fn new(frame_type: FrameType, payload: impl Into<Bytes>) -> Self {
        ControlFrame {
            frame_type,
            payload: payload.into(),
        }
    }

    pub fn empty(frame_type: FrameType) -> Self {
        ControlFrame {
            frame_type,
            payload: Bytes::new(),
        }
    }

    /// A convenience constructor for an ERROR frame carrying a UTF-8
    /// diagnostic message.
    pub fn error(message: impl Into<String>) -> Self {
        ControlFrame::new(FrameType::Error, Bytes::from(message.into().into_bytes()))
    }

    /// Encode `type | length | payload` into a single buffer ready to
    /// write to the socket.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.payload.len());
        buf.put_u8(self.frame_type.to_byte());
        buf.put_u32(self.payload.len() as u32);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Decode exactly one frame from a buffer holding `type | length |
    /// payload` with no trailing bytes. Fails if the buffer is shorter
    /// than the header, the declared length doesn't match the remaining
    /// bytes, or the type byte is unrecognized.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < HEADER_LEN {
            return Err(WireError::Malformed("buffer shorter than frame header"));
        }
        let mut cursor = Bytes::copy_from_slice(buf);
        let frame_type = FrameType::from_byte(cursor.get_u8())?;
        let length = cursor.get_u32() as usize;
        if cursor.remaining() != length {
            return Err(WireError::Malformed(
                "declared payload length does not match remaining bytes",
            ));
        }
        Ok(ControlFrame {
            frame_type,
            payload: cursor,
        })
    }

    /// Decode just the 5-byte header, returning `(type, payload length)`.
    /// Used by the socket layer to know how many more bytes to read.
    pub fn decode_header(header: &[u8; HEADER_LEN]) -> Result<(FrameType, usize), WireError> {
        let mut cursor = Bytes::copy_from_slice(header);
        let frame_type = FrameType::from_byte(cursor.get_u8())?;
        let length = cursor.get_u32() as usize;
        Ok((frame_type, length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trips() {
        let frame = ControlFrame::new(FrameType::Register, Bytes::from_static(b"alice"));
        let encoded = frame.encode();
        let decoded = ControlFrame::decode(&encoded).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn empty_payload_round_trips() {
        let frame = ControlFrame::empty(FrameType::Done);
        let encoded = frame.encode();
        assert_eq!(encoded.len(), HEADER_LEN);
        let decoded = ControlFrame::decode(&encoded).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        assert!(ControlFrame::decode(&[1, 0, 0]).is_err());
    }

    #[test]
    fn decode_rejects_length_mismatch() {
        // Declares 10 bytes of payload but only supplies 2.
        let mut buf = BytesMut::new();
        buf.put_u8(1);
        buf.put_u32(10);
        buf.put_slice(b"ab");
        assert!(ControlFrame::decode(&buf).is_err());
    }

    #[test]
    fn decode_rejects_unknown_type() {
        let mut buf = BytesMut::new();
        buf.put_u8(200);
        buf.put_u32(0);
        assert!(ControlFrame::decode(&buf).is_err());
    }
}
