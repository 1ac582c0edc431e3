//! Wire-format error taxonomy. Handshake-level failures (`NameTaken`,
//! `InvalidName`, `NoConfiguration`) stay as plain `String` diagnostics
//! assembled at the call site and sent verbatim in an ERROR frame; they
//! don't need a variant here.

use thiserror::Error;

/// A wire-format violation: bad framing, bad length, or an unrecognized
/// frame type. Reported to the peer as an ERROR frame and the connection
/// is closed (control channel), or dropped silently (datagram channel).
#[derive(Debug, Error)]
pub enum WireError {
    /// The buffer is too short, or the declared payload length exceeds
    /// the bytes available.
    #[error("malformed frame: {0}")]
    Malformed(&'static str),

    /// The leading type byte doesn't match any known `FrameType`.
    #[error("unknown frame type {0}")]
    UnknownFrameType(u8),

    /// Underlying socket I/O failed while reading or writing a frame.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
