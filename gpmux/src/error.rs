//! Top-level error type for `main`. Socket/codec layers mostly deal in
//! `String` diagnostics (sent verbatim in ERROR frames) or `protocol`'s
//! typed `WireError`; this wraps both for the handful of places that
//! need to bubble a failure out to `main` with a process exit code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("wire error: {0}")]
    Wire(#[from] protocol::WireError),

    #[error("handshake failed: {0}")]
    Handshake(String),
}
