//! Crate-wide error types for conditions that aren't part of the steady-state
//! per-packet policy (spec.md §7 handles that with logging + control flow,
//! not propagated errors). These cover setup-time failures only.

use thiserror::Error;

/// Failures that can prevent the relay from starting or reading a frame.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind listener on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Frame-level read/write failures (spec.md §4.1).
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stream closed before any frame bytes were read")]
    EndOfStream,

    #[error("framing error: {0}")]
    Framing(&'static str),
}
