//! transport/types.rs
//! Transport error taxonomy.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("connection closed after {received} of {expected} bytes")]
    ConnectionClosed { expected: usize, received: usize },

    #[error("invalid acknowledgment token {token:?}")]
    InvalidAck { token: [u8; 4] },

    #[error("peer rejected the data (negative acknowledgment)")]
    Nack,

    #[error("declared length {declared} exceeds limit {max}")]
    FrameTooLarge { declared: u64, max: u64 },

    #[error("cannot allocate {declared} bytes for incoming payload")]
    Allocation { declared: u64 },

    #[error("protocol violation: {0}")]
    Protocol(String),
}
