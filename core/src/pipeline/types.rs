//! pipeline/types.rs
//! Configuration, work units, state machine and errors of the pipeline engine.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

use crate::compression::CodecError;
use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_INFLIGHT_CHUNKS, MAX_CHUNK_SIZE};
use crate::pipeline::framing::FrameError;
use crate::transport::TransportError;

// ============================================================
// Configuration
// ============================================================

/// Parallelism configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub worker_count: usize,
    pub inflight_chunks: usize,
}

impl PipelineConfig {
    pub fn new(chunk_size: usize, worker_count: usize, inflight_chunks: usize) -> Self {
        Self {
            chunk_size,
            worker_count,
            inflight_chunks,
        }
    }

    pub fn single_threaded() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, 1, 1)
    }

    /// One worker per core, leaving one core for the transport writer.
    pub fn dynamic(chunk_size: usize) -> Self {
        let worker_count = num_cpus::get().saturating_sub(1).max(1);
        Self::new(chunk_size, worker_count, worker_count * DEFAULT_INFLIGHT_CHUNKS)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(PipelineError::InvalidConfig(format!(
                "chunk size {} outside 1..={}",
                self.chunk_size, MAX_CHUNK_SIZE
            )));
        }
        if self.worker_count == 0 {
            return Err(PipelineError::InvalidConfig("worker count must be > 0".into()));
        }
        if self.inflight_chunks == 0 {
            return Err(PipelineError::InvalidConfig("inflight chunks must be > 0".into()));
        }
        Ok(())
    }

    /// Number of chunks `len` bytes split into.
    pub fn chunk_count(&self, len: usize) -> usize {
        len.div_ceil(self.chunk_size)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, 1, DEFAULT_INFLIGHT_CHUNKS)
    }
}

// ============================================================
// Work units
// ============================================================

/// Borrowed slice of the source buffer, owned by one worker until compressed.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub index: u32,
    pub data: &'a [u8],
}

/// Compressed chunk waiting in the ordering buffer.
#[derive(Debug, Clone)]
pub struct CompressedChunk {
    pub index: u32,
    pub original_len: u32,
    pub checksum: u32,
    pub payload: Bytes,
    pub compress_time: Duration,
}

/// Outcome of one pipelined send.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub chunks: u32,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub elapsed: Duration,
    /// Summed worker time; overlaps with transfer, informational only.
    pub compress_time: Duration,
}

// ============================================================
// State machine
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Streaming,
    Draining,
    Finished,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Streaming => "streaming",
            PipelineState::Draining => "draining",
            PipelineState::Finished => "finished",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ============================================================
// Errors
// ============================================================

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("pipeline is {0}, expected idle")]
    NotIdle(PipelineState),

    #[error("input of {0} bytes exceeds the chunk index space")]
    InputTooLarge(usize),

    #[error("chunk {index} failed integrity check")]
    Integrity { index: u32 },

    #[error("stream aborted by sender")]
    Aborted,

    #[error("pipeline error: {0}")]
    Channel(&'static str),
}

impl PipelineError {
    /// Transport and framing failures leave the connection out of sync; a
    /// negative acknowledgment does not.
    pub fn is_fatal(&self) -> bool {
        match self {
            PipelineError::Transport(TransportError::Nack) => false,
            PipelineError::Transport(_) | PipelineError::Frame(_) => true,
            _ => false,
        }
    }
}
