//! pipeline/mod.rs
//! Pipelined chunk compression and transfer.
//!
//! - `engine`   sender side: feeder, worker pool, ordered writer
//! - `receiver` receiver side: in-order decode and verification
//! - `framing`  chunk envelope on the wire

pub mod engine;
pub mod framing;
pub mod ordering;
pub mod receiver;
pub mod types;
pub mod worker;

pub use engine::PipelineEngine;
pub use framing::{ChunkHeader, FrameError, FrameKind};
pub use ordering::{ChunkSink, OrderedChunkWriter};
pub use receiver::{discard_stream, receive_stream, StreamOutcome};
pub use types::*;
