//! pipeline/ordering.rs
//! Ordering buffer: holds completed chunks until every lower index is emitted.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::time::Duration;

use crate::pipeline::framing::ChunkHeader;
use crate::pipeline::types::{CompressedChunk, PipelineError};
use crate::transport::Connection;

/// Destination of in-order chunks.
pub trait ChunkSink {
    fn emit(&mut self, chunk: &CompressedChunk) -> Result<(), PipelineError>;
}

impl<S: Read + Write> ChunkSink for Connection<S> {
    fn emit(&mut self, chunk: &CompressedChunk) -> Result<(), PipelineError> {
        let header = ChunkHeader::data(
            chunk.index,
            chunk.original_len,
            chunk.payload.len() as u32,
            chunk.checksum,
        );
        self.send_buffer(&header.encode())?;
        self.send_buffer(&chunk.payload)?;
        Ok(())
    }
}

pub struct OrderedChunkWriter<'a, S: ChunkSink> {
    out: &'a mut S,
    next: u32,
    pending: BTreeMap<u32, CompressedChunk>,
    emitted_bytes: u64,
    compress_time: Duration,
    peak_pending: usize,
}

impl<'a, S: ChunkSink> OrderedChunkWriter<'a, S> {
    pub fn new(out: &'a mut S) -> Self {
        Self {
            out,
            next: 0,
            pending: BTreeMap::new(),
            emitted_bytes: 0,
            compress_time: Duration::ZERO,
            peak_pending: 0,
        }
    }

    /// Queue a chunk, then emit every chunk that is now in order.
    pub fn push(&mut self, chunk: CompressedChunk) -> Result<(), PipelineError> {
        if chunk.index < self.next || self.pending.contains_key(&chunk.index) {
            return Err(PipelineError::Channel("duplicate chunk index"));
        }
        self.pending.insert(chunk.index, chunk);
        self.peak_pending = self.peak_pending.max(self.pending.len());
        self.flush_ready()
    }

    /// Check that exactly `expected` chunks were emitted.
    pub fn finish(&mut self, expected: u32) -> Result<(), PipelineError> {
        self.flush_ready()?;
        if !self.pending.is_empty() || self.next != expected {
            log::error!(
                "[WRITER] emitted {} of {} chunks, {} stranded",
                self.next,
                expected,
                self.pending.len()
            );
            return Err(PipelineError::Channel("missing chunks at end of stream"));
        }
        Ok(())
    }

    pub fn emitted(&self) -> u32 {
        self.next
    }

    pub fn emitted_bytes(&self) -> u64 {
        self.emitted_bytes
    }

    pub fn compress_time(&self) -> Duration {
        self.compress_time
    }

    /// Largest number of chunks held back at once.
    pub fn peak_pending(&self) -> usize {
        self.peak_pending
    }

    fn flush_ready(&mut self) -> Result<(), PipelineError> {
        while let Some(chunk) = self.pending.remove(&self.next) {
            log::trace!("[WRITER] emitting chunk {}", chunk.index);
            self.out.emit(&chunk)?;
            self.emitted_bytes += chunk.payload.len() as u64;
            self.compress_time += chunk.compress_time;
            self.next += 1;
        }
        Ok(())
    }
}
