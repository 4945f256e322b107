//! pipeline/worker.rs
//! Compression worker loop. Each worker owns a private, compressor-armed codec.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use bytes::Bytes;
use crossbeam::channel::{Receiver, Sender};

use crate::pipeline::framing::checksum;
use crate::pipeline::types::{Chunk, CompressedChunk, PipelineError};
use crate::smash::Smash;

/// Single compression worker loop
pub fn run_compression_worker(
    id: usize,
    rx: Receiver<Chunk<'_>>,
    tx: Sender<Result<CompressedChunk, PipelineError>>,
    mut codec: Smash,
    abort: &AtomicBool,
) {
    log::debug!("[WORKER-{id}] starting");

    while let Ok(chunk) = rx.recv() {
        if abort.load(Ordering::Acquire) {
            log::debug!("[WORKER-{id}] abort seen, discarding chunk {}", chunk.index);
            break;
        }

        let start = Instant::now();
        let mut out = vec![0u8; codec.compressed_capacity(chunk.data.len())];

        match codec.compress(chunk.data, &mut out) {
            Ok(n) => {
                out.truncate(n);
                let compressed = CompressedChunk {
                    index: chunk.index,
                    // chunk sizes are bounded by MAX_CHUNK_SIZE
                    original_len: chunk.data.len() as u32,
                    checksum: checksum(chunk.data),
                    payload: Bytes::from(out),
                    compress_time: start.elapsed(),
                };
                log::trace!("[WORKER-{id}] chunk {} -> {} bytes", chunk.index, n);
                if tx.send(Ok(compressed)).is_err() {
                    break; // writer gone
                }
            }
            Err(e) => {
                log::error!("[WORKER-{id}] chunk {} failed: {e}", chunk.index);
                let _ = tx.send(Err(PipelineError::Codec(e)));
                break; // exit on error so pipeline can terminate
            }
        }
    }

    log::debug!("[WORKER-{id}] finished");
}
