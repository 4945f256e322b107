//! pipeline/receiver.rs
//! Receiving loop for a pipelined stream: decode chunk frames strictly in
//! index order, decompress, verify and reassemble.
//!
//! Codec or integrity failures do not stop the loop; the remaining frames are
//! still consumed so the connection stays in sync, and the stream is reported
//! as rejected.

use std::io::{Read, Write};

use crate::pipeline::framing::{checksum, ChunkHeader, FrameError, FrameKind};
use crate::pipeline::types::PipelineError;
use crate::smash::Smash;
use crate::transport::{Connection, TransportError};

#[derive(Debug)]
pub enum StreamOutcome {
    /// Every chunk decoded and verified.
    Complete { data: Vec<u8>, chunks: u32 },
    /// The stream ended but at least one chunk failed.
    Rejected { reason: PipelineError },
    /// The sender gave up mid-stream.
    Aborted,
}

/// Consume one stream. `codec` must be armed as a decompressor.
///
/// `max_len` caps both single payloads and the reassembled total.
pub fn receive_stream<S: Read + Write>(
    conn: &mut Connection<S>,
    codec: &mut Smash,
    max_len: u64,
) -> Result<StreamOutcome, PipelineError> {
    consume(conn, Some(codec), max_len, None)
}

/// Consume one stream without decoding it, reporting it as rejected with
/// `reason` unless the sender aborts first.
pub fn discard_stream<S: Read + Write>(
    conn: &mut Connection<S>,
    reason: PipelineError,
    max_len: u64,
) -> Result<StreamOutcome, PipelineError> {
    consume(conn, None, max_len, Some(reason))
}

fn consume<S: Read + Write>(
    conn: &mut Connection<S>,
    mut codec: Option<&mut Smash>,
    max_len: u64,
    mut failure: Option<PipelineError>,
) -> Result<StreamOutcome, PipelineError> {
    let mut data = Vec::new();
    let mut next = 0u32;

    loop {
        let mut wire = [0u8; ChunkHeader::LEN];
        conn.recv_buffer(&mut wire)?;
        let header = ChunkHeader::decode(&wire)?;

        match header.kind {
            FrameKind::Abort => {
                log::warn!("[RECEIVER] sender aborted after {} chunks", next);
                return Ok(StreamOutcome::Aborted);
            }
            FrameKind::End => {
                if header.chunk_index != next {
                    return Err(FrameError::Malformed(format!(
                        "end marker announces {} chunks, received {}",
                        header.chunk_index, next
                    ))
                    .into());
                }
                return Ok(match failure {
                    Some(reason) => StreamOutcome::Rejected { reason },
                    None => StreamOutcome::Complete { data, chunks: next },
                });
            }
            FrameKind::Data => {}
        }

        if header.chunk_index != next {
            return Err(FrameError::Malformed(format!(
                "chunk {} arrived, expected {}",
                header.chunk_index, next
            ))
            .into());
        }
        let total = data.len() as u64 + header.original_len as u64;
        if total > max_len {
            return Err(TransportError::FrameTooLarge {
                declared: total,
                max: max_len,
            }
            .into());
        }

        let payload = conn.recv_payload(header.payload_len as u64, max_len)?;
        next += 1;
        let Some(codec) = codec.as_deref_mut().filter(|_| failure.is_none()) else {
            continue;
        };

        if let Err(e) = decode_chunk(codec, &header, &payload, &mut data) {
            log::warn!("[RECEIVER] chunk {} rejected: {e}", header.chunk_index);
            failure = Some(e);
        }
    }
}

fn decode_chunk(
    codec: &mut Smash,
    header: &ChunkHeader,
    payload: &[u8],
    data: &mut Vec<u8>,
) -> Result<(), PipelineError> {
    let start = data.len();
    let len = header.original_len as usize;
    data.try_reserve(len).map_err(|_| TransportError::Allocation {
        declared: header.original_len as u64,
    })?;
    data.resize(start + len, 0);

    let produced = codec.decompress(payload, &mut data[start..])?;
    if produced != len || checksum(&data[start..]) != header.checksum {
        return Err(PipelineError::Integrity {
            index: header.chunk_index,
        });
    }
    Ok(())
}
