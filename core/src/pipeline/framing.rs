//! pipeline/framing.rs
//! Wire envelope of one pipelined chunk.
//!
//! Layout (all fields little-endian):
//!
//! ```text
//! [ magic (4) ]
//! [ version (1) ]
//! [ kind (1) ]
//! [ chunk_index (4) ]
//! [ original_len (4) ]
//! [ payload_len (4) ]
//! [ checksum (4) ]     crc32 of the original chunk bytes
//! [ payload (payload_len) ]
//! ```
//!
//! An `End` frame carries the chunk count in `chunk_index`; an `Abort` frame
//! tells the receiver to discard the stream.

use byteorder::{ByteOrder, LittleEndian};
use num_enum::TryFromPrimitive;
use thiserror::Error;

pub const FRAME_MAGIC: [u8; 4] = *b"SMCF";
pub const FRAME_VERSION: u8 = 1;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum FrameKind {
    Data = 0x01,
    End = 0x02,
    Abort = 0x03,
}

/// Canonical chunk header (fixed size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub kind: FrameKind,
    pub chunk_index: u32,
    pub original_len: u32,
    pub payload_len: u32,
    pub checksum: u32,
}

impl ChunkHeader {
    pub const LEN: usize = 4  // magic
        + 1                  // version
        + 1                  // kind
        + 4                  // chunk_index
        + 4                  // original_len
        + 4                  // payload_len
        + 4;                 // checksum

    pub fn data(chunk_index: u32, original_len: u32, payload_len: u32, checksum: u32) -> Self {
        Self {
            kind: FrameKind::Data,
            chunk_index,
            original_len,
            payload_len,
            checksum,
        }
    }

    pub fn end(chunk_count: u32) -> Self {
        Self {
            kind: FrameKind::End,
            chunk_index: chunk_count,
            original_len: 0,
            payload_len: 0,
            checksum: 0,
        }
    }

    pub fn abort() -> Self {
        Self {
            kind: FrameKind::Abort,
            chunk_index: 0,
            original_len: 0,
            payload_len: 0,
            checksum: 0,
        }
    }

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..4].copy_from_slice(&FRAME_MAGIC);
        out[4] = FRAME_VERSION;
        out[5] = self.kind as u8;
        LittleEndian::write_u32(&mut out[6..10], self.chunk_index);
        LittleEndian::write_u32(&mut out[10..14], self.original_len);
        LittleEndian::write_u32(&mut out[14..18], self.payload_len);
        LittleEndian::write_u32(&mut out[18..22], self.checksum);
        out
    }

    pub fn decode(wire: &[u8]) -> Result<Self, FrameError> {
        if wire.len() < Self::LEN {
            return Err(FrameError::Truncated);
        }

        if wire[0..4] != FRAME_MAGIC {
            let mut m = [0u8; 4];
            m.copy_from_slice(&wire[0..4]);
            return Err(FrameError::InvalidMagic(m));
        }
        if wire[4] != FRAME_VERSION {
            return Err(FrameError::UnsupportedVersion(wire[4]));
        }
        let kind = FrameKind::try_from_primitive(wire[5])
            .map_err(|_| FrameError::InvalidKind(wire[5]))?;

        let header = Self {
            kind,
            chunk_index: LittleEndian::read_u32(&wire[6..10]),
            original_len: LittleEndian::read_u32(&wire[10..14]),
            payload_len: LittleEndian::read_u32(&wire[14..18]),
            checksum: LittleEndian::read_u32(&wire[18..22]),
        };

        if header.kind != FrameKind::Data && (header.payload_len != 0 || header.original_len != 0) {
            return Err(FrameError::Malformed(format!("{:?} frame carries a payload", header.kind)));
        }
        Ok(header)
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid frame magic: {0:?}")]
    InvalidMagic([u8; 4]),

    #[error("unsupported frame version: {0}")]
    UnsupportedVersion(u8),

    #[error("invalid frame kind: {0}")]
    InvalidKind(u8),

    #[error("truncated frame")]
    Truncated,

    #[error("malformed frame: {0}")]
    Malformed(String),
}

/// CRC32 of a chunk's original bytes.
pub fn checksum(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
