//! codecs/lz4.rs
//! LZ4 block engine with a (mode, level) dispatch table.
//!
//! Mode 0 is `fast`: the default acceleration at level 0, acceleration =
//! level at levels 1..=12. Mode 1 is `high` (HC, compression level = level)
//! and needs a level of at least 1.
use std::io;

use lz4::block::{compress_bound, compress_to_buffer, decompress_to_buffer, CompressionMode};

use crate::compression::types::{
    CodecError, CompressedBound, CompressionEngine, Compressor, Decompressor, Operation,
    ParameterInfo,
};
use crate::options::Options;

const NAME: &str = "lz4";

/// State sizes reported by liblz4 for each compressor family.
const FAST_WORK_MEMORY: usize = 16 * 1024;
const HC_WORK_MEMORY: usize = 256 * 1024;

pub mod modes {
    pub const FAST: u8 = 0;
    pub const HIGH: u8 = 1;
}

type CompressFn = fn(&[u8], &mut [u8], i32) -> io::Result<usize>;
type DecompressFn = fn(&[u8], &mut [u8]) -> io::Result<usize>;

/// Entry of the dispatch table.
#[derive(Clone, Copy)]
pub struct ModeDescriptor {
    pub work_memory: usize,
    pub compress: CompressFn,
    pub decompress: DecompressFn,
}

fn compress_default(src: &[u8], dst: &mut [u8], _level: i32) -> io::Result<usize> {
    compress_to_buffer(src, Some(CompressionMode::DEFAULT), false, dst)
}

fn compress_fast(src: &[u8], dst: &mut [u8], level: i32) -> io::Result<usize> {
    compress_to_buffer(src, Some(CompressionMode::FAST(level)), false, dst)
}

fn compress_high(src: &[u8], dst: &mut [u8], level: i32) -> io::Result<usize> {
    compress_to_buffer(src, Some(CompressionMode::HIGHCOMPRESSION(level)), false, dst)
}

fn decompress_block(src: &[u8], dst: &mut [u8]) -> io::Result<usize> {
    let size = i32::try_from(dst.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "block larger than 2 GiB"))?;
    decompress_to_buffer(src, Some(size), dst)
}

/// Resolve the descriptor for a (mode, level) pair.
pub fn descriptor(mode: u8, level: u8) -> Option<ModeDescriptor> {
    let decompress = decompress_block as DecompressFn;
    match (mode, level) {
        (modes::FAST, 0) => Some(ModeDescriptor {
            work_memory: FAST_WORK_MEMORY,
            compress: compress_default,
            decompress,
        }),
        (modes::FAST, 1..=12) => Some(ModeDescriptor {
            work_memory: FAST_WORK_MEMORY,
            compress: compress_fast,
            decompress,
        }),
        (modes::HIGH, 1..=12) => Some(ModeDescriptor {
            work_memory: HC_WORK_MEMORY,
            compress: compress_high,
            decompress,
        }),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Lz4Engine;

impl CompressionEngine for Lz4Engine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "LZ4 block format (liblz4), fast and HC modes"
    }

    fn compression_level_info(&self) -> ParameterInfo {
        ParameterInfo::range(0, 12)
    }

    fn mode_info(&self, level: u8) -> ParameterInfo {
        if level == 0 {
            ParameterInfo::labeled(modes::FAST as u32, &["default"])
        } else {
            ParameterInfo::labeled(modes::FAST as u32, &["fast", "high"])
        }
    }

    fn compressed_bound(&self, uncompressed: usize) -> CompressedBound {
        match compress_bound(uncompressed) {
            Ok(bound) => CompressedBound::Exact(bound),
            Err(_) => CompressedBound::Unknown,
        }
    }

    fn create_compressor(&self, options: &Options) -> Result<Box<dyn Compressor>, CodecError> {
        let level = options.compression_level();
        let entry = descriptor(options.mode(), level).ok_or_else(|| {
            CodecError::init(NAME, format!("no mode {} at level {}", options.mode(), level))
        })?;
        log::debug!(
            "{}: mode {} level {} needs {} bytes of work memory",
            NAME,
            options.mode(),
            level,
            entry.work_memory
        );
        Ok(Box::new(Lz4Compressor {
            entry,
            level: level as i32,
        }))
    }

    fn create_decompressor(&self, options: &Options) -> Result<Box<dyn Decompressor>, CodecError> {
        // Every mode decodes the same block format, so the level is irrelevant here.
        let entry = descriptor(options.mode(), options.compression_level())
            .or_else(|| descriptor(options.mode(), 1))
            .or_else(|| descriptor(options.mode(), 0))
            .ok_or_else(|| CodecError::init(NAME, format!("unknown mode {}", options.mode())))?;
        Ok(Box::new(Lz4Decompressor { entry }))
    }
}

/// LZ4 compressor bound to one dispatch table entry.
pub struct Lz4Compressor {
    entry: ModeDescriptor,
    level: i32,
}

impl Compressor for Lz4Compressor {
    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        (self.entry.compress)(input, output, self.level)
            .map_err(|e| CodecError::process(NAME, Operation::Compress, e))
    }
}

pub struct Lz4Decompressor {
    entry: ModeDescriptor,
}

impl Decompressor for Lz4Decompressor {
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        (self.entry.decompress)(input, output)
            .map_err(|e| CodecError::process(NAME, Operation::Decompress, e))
    }
}
