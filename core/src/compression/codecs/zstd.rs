//! src/compression/codecs/zstd.rs
//!
//! Zstd engine over the bulk (single-shot) API.
//!
//! Design notes:
//! - level 1..=22, window log 10..=27, worker threads 1..=4.
//! - Optional byte-shuffle pre-filter (shuffle 1 = 4-byte items, 2 = 8-byte items).
//! - Compressor and decompressor contexts are created once per role and reused.

use zstd::zstd_safe::{CParameter, DParameter};

use crate::compression::shuffle::{item_width, shuffle, unshuffle};
use crate::compression::types::{
    CodecError, CompressedBound, CompressionEngine, Compressor, Decompressor, Operation,
    ParameterInfo,
};
use crate::options::Options;

const NAME: &str = "zstd";

#[derive(Debug, Default, Clone, Copy)]
pub struct ZstdEngine;

impl CompressionEngine for ZstdEngine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Zstandard, optional byte-shuffle filter"
    }

    fn compression_level_info(&self) -> ParameterInfo {
        ParameterInfo::range(1, 22)
    }

    fn window_size_info(&self) -> ParameterInfo {
        ParameterInfo::range(10, 27)
    }

    fn shuffle_info(&self) -> ParameterInfo {
        ParameterInfo::labeled(0, &["none", "byte shuffle (4)", "byte shuffle (8)"])
    }

    fn number_threads_info(&self) -> ParameterInfo {
        ParameterInfo::range(1, 4)
    }

    fn compressed_bound(&self, uncompressed: usize) -> CompressedBound {
        CompressedBound::Exact(zstd_safe::compress_bound(uncompressed))
    }

    fn create_compressor(&self, options: &Options) -> Result<Box<dyn Compressor>, CodecError> {
        Ok(Box::new(ZstdCompressor::new(options)?))
    }

    fn create_decompressor(&self, options: &Options) -> Result<Box<dyn Decompressor>, CodecError> {
        Ok(Box::new(ZstdDecompressor::new(options)?))
    }
}

/// Zstd compressor.
/// - Holds a bulk compression context configured from the options.
/// - Keeps a scratch buffer for the shuffled input.
pub struct ZstdCompressor {
    inner: zstd::bulk::Compressor<'static>,
    width: Option<usize>,
    scratch: Vec<u8>,
}

impl ZstdCompressor {
    pub fn new(options: &Options) -> Result<Self, CodecError> {
        let mut inner = zstd::bulk::Compressor::new(options.compression_level() as i32)
            .map_err(|e| CodecError::init(NAME, e))?;
        inner
            .set_parameter(CParameter::WindowLog(options.window_size()))
            .map_err(|e| CodecError::init(NAME, e))?;
        if options.number_threads() > 1 {
            inner
                .set_parameter(CParameter::NbWorkers(options.number_threads() as u32))
                .map_err(|e| CodecError::init(NAME, e))?;
        }

        Ok(Self {
            inner,
            width: item_width(options.shuffle()),
            scratch: Vec::new(),
        })
    }
}

impl Compressor for ZstdCompressor {
    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        let source = match self.width {
            Some(width) => {
                shuffle(input, width, &mut self.scratch);
                self.scratch.as_slice()
            }
            None => input,
        };

        self.inner
            .compress_to_buffer(source, output)
            .map_err(|e| CodecError::process(NAME, Operation::Compress, e))
    }
}

/// Zstd decompressor.
/// - Window limit follows the configured window log.
pub struct ZstdDecompressor {
    inner: zstd::bulk::Decompressor<'static>,
    width: Option<usize>,
    scratch: Vec<u8>,
}

impl ZstdDecompressor {
    pub fn new(options: &Options) -> Result<Self, CodecError> {
        let mut inner = zstd::bulk::Decompressor::new().map_err(|e| CodecError::init(NAME, e))?;
        inner
            .set_parameter(DParameter::WindowLogMax(options.window_size()))
            .map_err(|e| CodecError::init(NAME, e))?;

        Ok(Self {
            inner,
            width: item_width(options.shuffle()),
            scratch: Vec::new(),
        })
    }
}

impl Decompressor for ZstdDecompressor {
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        let Some(width) = self.width else {
            return self
                .inner
                .decompress_to_buffer(input, output)
                .map_err(|e| CodecError::process(NAME, Operation::Decompress, e));
        };

        self.scratch.clear();
        self.scratch.resize(output.len(), 0);
        let produced = self
            .inner
            .decompress_to_buffer(input, self.scratch.as_mut_slice())
            .map_err(|e| CodecError::process(NAME, Operation::Decompress, e))?;

        unshuffle(&self.scratch[..produced], width, &mut output[..produced]);
        Ok(produced)
    }
}
