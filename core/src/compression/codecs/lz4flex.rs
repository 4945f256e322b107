//! codecs/lz4flex.rs
//! Pure-Rust LZ4 block engine (no tunables).
use lz4_flex::block::{compress_into, decompress_into, get_maximum_output_size};

use crate::compression::types::{
    CodecError, CompressedBound, CompressionEngine, Compressor, Decompressor, Operation,
};
use crate::options::Options;

const NAME: &str = "lz4flex";

#[derive(Debug, Default, Clone, Copy)]
pub struct Lz4FlexEngine;

struct Lz4FlexCompressor;
struct Lz4FlexDecompressor;

impl CompressionEngine for Lz4FlexEngine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "LZ4 block format, pure Rust"
    }

    fn compressed_bound(&self, uncompressed: usize) -> CompressedBound {
        CompressedBound::Exact(get_maximum_output_size(uncompressed))
    }

    fn create_compressor(&self, _options: &Options) -> Result<Box<dyn Compressor>, CodecError> {
        Ok(Box::new(Lz4FlexCompressor))
    }

    fn create_decompressor(&self, _options: &Options) -> Result<Box<dyn Decompressor>, CodecError> {
        Ok(Box::new(Lz4FlexDecompressor))
    }
}

impl Compressor for Lz4FlexCompressor {
    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        compress_into(input, output).map_err(|e| CodecError::process(NAME, Operation::Compress, e))
    }
}

impl Decompressor for Lz4FlexDecompressor {
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        decompress_into(input, output)
            .map_err(|e| CodecError::process(NAME, Operation::Decompress, e))
    }
}
