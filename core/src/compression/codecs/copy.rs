//! codecs/copy.rs
//! Pass-through engine. Useful as a transport/pipeline baseline.

use crate::compression::types::{
    CodecError, CompressedBound, CompressionEngine, Compressor, Decompressor, Operation,
};
use crate::options::Options;

const NAME: &str = "copy";

#[derive(Debug, Default, Clone, Copy)]
pub struct CopyEngine;

struct CopyCompressor;
struct CopyDecompressor;

impl CompressionEngine for CopyEngine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "pass-through, output equals input"
    }

    fn compressed_bound(&self, uncompressed: usize) -> CompressedBound {
        CompressedBound::Exact(uncompressed)
    }

    fn create_compressor(&self, _options: &Options) -> Result<Box<dyn Compressor>, CodecError> {
        Ok(Box::new(CopyCompressor))
    }

    fn create_decompressor(&self, _options: &Options) -> Result<Box<dyn Decompressor>, CodecError> {
        Ok(Box::new(CopyDecompressor))
    }
}

fn copy_into(input: &[u8], output: &mut [u8], operation: Operation) -> Result<usize, CodecError> {
    let Some(dst) = output.get_mut(..input.len()) else {
        return Err(CodecError::CapacityExceeded {
            library: NAME.into(),
            operation,
            produced: input.len(),
            capacity: output.len(),
        });
    };
    dst.copy_from_slice(input);
    Ok(input.len())
}

impl Compressor for CopyCompressor {
    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        copy_into(input, output, Operation::Compress)
    }
}

impl Decompressor for CopyDecompressor {
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        copy_into(input, output, Operation::Decompress)
    }
}
