//! Deflate (zlib / raw / gzip) via flate2.
//!
//! The compressed size of deflate has no tight bound exposed by flate2, so the
//! engine reports an unknown bound and callers over-allocate.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::compression::types::{
    CodecError, CompressedBound, CompressionEngine, Compressor, Decompressor, Operation,
    ParameterInfo,
};
use crate::options::Options;

const NAME: &str = "deflate";

pub mod modes {
    pub const ZLIB: u8 = 0;
    pub const RAW: u8 = 1;
    pub const GZIP: u8 = 2;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DeflateEngine;

impl CompressionEngine for DeflateEngine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "DEFLATE with zlib, raw or gzip framing"
    }

    fn compression_level_info(&self) -> ParameterInfo {
        ParameterInfo::range(0, 9)
    }

    fn mode_info(&self, _level: u8) -> ParameterInfo {
        ParameterInfo::labeled(modes::ZLIB as u32, &["zlib", "raw", "gzip"])
    }

    fn compressed_bound(&self, _uncompressed: usize) -> CompressedBound {
        CompressedBound::Unknown
    }

    fn create_compressor(&self, options: &Options) -> Result<Box<dyn Compressor>, CodecError> {
        let level = Compression::new(options.compression_level() as u32);
        let compressor: Box<dyn Compressor> = match options.mode() {
            modes::GZIP => Box::new(GzipCompressor { level }),
            mode => Box::new(DeflateCompressor {
                inner: Compress::new(level, mode == modes::ZLIB),
            }),
        };
        Ok(compressor)
    }

    fn create_decompressor(&self, options: &Options) -> Result<Box<dyn Decompressor>, CodecError> {
        let decompressor: Box<dyn Decompressor> = match options.mode() {
            modes::GZIP => Box::new(GzipDecompressor),
            mode => Box::new(DeflateDecompressor {
                zlib_header: mode == modes::ZLIB,
                inner: Decompress::new(mode == modes::ZLIB),
            }),
        };
        Ok(decompressor)
    }
}

// ---- zlib / raw ----

pub struct DeflateCompressor {
    inner: Compress,
}

impl Compressor for DeflateCompressor {
    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        self.inner.reset();
        loop {
            let consumed = self.inner.total_in() as usize;
            let produced = self.inner.total_out() as usize;
            let status = self
                .inner
                .compress(&input[consumed..], &mut output[produced..], FlushCompress::Finish)
                .map_err(|e| CodecError::process(NAME, Operation::Compress, e))?;

            if status == Status::StreamEnd {
                return Ok(self.inner.total_out() as usize);
            }
            if self.inner.total_in() as usize == consumed && self.inner.total_out() as usize == produced {
                return Err(CodecError::process(
                    NAME,
                    Operation::Compress,
                    format!("output buffer of {} bytes exhausted", output.len()),
                ));
            }
        }
    }
}

pub struct DeflateDecompressor {
    zlib_header: bool,
    inner: Decompress,
}

impl Decompressor for DeflateDecompressor {
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        self.inner.reset(self.zlib_header);
        loop {
            let consumed = self.inner.total_in() as usize;
            let produced = self.inner.total_out() as usize;
            let status = self
                .inner
                .decompress(&input[consumed..], &mut output[produced..], FlushDecompress::Finish)
                .map_err(|e| CodecError::process(NAME, Operation::Decompress, e))?;

            if status == Status::StreamEnd {
                return Ok(self.inner.total_out() as usize);
            }
            if self.inner.total_in() as usize == consumed && self.inner.total_out() as usize == produced {
                return Err(CodecError::process(
                    NAME,
                    Operation::Decompress,
                    "truncated stream or output larger than expected",
                ));
            }
        }
    }
}

// ---- gzip ----

pub struct GzipCompressor {
    level: Compression,
}

impl Compressor for GzipCompressor {
    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        let mut enc = GzEncoder::new(Vec::with_capacity(output.len()), self.level);
        enc.write_all(input)
            .map_err(|e| CodecError::process(NAME, Operation::Compress, e))?;
        let compressed = enc
            .finish()
            .map_err(|e| CodecError::process(NAME, Operation::Compress, e))?;

        let Some(dst) = output.get_mut(..compressed.len()) else {
            return Err(CodecError::CapacityExceeded {
                library: NAME.into(),
                operation: Operation::Compress,
                produced: compressed.len(),
                capacity: output.len(),
            });
        };
        dst.copy_from_slice(&compressed);
        Ok(compressed.len())
    }
}

pub struct GzipDecompressor;

impl Decompressor for GzipDecompressor {
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        let mut dec = GzDecoder::new(input);
        let mut produced = 0;
        while produced < output.len() {
            let n = dec
                .read(&mut output[produced..])
                .map_err(|e| CodecError::process(NAME, Operation::Decompress, e))?;
            if n == 0 {
                return Ok(produced);
            }
            produced += n;
        }

        // Output is full; the stream must be exhausted as well.
        let mut probe = [0u8; 1];
        let extra = dec
            .read(&mut probe)
            .map_err(|e| CodecError::process(NAME, Operation::Decompress, e))?;
        if extra != 0 {
            return Err(CodecError::process(
                NAME,
                Operation::Decompress,
                "output larger than expected",
            ));
        }
        Ok(produced)
    }
}
