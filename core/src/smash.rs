//! smash.rs
//! Facade over one named codec: resolves it, forwards the capability
//! interface and provides the data-integrity comparator.

use crate::compression::{
    Codec, CodecError, CodecRegistry, CompressedBound, Parameter, ParameterInfo, ParameterSet,
    Role,
};
use crate::options::Options;

#[derive(Debug)]
pub struct Smash {
    codec: Codec,
}

impl Smash {
    /// Resolve `library` in the built-in registry.
    pub fn new(library: &str) -> Result<Self, CodecError> {
        Self::with_registry(&CodecRegistry::builtin(), library)
    }

    pub fn with_registry(registry: &CodecRegistry, library: &str) -> Result<Self, CodecError> {
        Ok(Self {
            codec: registry.create_codec(library)?,
        })
    }

    pub fn name(&self) -> &'static str {
        self.codec.name()
    }

    pub fn role(&self) -> Role {
        self.codec.role()
    }

    pub fn check_options(&self, options: &Options, for_compressor: bool) -> bool {
        self.codec.check_options(options, for_compressor)
    }

    pub fn set_options_compressor(&mut self, options: Options) -> Result<(), CodecError> {
        self.codec.set_options_compressor(options)
    }

    pub fn set_options_decompressor(&mut self, options: Options) -> Result<(), CodecError> {
        self.codec.set_options_decompressor(options)
    }

    pub fn compressed_bound(&self, uncompressed: usize) -> CompressedBound {
        self.codec.estimate_compressed_bound(uncompressed)
    }

    /// Buffer size to allocate for compressing `uncompressed` bytes.
    pub fn compressed_capacity(&self, uncompressed: usize) -> usize {
        self.compressed_bound(uncompressed).capacity(uncompressed)
    }

    pub fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        self.codec.compress(input, output)
    }

    pub fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        self.codec.decompress(input, output)
    }

    /// Compress into a freshly sized buffer, truncated to the produced length.
    pub fn compress_to_vec(&mut self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut out = vec![0u8; self.compressed_capacity(input.len())];
        let n = self.compress(input, &mut out)?;
        out.truncate(n);
        Ok(out)
    }

    /// True when both buffers hold the same bytes.
    pub fn compare_data(original: &[u8], decompressed: &[u8]) -> bool {
        original.len() == decompressed.len() && original == decompressed
    }

    // ---- Introspection ----

    pub fn compression_level_info(&self) -> ParameterInfo {
        self.codec.compression_level_info()
    }

    pub fn window_size_info(&self) -> ParameterInfo {
        self.codec.window_size_info()
    }

    pub fn mode_info(&self, level: u8) -> ParameterInfo {
        self.codec.mode_info(level)
    }

    pub fn work_factor_info(&self) -> ParameterInfo {
        self.codec.work_factor_info()
    }

    pub fn shuffle_info(&self) -> ParameterInfo {
        self.codec.shuffle_info()
    }

    pub fn number_threads_info(&self) -> ParameterInfo {
        self.codec.number_threads_info()
    }

    pub fn parameter_info(&self, param: Parameter, options: &Options) -> ParameterInfo {
        self.codec.parameter_info(param, options)
    }

    pub fn supported_parameters(&self) -> ParameterSet {
        self.codec.supported_parameters()
    }

    pub fn mode_name(&self, level: u8, mode: u8) -> String {
        self.mode_info(level).label(mode as u32)
    }

    pub fn shuffle_name(&self, shuffle: u8) -> String {
        self.shuffle_info().label(shuffle as u32)
    }

    /// Human-readable capability lines, one per supported parameter.
    pub fn information(&self) -> Vec<String> {
        let mut lines = vec![format!("{}: {}", self.name(), self.codec.description())];
        let level = self.compression_level_info();

        for param in Parameter::ALL {
            if param == Parameter::Mode && level.supported {
                for l in level.minimum..=level.maximum {
                    let info = self.mode_info(l as u8);
                    if info.supported {
                        lines.push(format!("  {} (level {}): {}", param, l, describe(&info)));
                    }
                }
                continue;
            }
            let info = self.parameter_info(param, &Options::new());
            if info.supported {
                lines.push(format!("  {}: {}", param, describe(&info)));
            }
        }
        lines
    }
}

fn describe(info: &ParameterInfo) -> String {
    if info.labels.is_empty() {
        return format!("[{}-{}]", info.minimum, info.maximum);
    }
    let named: Vec<String> = (info.minimum..=info.maximum)
        .map(|v| format!("{}={}", v, info.label(v)))
        .collect();
    format!("[{}-{}] {}", info.minimum, info.maximum, named.join(", "))
}
