//! compression/codec.rs
//! Role state machine over a `CompressionEngine`.
//!
//! A codec instance is either unconfigured, armed as a compressor or armed as
//! a decompressor. `transition` is the only place role resources are released
//! and replaced.

use crate::compression::types::{
    parameter_info, supported_parameters, CodecError, CompressedBound, CompressionEngine,
    Compressor, Decompressor, Operation, Parameter, ParameterInfo, ParameterSet, Role,
};
use crate::options::Options;

enum RoleState {
    Unconfigured,
    Compressor {
        options: Options,
        inner: Box<dyn Compressor>,
    },
    Decompressor {
        options: Options,
        inner: Box<dyn Decompressor>,
    },
}

impl RoleState {
    fn role(&self) -> Role {
        match self {
            RoleState::Unconfigured => Role::Unconfigured,
            RoleState::Compressor { .. } => Role::Compressor,
            RoleState::Decompressor { .. } => Role::Decompressor,
        }
    }
}

pub struct Codec {
    engine: Box<dyn CompressionEngine>,
    state: RoleState,
}

impl Codec {
    pub fn new(engine: Box<dyn CompressionEngine>) -> Self {
        Self {
            engine,
            state: RoleState::Unconfigured,
        }
    }

    pub fn name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn description(&self) -> &'static str {
        self.engine.description()
    }

    pub fn role(&self) -> Role {
        self.state.role()
    }

    /// Options the active role was armed with.
    pub fn options(&self) -> Option<&Options> {
        match &self.state {
            RoleState::Unconfigured => None,
            RoleState::Compressor { options, .. } | RoleState::Decompressor { options, .. } => {
                Some(options)
            }
        }
    }

    pub fn check_options(&self, options: &Options, for_compressor: bool) -> bool {
        self.engine.check_options(options, for_compressor)
    }

    /// Arm the compressor role. On validation failure the current state is kept.
    pub fn set_options_compressor(&mut self, options: Options) -> Result<(), CodecError> {
        if !self.engine.check_options(&options, true) {
            return Err(CodecError::InvalidOptions {
                library: self.name().into(),
            });
        }
        let engine = &self.engine;
        Self::transition(&mut self.state, || {
            let inner = engine.create_compressor(&options)?;
            Ok(RoleState::Compressor { options, inner })
        })
    }

    /// Arm the decompressor role. On validation failure the current state is kept.
    pub fn set_options_decompressor(&mut self, options: Options) -> Result<(), CodecError> {
        if !self.engine.check_options(&options, false) {
            return Err(CodecError::InvalidOptions {
                library: self.name().into(),
            });
        }
        let engine = &self.engine;
        Self::transition(&mut self.state, || {
            let inner = engine.create_decompressor(&options)?;
            Ok(RoleState::Decompressor { options, inner })
        })
    }

    /// Release the active role (if any), then arm the next one.
    /// A failed arm leaves the codec unconfigured.
    fn transition<F>(state: &mut RoleState, arm: F) -> Result<(), CodecError>
    where
        F: FnOnce() -> Result<RoleState, CodecError>,
    {
        let previous = std::mem::replace(state, RoleState::Unconfigured);
        drop(previous);

        *state = arm()?;
        Ok(())
    }

    pub fn estimate_compressed_bound(&self, uncompressed: usize) -> CompressedBound {
        self.engine.compressed_bound(uncompressed)
    }

    /// Compress `input` into `output`; `output.len()` is the capacity.
    pub fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        let role = self.role();
        let library = self.engine.name();
        let RoleState::Compressor { inner, .. } = &mut self.state else {
            return Err(CodecError::WrongRole {
                library: library.into(),
                operation: Operation::Compress,
                role,
            });
        };

        let capacity = output.len();
        let produced = inner.compress(input, output)?;
        if produced > capacity {
            return Err(CodecError::CapacityExceeded {
                library: library.into(),
                operation: Operation::Compress,
                produced,
                capacity,
            });
        }
        Ok(produced)
    }

    /// Decompress `input` into `output`; `output.len()` is the expected size.
    pub fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        let role = self.role();
        let library = self.engine.name();
        let exact = self.engine.exact_decompressed_size();
        let RoleState::Decompressor { inner, .. } = &mut self.state else {
            return Err(CodecError::WrongRole {
                library: library.into(),
                operation: Operation::Decompress,
                role,
            });
        };

        let expected = output.len();
        let produced = inner.decompress(input, output)?;
        if produced > expected {
            return Err(CodecError::CapacityExceeded {
                library: library.into(),
                operation: Operation::Decompress,
                produced,
                capacity: expected,
            });
        }
        if exact && produced != expected {
            return Err(CodecError::SizeMismatch {
                library: library.into(),
                expected,
                actual: produced,
            });
        }
        Ok(produced)
    }

    // ---- Introspection ----

    pub fn compression_level_info(&self) -> ParameterInfo {
        self.engine.compression_level_info()
    }

    pub fn window_size_info(&self) -> ParameterInfo {
        self.engine.window_size_info()
    }

    pub fn mode_info(&self, level: u8) -> ParameterInfo {
        self.engine.mode_info(level)
    }

    pub fn work_factor_info(&self) -> ParameterInfo {
        self.engine.work_factor_info()
    }

    pub fn shuffle_info(&self) -> ParameterInfo {
        self.engine.shuffle_info()
    }

    pub fn number_threads_info(&self) -> ParameterInfo {
        self.engine.number_threads_info()
    }

    pub fn parameter_info(&self, param: Parameter, options: &Options) -> ParameterInfo {
        parameter_info(self.engine.as_ref(), param, options)
    }

    pub fn supported_parameters(&self) -> ParameterSet {
        supported_parameters(self.engine.as_ref())
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("engine", &self.engine.name())
            .field("role", &self.role())
            .finish()
    }
}
