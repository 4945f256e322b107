//! compression/types.rs
//! Capability descriptors, role state and the engine/resource traits.

use std::fmt;

use bitflags::bitflags;
use thiserror::Error;

use crate::constants::{UNKNOWN_BOUND_FACTOR, UNKNOWN_BOUND_MIN};
use crate::options::Options;

// ============================================================
// Errors
// ============================================================

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unknown compression library: {name}")]
    UnknownLibrary { name: String },

    #[error("{library}: options rejected")]
    InvalidOptions { library: String },

    #[error("{library}: cannot {operation} while {role}")]
    WrongRole {
        library: String,
        operation: Operation,
        role: Role,
    },

    #[error("{library}: {operation} produced {produced} bytes, capacity {capacity}")]
    CapacityExceeded {
        library: String,
        operation: Operation,
        produced: usize,
        capacity: usize,
    },

    #[error("{library}: decompressed {actual} bytes, expected {expected}")]
    SizeMismatch {
        library: String,
        expected: usize,
        actual: usize,
    },

    #[error("{library}: codec init failed: {msg}")]
    CodecInitFailed { library: String, msg: String },

    #[error("{library}: {operation} failed: {msg}")]
    CodecProcessFailed {
        library: String,
        operation: Operation,
        msg: String,
    },
}

impl CodecError {
    pub fn init(library: &str, msg: impl fmt::Display) -> Self {
        CodecError::CodecInitFailed {
            library: library.into(),
            msg: msg.to_string(),
        }
    }

    pub fn process(library: &str, operation: Operation, msg: impl fmt::Display) -> Self {
        CodecError::CodecProcessFailed {
            library: library.into(),
            operation,
            msg: msg.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Compress,
    Decompress,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Compress => "compress",
            Operation::Decompress => "decompress",
        })
    }
}

// ============================================================
// Role state
// ============================================================

/// Which role a codec instance is currently armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Unconfigured,
    Compressor,
    Decompressor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Unconfigured => "unconfigured",
            Role::Compressor => "configured as compressor",
            Role::Decompressor => "configured as decompressor",
        })
    }
}

// ============================================================
// Capability descriptors
// ============================================================

/// Tunable parameters, in enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    CompressionLevel,
    Mode,
    WindowSize,
    WorkFactor,
    Shuffle,
    NumberThreads,
}

impl Parameter {
    pub const ALL: [Parameter; 6] = [
        Parameter::CompressionLevel,
        Parameter::Mode,
        Parameter::WindowSize,
        Parameter::WorkFactor,
        Parameter::Shuffle,
        Parameter::NumberThreads,
    ];

    /// Parameters that only matter while compressing.
    pub fn compressor_only(self) -> bool {
        matches!(
            self,
            Parameter::CompressionLevel | Parameter::WorkFactor | Parameter::NumberThreads
        )
    }

    pub fn flag(self) -> ParameterSet {
        match self {
            Parameter::CompressionLevel => ParameterSet::LEVEL,
            Parameter::Mode => ParameterSet::MODE,
            Parameter::WindowSize => ParameterSet::WINDOW,
            Parameter::WorkFactor => ParameterSet::WORK_FACTOR,
            Parameter::Shuffle => ParameterSet::SHUFFLE,
            Parameter::NumberThreads => ParameterSet::THREADS,
        }
    }

    pub fn value_of(self, options: &Options) -> u32 {
        match self {
            Parameter::CompressionLevel => options.compression_level() as u32,
            Parameter::Mode => options.mode() as u32,
            Parameter::WindowSize => options.window_size(),
            Parameter::WorkFactor => options.work_factor() as u32,
            Parameter::Shuffle => options.shuffle() as u32,
            Parameter::NumberThreads => options.number_threads() as u32,
        }
    }

    /// Store `value` into the matching field. Values are always taken from
    /// the engine's reported range, so narrowing never truncates.
    pub fn apply(self, options: &mut Options, value: u32) {
        let narrow = |v: u32| u8::try_from(v).unwrap_or(u8::MAX);
        match self {
            Parameter::CompressionLevel => options.set_compression_level(narrow(value)),
            Parameter::Mode => options.set_mode(narrow(value)),
            Parameter::WindowSize => options.set_window_size(value),
            Parameter::WorkFactor => options.set_work_factor(narrow(value)),
            Parameter::Shuffle => options.set_shuffle(narrow(value)),
            Parameter::NumberThreads => options.set_number_threads(narrow(value)),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Parameter::CompressionLevel => "compression level",
            Parameter::Mode => "mode",
            Parameter::WindowSize => "window size",
            Parameter::WorkFactor => "work factor",
            Parameter::Shuffle => "shuffle",
            Parameter::NumberThreads => "number of threads",
        })
    }
}

bitflags! {
    /// Set of parameters an engine supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParameterSet: u8 {
        const LEVEL       = 0b0000_0001;
        const MODE        = 0b0000_0010;
        const WINDOW      = 0b0000_0100;
        const WORK_FACTOR = 0b0000_1000;
        const SHUFFLE     = 0b0001_0000;
        const THREADS     = 0b0010_0000;
    }
}

/// Capability of one parameter: inclusive range plus optional per-value labels.
///
/// An unsupported parameter reports an empty range (`minimum == maximum == 0`)
/// and no labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub supported: bool,
    pub minimum: u32,
    pub maximum: u32,
    pub labels: Vec<String>,
}

impl ParameterInfo {
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            minimum: 0,
            maximum: 0,
            labels: Vec::new(),
        }
    }

    pub fn range(minimum: u32, maximum: u32) -> Self {
        Self {
            supported: true,
            minimum,
            maximum,
            labels: Vec::new(),
        }
    }

    /// Range whose values are named; label `i` names value `minimum + i`.
    pub fn labeled(minimum: u32, labels: &[&str]) -> Self {
        let span = labels.len().saturating_sub(1) as u32;
        Self {
            supported: true,
            minimum,
            maximum: minimum + span,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn contains(&self, value: u32) -> bool {
        self.supported && value >= self.minimum && value <= self.maximum
    }

    /// Label for `value`, falling back to its decimal form.
    pub fn label(&self, value: u32) -> String {
        value
            .checked_sub(self.minimum)
            .and_then(|i| self.labels.get(i as usize))
            .cloned()
            .unwrap_or_else(|| value.to_string())
    }
}

/// Upper bound an engine promises for compressed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressedBound {
    Exact(usize),
    Unknown,
}

impl CompressedBound {
    /// Bytes a caller should allocate for the output of `uncompressed` bytes.
    pub fn capacity(self, uncompressed: usize) -> usize {
        match self {
            CompressedBound::Exact(n) => n,
            CompressedBound::Unknown => uncompressed
                .saturating_mul(UNKNOWN_BOUND_FACTOR)
                .max(UNKNOWN_BOUND_MIN),
        }
    }

    pub fn is_exact(self) -> bool {
        matches!(self, CompressedBound::Exact(_))
    }
}

// ============================================================
// Role-scoped resources
// ============================================================

// Require Send so trait objects can cross thread boundaries.
pub trait Compressor: Send {
    /// Compress `input` into `output`, returning the bytes written.
    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError>;
}

pub trait Decompressor: Send {
    /// Decompress `input` into `output`, returning the bytes written.
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError>;
}

// ============================================================
// Engine
// ============================================================

/// One external compression library behind the uniform capability contract.
///
/// An engine is a stateless descriptor; role-scoped native state lives in
/// the `Compressor`/`Decompressor` objects it creates.
pub trait CompressionEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    fn compression_level_info(&self) -> ParameterInfo {
        ParameterInfo::unsupported()
    }

    fn window_size_info(&self) -> ParameterInfo {
        ParameterInfo::unsupported()
    }

    /// Mode range for the given compression level.
    fn mode_info(&self, _level: u8) -> ParameterInfo {
        ParameterInfo::unsupported()
    }

    fn work_factor_info(&self) -> ParameterInfo {
        ParameterInfo::unsupported()
    }

    fn shuffle_info(&self) -> ParameterInfo {
        ParameterInfo::unsupported()
    }

    fn number_threads_info(&self) -> ParameterInfo {
        ParameterInfo::unsupported()
    }

    /// Whether decompression always knows the exact output size.
    fn exact_decompressed_size(&self) -> bool {
        true
    }

    fn compressed_bound(&self, uncompressed: usize) -> CompressedBound;

    /// Validate every populated field; never fails, logs each violation.
    fn check_options(&self, options: &Options, for_compressor: bool) -> bool {
        check_ranges(self, options, for_compressor)
    }

    fn create_compressor(&self, options: &Options) -> Result<Box<dyn Compressor>, CodecError>;

    fn create_decompressor(&self, options: &Options) -> Result<Box<dyn Decompressor>, CodecError>;
}

/// Capability of `param` given the options chosen so far.
pub fn parameter_info<E: CompressionEngine + ?Sized>(
    engine: &E,
    param: Parameter,
    options: &Options,
) -> ParameterInfo {
    match param {
        Parameter::CompressionLevel => engine.compression_level_info(),
        Parameter::Mode => engine.mode_info(options.compression_level()),
        Parameter::WindowSize => engine.window_size_info(),
        Parameter::WorkFactor => engine.work_factor_info(),
        Parameter::Shuffle => engine.shuffle_info(),
        Parameter::NumberThreads => engine.number_threads_info(),
    }
}

pub fn supported_parameters<E: CompressionEngine + ?Sized>(engine: &E) -> ParameterSet {
    let probe = Options::new();
    Parameter::ALL
        .iter()
        .filter(|p| {
            parameter_info(engine, **p, &probe).supported
                // mode support may only show up for some levels
                || (**p == Parameter::Mode && engine_has_any_mode(engine))
        })
        .fold(ParameterSet::empty(), |set, p| set | p.flag())
}

fn engine_has_any_mode<E: CompressionEngine + ?Sized>(engine: &E) -> bool {
    let levels = engine.compression_level_info();
    if !levels.supported {
        return engine.mode_info(0).supported;
    }
    (levels.minimum..=levels.maximum).any(|l| engine.mode_info(l as u8).supported)
}

/// Range check used by `CompressionEngine::check_options`.
pub fn check_ranges<E: CompressionEngine + ?Sized>(
    engine: &E,
    options: &Options,
    for_compressor: bool,
) -> bool {
    let mut ok = true;
    for param in Parameter::ALL {
        if param.compressor_only() && !for_compressor {
            continue;
        }
        let info = parameter_info(engine, param, options);
        if !info.supported {
            continue;
        }
        let value = param.value_of(options);
        if !info.contains(value) {
            log::warn!(
                "{}: {} {} out of range [{}-{}]",
                engine.name(),
                param,
                value,
                info.minimum,
                info.maximum
            );
            ok = false;
        }
    }
    ok
}
