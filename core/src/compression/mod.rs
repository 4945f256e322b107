//! compression/mod.rs
//! Uniform, capability-introspectable codec layer.
//!
//! - `types` holds the capability descriptors and the engine traits.
//! - `codec` wraps an engine in the compressor/decompressor role state machine.
//! - `registry` resolves engines by name.

pub mod codec;
pub mod codecs;
pub mod constants;
pub mod registry;
pub mod shuffle;
pub mod types;

pub use codec::Codec;
pub use constants::*;
pub use registry::*;
pub use types::*;
