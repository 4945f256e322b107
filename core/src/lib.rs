//! smash-core
//!
//! Compression codec benchmark: one capability interface over several
//! compression engines, a framed transport, a pipelined chunk engine and
//! trimmed throughput statistics.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod options;
pub mod types;

// Codec layer
pub mod compression;
pub mod smash;

// Transfer
pub mod pipeline;
pub mod transport;

// Measurement
pub mod stats;
pub mod telemetry;

// Drivers
pub mod bench;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::bench::{
        run_client, run_local, serve, BenchReport, BenchRequest, ClientConfig, LocalConfig,
        ServerConfig,
    };
    pub use crate::compression::{CodecError, CodecRegistry, Parameter, ParameterInfo, Role};
    pub use crate::options::Options;
    pub use crate::pipeline::{PipelineConfig, PipelineEngine, PipelineError};
    pub use crate::smash::Smash;
    pub use crate::stats::{BenchResult, RankKey};
    pub use crate::transport::{Connection, TransportError};
    pub use crate::types::SmashError;
}
