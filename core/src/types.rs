use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::compression::CodecError;
use crate::pipeline::{FrameError, PipelineError};
use crate::stats::StatsError;
use crate::transport::TransportError;

/// Unified error covering every layer of a benchmark run.
/// - `From<T>` impls enable `?` across codec, transport, pipeline and stats.
/// - `is_fatal` separates errors that end the run from errors that only end
///   one configuration.
#[derive(Debug, Error)]
pub enum SmashError {
    /// Options rejected or engine failure; ends one configuration.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Socket read/write or framing state failure; ends the run.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("statistics error: {0}")]
    Stats(#[from] StatsError),

    /// Decompressed bytes differ from the original.
    #[error("{library} does not obtain the correct data")]
    Integrity { library: String },

    /// Missing input or unwritable output.
    #[error("{}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Peer sent a request this side cannot honour.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SmashError {
    pub fn resource(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SmashError::Resource {
            path: path.into(),
            source,
        }
    }

    /// True when the whole run must stop.
    pub fn is_fatal(&self) -> bool {
        match self {
            SmashError::Transport(TransportError::Nack) => false,
            SmashError::Transport(_) | SmashError::Resource { .. } | SmashError::Protocol(_) => true,
            SmashError::Pipeline(e) => e.is_fatal(),
            SmashError::Codec(_) | SmashError::Stats(_) | SmashError::Integrity { .. } => false,
        }
    }
}

impl From<FrameError> for SmashError {
    fn from(e: FrameError) -> Self {
        SmashError::Pipeline(e.into())
    }
}

impl From<io::Error> for SmashError {
    fn from(e: io::Error) -> Self {
        SmashError::Transport(e.into())
    }
}
