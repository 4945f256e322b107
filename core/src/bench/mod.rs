//! bench/mod.rs
//! Benchmark drivers.
//!
//! - `local`    in-process compress / decompress / compare
//! - `client`   network client, sequential or pipelined trials
//! - `server`   receiving side of the network benchmark
//! - `plan`     configuration expansion and the options walker
//! - `protocol` request header

pub mod client;
pub mod local;
pub mod plan;
pub mod protocol;
pub mod server;

pub use client::{run_client, ClientConfig};
pub use local::{run_local, LocalConfig};
pub use plan::{all_options, describe_options, plan, Configuration};
pub use protocol::BenchRequest;
pub use server::{serve, serve_connection, ServerConfig};

use crate::options::Options;
use crate::smash::Smash;
use crate::stats::{aggregate, BenchResult, SampleSet};
use crate::types::SmashError;

/// A configuration that did not produce a result.
#[derive(Debug)]
pub struct ConfigFailure {
    pub library: String,
    pub options: Options,
    pub error: SmashError,
}

#[derive(Debug, Default)]
pub struct BenchReport {
    pub results: Vec<BenchResult>,
    pub failures: Vec<ConfigFailure>,
}

impl BenchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Keep the outcome of one configuration; fatal errors end the run.
    fn record(
        &mut self,
        configuration: &Configuration,
        outcome: Result<BenchResult, SmashError>,
    ) -> Result<(), SmashError> {
        match outcome {
            Ok(result) => {
                log::info!("{}", result.summary);
                self.results.push(result);
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                log::warn!("{} {:?}: {e}", configuration.library, configuration.options);
                self.failures.push(ConfigFailure {
                    library: configuration.library.clone(),
                    options: configuration.options,
                    error: e,
                });
                Ok(())
            }
        }
    }
}

fn summarize(
    smash: &Smash,
    options: &Options,
    original_size: usize,
    compressed_size: u64,
    samples: &SampleSet,
) -> Result<BenchResult, SmashError> {
    Ok(BenchResult {
        summary: describe_options(smash, options),
        library: smash.name().to_string(),
        options: *options,
        original_size: original_size as u64,
        compressed_size,
        throughput: aggregate(samples)?,
    })
}
