//! Network benchmark client.

use std::process::ExitCode;

use clap::Parser;

use smash_cli::{
    init_logging, normalize_args, print_json, print_results, print_title, BestArg, CodecArgs,
};
use smash_core::bench::{run_client, BenchRequest, ClientConfig};
use smash_core::compression::CodecRegistry;
use smash_core::constants::{cli_defaults, DEFAULT_CHUNK_SIZE, DEFAULT_INFLIGHT_CHUNKS};
use smash_core::pipeline::PipelineConfig;
use smash_core::transport::Connection;

/// Compression library network benchmark (client side).
#[derive(Parser, Debug)]
#[command(name = "smash-client", version, about = "Compression network benchmark client")]
struct Cli {
    #[command(flatten)]
    codec: CodecArgs,

    /// Server address.
    #[arg(long = "address", default_value = "127.0.0.1")]
    address: String,

    /// Server port.
    #[arg(short = 'p', long = "port", default_value_t = cli_defaults::PORT)]
    port: u16,

    /// Trials per configuration.
    #[arg(
        short = 'r',
        long = "repetitions",
        default_value_t = cli_defaults::REPETITIONS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    repetitions: u32,

    /// Rank results by this metric.
    #[arg(long = "best", value_enum, default_value_t = BestArg::None)]
    best: BestArg,

    /// Keep only this many ranked results (0 keeps all).
    #[arg(short = 'n', long = "best_number", default_value_t = 0)]
    best_number: u32,

    /// Overlap compression and transfer in chunks.
    #[arg(long = "pipeline")]
    pipeline: bool,

    /// Pipelined chunk size in bytes.
    #[arg(long = "chunk_size", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Pipelined compression threads (defaults to the CPU count minus one).
    #[arg(long = "pipeline_threads")]
    pipeline_threads: Option<usize>,

    /// Compressed chunks allowed in flight.
    #[arg(long = "number_of_chunks", default_value_t = DEFAULT_INFLIGHT_CHUNKS)]
    number_of_chunks: usize,

    /// Print the results as JSON.
    #[arg(long = "json")]
    json: bool,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        let workers = self
            .pipeline_threads
            .unwrap_or_else(|| PipelineConfig::dynamic(self.chunk_size).worker_count);
        PipelineConfig::new(self.chunk_size, workers, self.number_of_chunks)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_from(normalize_args(std::env::args()));
    init_logging(cli.codec.verbose);

    let registry = CodecRegistry::builtin();
    if cli.codec.print_listings(&registry)? {
        return Ok(ExitCode::SUCCESS);
    }

    let data = cli.codec.read_input()?;
    let mut request = BenchRequest::new(cli.codec.library()?, cli.codec.options());
    request.all_options = cli.codec.best_effort;
    request.best = cli.best.into();
    request.best_count = cli.best_number;
    request.repetitions = cli.repetitions;
    request.pipelined = cli.pipeline;

    let config = ClientConfig {
        request,
        pipeline: cli.pipeline_config(),
    };

    let mut conn = Connection::connect((cli.address.as_str(), cli.port))?;
    log::info!("[CLIENT] connected to {}", conn.peer());
    let report = run_client(&mut conn, &registry, &config, &data)?;

    for failure in &report.failures {
        println!("ERROR: {}", failure.error);
    }
    if cli.json {
        print_json(&report.results)?;
    } else if !report.results.is_empty() {
        print_title(data.len(), cli.repetitions, true, cli.pipeline);
        print_results(&report.results, true);
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
