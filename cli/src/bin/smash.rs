//! Local benchmark: compress, decompress and compare a file in process.

use std::process::ExitCode;

use clap::Parser;

use smash_cli::{init_logging, normalize_args, print_results, print_title, CodecArgs};
use smash_core::bench::{run_local, LocalConfig};
use smash_core::compression::CodecRegistry;

/// Compression library benchmark.
#[derive(Parser, Debug)]
#[command(name = "smash", version, about = "Compression library benchmark")]
struct Cli {
    #[command(flatten)]
    codec: CodecArgs,

    /// Write the compressed data here (overwritten per configuration).
    #[arg(short = 'o', long = "output_file", value_name = "PATH")]
    output_file: Option<std::path::PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_from(normalize_args(std::env::args()));
    init_logging(cli.codec.verbose);

    let registry = CodecRegistry::builtin();
    if cli.codec.print_listings(&registry)? {
        return Ok(ExitCode::SUCCESS);
    }

    let data = cli.codec.read_input()?;
    let config = LocalConfig {
        library: cli.codec.library()?.to_string(),
        options: cli.codec.options(),
        best_effort: cli.codec.best_effort,
        output: cli.output_file.clone(),
    };

    let report = run_local(&registry, &data, &config)?;
    for failure in &report.failures {
        println!("ERROR: {}", failure.error);
    }
    if !report.results.is_empty() {
        print_title(data.len(), 1, false, false);
        print_results(&report.results, false);
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
