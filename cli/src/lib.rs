//! smash-cli
//!
//! Shared argument definitions, logging setup and result rendering for the
//! `smash`, `smash-client` and `smash-server` binaries.

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::{ArgAction, Args, ValueEnum};

use smash_core::compression::CodecRegistry;
use smash_core::constants::cli_defaults;
use smash_core::options::Options;
use smash_core::smash::Smash;
use smash_core::stats::{BenchResult, Estimate, RankKey};

// ---------------------------------------------------------------------------
// Argument normalization
// ---------------------------------------------------------------------------

/// Rewrite the historic single-dash `-wf` spelling so clap does not read it
/// as `-w f`.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| {
            if arg == "-wf" {
                "--work_factor".to_string()
            } else if let Some(value) = arg.strip_prefix("-wf=") {
                format!("--work_factor={value}")
            } else {
                arg
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Shared arguments
// ---------------------------------------------------------------------------

/// Library selection and codec options common to every front end.
#[derive(Args, Debug, Clone)]
pub struct CodecArgs {
    /// List the available compression libraries.
    #[arg(short = 'a', long = "available_libraries")]
    pub available_libraries: bool,

    /// Show the tunable parameters of a library.
    #[arg(short = 'i', long = "information", value_name = "LIB")]
    pub information: Option<String>,

    /// Compression library, or `all`.
    #[arg(
        short = 'c',
        long = "compression_library",
        value_name = "LIB",
        required_unless_present_any = ["available_libraries", "information"]
    )]
    pub compression_library: Option<String>,

    /// Input file.
    #[arg(
        short = 'f',
        long = "file",
        value_name = "PATH",
        required_unless_present_any = ["available_libraries", "information"]
    )]
    pub file: Option<std::path::PathBuf>,

    /// Compression level.
    #[arg(short = 'l', long = "level", default_value_t = cli_defaults::LEVEL)]
    pub level: u8,

    /// Window size.
    #[arg(short = 'w', long = "window", default_value_t = cli_defaults::WINDOW)]
    pub window: u32,

    /// Compression mode.
    #[arg(short = 'm', long = "mode", default_value_t = cli_defaults::MODE)]
    pub mode: u8,

    /// Work factor (`-wf` is accepted too).
    #[arg(long = "work_factor", default_value_t = cli_defaults::WORK_FACTOR)]
    pub work_factor: u8,

    /// Shuffle filter.
    #[arg(short = 's', long = "shuffle", default_value_t = cli_defaults::SHUFFLE)]
    pub shuffle: u8,

    /// Compression threads.
    #[arg(short = 't', long = "threads", default_value_t = cli_defaults::THREADS)]
    pub threads: u8,

    /// Benchmark every legal option combination.
    #[arg(short = 'b', long = "best_effort")]
    pub best_effort: bool,

    /// More log output (repeat for debug).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl CodecArgs {
    pub fn options(&self) -> Options {
        Options::new()
            .with_compression_level(self.level)
            .with_window_size(self.window)
            .with_mode(self.mode)
            .with_work_factor(self.work_factor)
            .with_shuffle(self.shuffle)
            .with_number_threads(self.threads)
    }

    /// Handle `-a` / `-i`. Returns `true` when nothing else should run.
    pub fn print_listings(&self, registry: &CodecRegistry) -> anyhow::Result<bool> {
        if self.available_libraries {
            print_available(registry);
        }
        if let Some(name) = &self.information {
            let smash = Smash::with_registry(registry, name)?;
            for line in smash.information() {
                println!("{line}");
            }
        }
        Ok(self.available_libraries || self.information.is_some())
    }

    pub fn library(&self) -> anyhow::Result<&str> {
        self.compression_library
            .as_deref()
            .context("missing --compression_library")
    }

    pub fn read_input(&self) -> anyhow::Result<Vec<u8>> {
        let path = self.file.as_deref().context("missing --file")?;
        read_file(path)
    }
}

/// Ranking key accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BestArg {
    None,
    Ratio,
    Compression,
    Transfer,
    Decompression,
    Total,
}

impl From<BestArg> for RankKey {
    fn from(arg: BestArg) -> Self {
        match arg {
            BestArg::None => RankKey::None,
            BestArg::Ratio => RankKey::Ratio,
            BestArg::Compression => RankKey::Compression,
            BestArg::Transfer => RankKey::Transfer,
            BestArg::Decompression => RankKey::Decompression,
            BestArg::Total => RankKey::Total,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// `warn` by default, `info` with `-v`, `debug` with `-vv`; `RUST_LOG` wins.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

pub fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

pub fn print_available(registry: &CodecRegistry) {
    println!("Available compression libraries:");
    for info in registry.describe() {
        println!("  {:<10} {}", info.name, info.description);
    }
}

fn estimate(e: Option<Estimate>) -> String {
    match e {
        Some(e) if e.std_dev > 0.0 => format!("{:>9.2} ±{:>7.2}", e.mean, e.std_dev),
        Some(e) => format!("{:>9.2}         ", e.mean),
        None => format!("{:>9}         ", "-"),
    }
}

pub fn print_title(original_size: usize, repetitions: u32, networked: bool, pipelined: bool) {
    println!(
        "Original size: {} bytes, repetitions: {}{}",
        original_size,
        repetitions,
        if pipelined { ", pipelined" } else { "" }
    );
    let transfer = if networked { "transfer MB/s      " } else { "" };
    println!(
        "{:<48} {:>8}  {:<18}{}{:<18}{:<18}",
        "configuration", "ratio", "compression MB/s", transfer, "decompression MB/s", "total MB/s"
    );
}

pub fn format_result(result: &BenchResult, networked: bool) -> String {
    let t = &result.throughput;
    let transfer = if networked {
        format!("{} ", estimate(t.transfer))
    } else {
        String::new()
    };
    format!(
        "{:<48} {:>8.3}  {} {}{} {}",
        result.summary,
        result.ratio(),
        estimate(t.compression),
        transfer,
        estimate(t.decompression),
        estimate(Some(t.total)),
    )
}

pub fn print_results(results: &[BenchResult], networked: bool) {
    for result in results {
        println!("{}", format_result(result, networked));
    }
}

pub fn print_json(results: &[BenchResult]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}
