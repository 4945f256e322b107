//! bench/local.rs
//! In-process benchmark: compress, decompress and compare once per
//! configuration.

use std::fs;
use std::path::PathBuf;

use crate::bench::plan::{plan, Configuration};
use crate::bench::{summarize, BenchReport};
use crate::compression::CodecRegistry;
use crate::options::Options;
use crate::smash::Smash;
use crate::stats::{BenchResult, SampleSet};
use crate::telemetry::{Stage, TrialSnapshot, TrialTimer};
use crate::types::SmashError;

#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// Library name or `all`.
    pub library: String,
    pub options: Options,
    /// Enumerate every legal option combination.
    pub best_effort: bool,
    /// Compressed output, overwritten by every successful configuration.
    pub output: Option<PathBuf>,
}

impl LocalConfig {
    pub fn new(library: &str, options: Options) -> Self {
        Self {
            library: library.into(),
            options,
            best_effort: false,
            output: None,
        }
    }
}

/// Run every planned configuration over `data`.
///
/// Codec and integrity failures are collected in the report; resource
/// errors abort the run.
pub fn run_local(
    registry: &CodecRegistry,
    data: &[u8],
    config: &LocalConfig,
) -> Result<BenchReport, SmashError> {
    let configurations = plan(registry, &config.library, config.options, config.best_effort)?;
    let mut report = BenchReport::default();

    for configuration in &configurations {
        let outcome = run_configuration(registry, data, configuration, config.output.as_ref());
        report.record(configuration, outcome)?;
    }
    Ok(report)
}

fn run_configuration(
    registry: &CodecRegistry,
    data: &[u8],
    configuration: &Configuration,
    output: Option<&PathBuf>,
) -> Result<BenchResult, SmashError> {
    let mut smash = Smash::with_registry(registry, &configuration.library)?;
    let mut timer = TrialTimer::new();

    smash.set_options_compressor(configuration.options)?;
    let mut compressed = vec![0u8; smash.compressed_capacity(data.len())];
    let produced = timer.time(Stage::Compress, || smash.compress(data, &mut compressed))?;
    compressed.truncate(produced);

    smash.set_options_decompressor(configuration.options)?;
    let mut decompressed = vec![0u8; data.len()];
    let restored = timer.time(Stage::Decompress, || {
        smash.decompress(&compressed, &mut decompressed)
    })?;
    decompressed.truncate(restored);

    if !Smash::compare_data(data, &decompressed) {
        return Err(SmashError::Integrity {
            library: configuration.library.clone(),
        });
    }

    if let Some(path) = output {
        fs::write(path, &compressed).map_err(|e| SmashError::resource(path, e))?;
    }

    let mut samples = SampleSet::sequential();
    samples.record(&TrialSnapshot::from_stage_times(
        data.len() as u64,
        produced as u64,
        timer.into_stage_times(),
    ));
    summarize(&smash, &configuration.options, data.len(), produced as u64, &samples)
}
