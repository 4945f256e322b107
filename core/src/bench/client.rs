//! bench/client.rs
//! Network benchmark client.
//!
//! Per configuration the raw file travels once, then `repetitions` trials run
//! either sequentially (compress, transfer, remote decompress) or through the
//! pipeline engine (one overlapped end-to-end timing per trial).

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use crate::bench::plan::Configuration;
use crate::bench::protocol::BenchRequest;
use crate::bench::{summarize, BenchReport};
use crate::compression::CodecRegistry;
use crate::constants::TRIAL_ABORTED;
use crate::pipeline::{ChunkHeader, PipelineConfig, PipelineEngine, PipelineError};
use crate::smash::Smash;
use crate::stats::{select_best, BenchResult, SampleSet};
use crate::telemetry::{Stage, TrialSnapshot, TrialTimer};
use crate::transport::{Connection, TransportError};
use crate::types::SmashError;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub request: BenchRequest,
    /// Used when `request.pipelined` is set.
    pub pipeline: PipelineConfig,
}

impl ClientConfig {
    pub fn new(request: BenchRequest) -> Self {
        Self {
            request,
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Drive one benchmark over `conn`. Results come back ranked and truncated as
/// the request asks.
pub fn run_client<S: Read + Write>(
    conn: &mut Connection<S>,
    registry: &CodecRegistry,
    config: &ClientConfig,
    data: &[u8],
) -> Result<BenchReport, SmashError> {
    let request = &config.request;
    if request.pipelined {
        config.pipeline.validate()?;
    }
    let configurations = request.plan(registry)?;
    request.send(conn)?;
    log::info!(
        "[CLIENT] {} configurations, {} repetitions, {}",
        configurations.len(),
        request.repetitions,
        if request.pipelined { "pipelined" } else { "sequential" }
    );

    let mut report = BenchReport::default();
    for configuration in &configurations {
        conn.send_frame(data)?;
        let outcome = if request.pipelined {
            run_pipelined(conn, registry, configuration, &config.pipeline, data, request.repetitions)
        } else {
            run_sequential(conn, registry, configuration, data, request.repetitions)
        };
        report.record(configuration, outcome)?;
    }

    report.results = select_best(report.results, request.best, request.best_count as usize);
    Ok(report)
}

fn abort_trials<S: Read + Write>(conn: &mut Connection<S>) -> Result<(), TransportError> {
    conn.send_u64(TRIAL_ABORTED)?;
    conn.flush()
}

fn run_sequential<S: Read + Write>(
    conn: &mut Connection<S>,
    registry: &CodecRegistry,
    configuration: &Configuration,
    data: &[u8],
    repetitions: u32,
) -> Result<BenchResult, SmashError> {
    let armed = Smash::with_registry(registry, &configuration.library).and_then(|mut smash| {
        smash.set_options_compressor(configuration.options)?;
        Ok(smash)
    });
    let mut smash = match armed {
        Ok(smash) => smash,
        Err(e) => {
            abort_trials(conn)?;
            return Err(e.into());
        }
    };

    let mut compressed = vec![0u8; smash.compressed_capacity(data.len())];
    let mut samples = SampleSet::sequential();
    let mut compressed_size = 0;

    for trial in 0..repetitions {
        let mut timer = TrialTimer::new();
        let produced = match timer.time(Stage::Compress, || smash.compress(data, &mut compressed)) {
            Ok(n) => n,
            Err(e) => {
                abort_trials(conn)?;
                return Err(e.into());
            }
        };

        let sent = Instant::now();
        conn.send_frame(&compressed[..produced])?;
        conn.flush()?;
        timer.add_stage_time(Stage::Transfer, sent.elapsed());

        let accepted = conn.recv_ack_status()?;
        let decompress_secs = conn.recv_f64()?;
        if !accepted {
            return Err(SmashError::Integrity {
                library: configuration.library.clone(),
            });
        }
        let decompress_time = Duration::try_from_secs_f64(decompress_secs).map_err(|_| {
            TransportError::Protocol(format!("invalid decompression time {decompress_secs}"))
        })?;
        timer.add_stage_time(Stage::Decompress, decompress_time);

        log::debug!("[CLIENT] {} trial {}: {} bytes", configuration.library, trial, produced);
        compressed_size = produced as u64;
        samples.record(&TrialSnapshot::from_stage_times(
            data.len() as u64,
            compressed_size,
            timer.into_stage_times(),
        ));
    }

    summarize(&smash, &configuration.options, data.len(), compressed_size, &samples)
}

fn run_pipelined<S: Read + Write>(
    conn: &mut Connection<S>,
    registry: &CodecRegistry,
    configuration: &Configuration,
    pipeline: &PipelineConfig,
    data: &[u8],
    repetitions: u32,
) -> Result<BenchResult, SmashError> {
    let mut engine = match PipelineEngine::with_registry(
        registry.clone(),
        &configuration.library,
        configuration.options,
        *pipeline,
    ) {
        Ok(engine) => engine,
        Err(e) => {
            conn.send_buffer(&ChunkHeader::abort().encode())?;
            conn.flush()?;
            return Err(e.into());
        }
    };

    let mut samples = SampleSet::pipelined();
    let mut compressed_size = 0;

    for trial in 0..repetitions {
        engine.reset();
        let mut timer = TrialTimer::new();
        let sent = match engine.send(data, conn) {
            Ok(report) => report,
            Err(PipelineError::Transport(TransportError::Nack)) => {
                return Err(SmashError::Integrity {
                    library: configuration.library.clone(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        timer.add_stage_time(Stage::Total, timer.elapsed());

        log::debug!(
            "[CLIENT] {} pipelined trial {}: {} chunks, {} bytes",
            configuration.library,
            trial,
            sent.chunks,
            sent.compressed_bytes
        );
        compressed_size = sent.compressed_bytes;
        samples.record(&TrialSnapshot::from_stage_times(
            data.len() as u64,
            compressed_size,
            timer.into_stage_times(),
        ));
    }

    let smash = Smash::with_registry(registry, &configuration.library)?;
    summarize(&smash, &configuration.options, data.len(), compressed_size, &samples)
}
