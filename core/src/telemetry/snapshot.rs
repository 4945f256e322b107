//! telemetry/snapshot.rs
//! Immutable per-trial throughput figures in MB/s (1 MB = 10^6 bytes).

use serde::{Deserialize, Serialize};

use crate::constants::BYTES_PER_MB;
use crate::telemetry::timers::{Stage, StageTimes};

/// Elapsed times below this are clamped so a throughput stays finite.
const MIN_SECONDS: f64 = 1e-9;

/// `bytes / secs` in MB/s.
pub fn throughput(bytes: u64, secs: f64) -> f64 {
    bytes as f64 / BYTES_PER_MB / secs.max(MIN_SECONDS)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSnapshot {
    pub bytes_original: u64,
    pub bytes_compressed: u64,
    /// Absent for pipelined trials, where stages overlap.
    pub compression_mbps: Option<f64>,
    pub transfer_mbps: Option<f64>,
    pub decompression_mbps: Option<f64>,
    pub total_mbps: f64,
    pub stage_times: StageTimes,
}

impl TrialSnapshot {
    /// Compression throughput counts original bytes; transfer and
    /// decompression count compressed bytes; total counts original bytes over
    /// the whole trial.
    pub fn from_stage_times(bytes_original: u64, bytes_compressed: u64, stage_times: StageTimes) -> Self {
        let per_stage = |stage: Stage, bytes: u64| {
            stage_times
                .contains(stage)
                .then(|| throughput(bytes, stage_times.get_secs(stage)))
        };

        Self {
            bytes_original,
            bytes_compressed,
            compression_mbps: per_stage(Stage::Compress, bytes_original),
            transfer_mbps: per_stage(Stage::Transfer, bytes_compressed),
            decompression_mbps: per_stage(Stage::Decompress, bytes_compressed),
            total_mbps: throughput(bytes_original, stage_times.total().as_secs_f64()),
            stage_times,
        }
    }

    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 {
            return 0.0;
        }
        self.bytes_original as f64 / self.bytes_compressed as f64
    }
}
