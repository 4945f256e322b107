//! stats/aggregate.rs
//! Robust mean and standard deviation over repeated throughput samples.
//!
//! Each metric sequence is sorted descending on its own and the slowest sixth
//! is discarded before averaging, so one stalled trial does not drag the
//! estimate down.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::telemetry::TrialSnapshot;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("no samples recorded")]
    NoSamples,
    #[error("metric {metric} has {actual} samples, expected {expected}")]
    RaggedSamples {
        metric: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Number of samples kept out of `n`: `ceil(5n / 6)`.
pub fn kept_count(n: usize) -> usize {
    (5 * n + 5) / 6
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub mean: f64,
    pub std_dev: f64,
    /// Samples that entered the estimate.
    pub kept: usize,
    pub count: usize,
}

/// Mean and population standard deviation over the fastest `kept_count`
/// samples.
pub fn trimmed_estimate(samples: &[f64]) -> Result<Estimate, StatsError> {
    match samples {
        [] => Err(StatsError::NoSamples),
        [only] => Ok(Estimate {
            mean: *only,
            std_dev: 0.0,
            kept: 1,
            count: 1,
        }),
        _ => {
            let mut sorted = samples.to_vec();
            sorted.sort_by(|a, b| b.total_cmp(a));
            let kept = &sorted[..kept_count(sorted.len())];

            let n = kept.len() as f64;
            let mean = kept.iter().sum::<f64>() / n;
            let variance = kept.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

            Ok(Estimate {
                mean,
                std_dev: variance.sqrt(),
                kept: kept.len(),
                count: samples.len(),
            })
        }
    }
}

/// Throughput series for one configuration.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    pipelined: bool,
    compression: Vec<f64>,
    transfer: Vec<f64>,
    decompression: Vec<f64>,
    total: Vec<f64>,
}

impl SampleSet {
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Only the total series is kept for pipelined trials.
    pub fn pipelined() -> Self {
        Self {
            pipelined: true,
            ..Self::default()
        }
    }

    pub fn is_pipelined(&self) -> bool {
        self.pipelined
    }

    pub fn len(&self) -> usize {
        self.total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    pub fn record(&mut self, trial: &TrialSnapshot) {
        if !self.pipelined {
            self.compression.extend(trial.compression_mbps);
            self.transfer.extend(trial.transfer_mbps);
            self.decompression.extend(trial.decompression_mbps);
        }
        self.total.push(trial.total_mbps);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub compression: Option<Estimate>,
    pub transfer: Option<Estimate>,
    pub decompression: Option<Estimate>,
    pub total: Estimate,
}

pub fn aggregate(samples: &SampleSet) -> Result<Summary, StatsError> {
    let total = trimmed_estimate(&samples.total)?;
    if samples.pipelined {
        return Ok(Summary {
            compression: None,
            transfer: None,
            decompression: None,
            total,
        });
    }

    let stage = |metric: &'static str, series: &[f64]| -> Result<Option<Estimate>, StatsError> {
        if series.is_empty() {
            return Ok(None);
        }
        if series.len() != samples.total.len() {
            return Err(StatsError::RaggedSamples {
                metric,
                expected: samples.total.len(),
                actual: series.len(),
            });
        }
        trimmed_estimate(series).map(Some)
    };

    Ok(Summary {
        compression: stage("compression", &samples.compression)?,
        transfer: stage("transfer", &samples.transfer)?,
        decompression: stage("decompression", &samples.decompression)?,
        total,
    })
}
