//! stats/ranking.rs
//! Per-configuration results and best-N selection.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::options::Options;
use crate::stats::aggregate::{Estimate, Summary};

/// Metric results are ordered by; travels as the one-byte "best" flag.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u8)]
pub enum RankKey {
    /// Keep insertion order.
    #[default]
    None = 0,
    Ratio = 1,
    Compression = 2,
    Transfer = 3,
    Decompression = 4,
    Total = 5,
}

impl RankKey {
    pub const ALL: [RankKey; 6] = [
        RankKey::None,
        RankKey::Ratio,
        RankKey::Compression,
        RankKey::Transfer,
        RankKey::Decompression,
        RankKey::Total,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RankKey::None => "none",
            RankKey::Ratio => "ratio",
            RankKey::Compression => "compression",
            RankKey::Transfer => "transfer",
            RankKey::Decompression => "decompression",
            RankKey::Total => "total",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for RankKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one (library, options) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchResult {
    pub summary: String,
    pub library: String,
    pub options: Options,
    pub original_size: u64,
    pub compressed_size: u64,
    pub throughput: Summary,
}

impl BenchResult {
    pub fn ratio(&self) -> f64 {
        if self.compressed_size == 0 {
            return 0.0;
        }
        self.original_size as f64 / self.compressed_size as f64
    }

    /// Value compared when ranking by `key`; a metric the result does not
    /// carry ranks last.
    pub fn rank_value(&self, key: RankKey) -> f64 {
        let mean = |e: Option<Estimate>| e.map_or(f64::NEG_INFINITY, |e| e.mean);
        match key {
            RankKey::None => 0.0,
            RankKey::Ratio => self.ratio(),
            RankKey::Compression => mean(self.throughput.compression),
            RankKey::Transfer => mean(self.throughput.transfer),
            RankKey::Decompression => mean(self.throughput.decompression),
            RankKey::Total => self.throughput.total.mean,
        }
    }
}

/// Order `results` by `key` (descending, stable) and keep the first `count`;
/// `count == 0` keeps all. `RankKey::None` keeps insertion order.
pub fn select_best(mut results: Vec<BenchResult>, key: RankKey, count: usize) -> Vec<BenchResult> {
    if key == RankKey::None {
        return results;
    }
    results.sort_by(|a, b| b.rank_value(key).total_cmp(&a.rank_value(key)));
    if count > 0 {
        results.truncate(count);
    }
    results
}
