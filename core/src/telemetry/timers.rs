//! telemetry/timers.rs
//! Stage timers for one benchmark trial.
//!
//! A sequential trial records `Compress`, `Transfer` and `Decompress`; a
//! pipelined trial overlaps them and records only `Total`.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Compress,
    Transfer,
    Decompress,
    Total,
}

impl Stage {
    pub const SEQUENTIAL: [Stage; 3] = [Stage::Compress, Stage::Transfer, Stage::Decompress];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Compress => "compression",
            Stage::Transfer => "transfer",
            Stage::Decompress => "decompression",
            Stage::Total => "total",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimes {
    times: HashMap<Stage, Duration>,
}

impl StageTimes {
    /// Add duration to a stage (accumulates if already present).
    pub fn add(&mut self, stage: Stage, dur: Duration) {
        *self.times.entry(stage).or_insert(Duration::ZERO) += dur;
    }

    pub fn get(&self, stage: Stage) -> Duration {
        self.times.get(&stage).copied().unwrap_or(Duration::ZERO)
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.times.contains_key(&stage)
    }

    pub fn get_secs(&self, stage: Stage) -> f64 {
        self.get(stage).as_secs_f64()
    }

    /// Wall time of the trial: the `Total` stage when recorded, otherwise the
    /// sum of the sequential stages.
    pub fn total(&self) -> Duration {
        match self.times.get(&Stage::Total) {
            Some(total) => *total,
            None => Stage::SEQUENTIAL.iter().map(|s| self.get(*s)).sum(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TrialTimer {
    start_time: Instant,
    pub stage_times: StageTimes,
}

impl TrialTimer {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            stage_times: StageTimes::default(),
        }
    }

    /// Run `f` and charge its wall time to `stage`.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let t = Instant::now();
        let out = f();
        self.stage_times.add(stage, t.elapsed());
        out
    }

    pub fn add_stage_time(&mut self, stage: Stage, dur: Duration) {
        self.stage_times.add(stage, dur);
    }

    /// Wall time since the timer was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn into_stage_times(self) -> StageTimes {
        self.stage_times
    }
}

impl Default for TrialTimer {
    fn default() -> Self {
        Self::new()
    }
}
