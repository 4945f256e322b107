//! telemetry/mod.rs
//! Per-trial stage timings and the throughput snapshot derived from them.

pub mod snapshot;
pub mod timers;

pub use snapshot::*;
pub use timers::*;
