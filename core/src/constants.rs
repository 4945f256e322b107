//! constants.rs
//! Shared defaults for the codec layer, transport and pipeline.

/// Defaults when a chunk size is not supplied.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024; // 64 KiB
/// Max chunk size sanity bound (32 MiB).
pub const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;
/// Bound on compressed chunks waiting between workers and the writer.
pub const DEFAULT_INFLIGHT_CHUNKS: usize = 2;

/// Largest payload a receiver accepts from a length prefix (1 GiB).
pub const DEFAULT_MAX_PAYLOAD: u64 = 1024 * 1024 * 1024;

/// Fixed-size control tokens.
pub const ACK_TOKEN: [u8; 4] = *b"SACK";
pub const NACK_TOKEN: [u8; 4] = *b"SNAK";

/// Compressed-size sentinel: the sender gave up on the current configuration.
pub const TRIAL_ABORTED: u64 = u64::MAX;

/// Over-allocation used when an engine cannot bound its output.
pub const UNKNOWN_BOUND_FACTOR: usize = 2;
pub const UNKNOWN_BOUND_MIN: usize = 5000;

/// Step used when sweeping the work factor range.
pub const WORK_FACTOR_STEP: u32 = 50;

/// Throughput unit (MB/s uses decimal megabytes).
pub const BYTES_PER_MB: f64 = 1_000_000.0;

/// Defaults of the command line tools.
pub mod cli_defaults {
    pub const LEVEL: u8 = 1;
    pub const WINDOW: u32 = 10;
    pub const MODE: u8 = 0;
    pub const WORK_FACTOR: u8 = 30;
    pub const SHUFFLE: u8 = 0;
    pub const THREADS: u8 = 1;
    pub const REPETITIONS: u32 = 1;
    pub const PORT: u16 = 45000;
}
