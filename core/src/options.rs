//! options.rs
//! Codec configuration record and its fixed-size wire encoding.
//!
//! Not every field is meaningful for every engine; the meaning of each value
//! is defined by the engine that consumes it. Engines never mutate options.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::constants::cli_defaults;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Options {
    compression_level: u8,
    window_size: u32,
    mode: u8,
    work_factor: u8,
    shuffle: u8,
    number_threads: u8,
}

impl Options {
    pub const WIRE_LEN: usize = 1 // compression_level
        + 4                      // window_size
        + 1                      // mode
        + 1                      // work_factor
        + 1                      // shuffle
        + 1;                     // number_threads

    /// All fields zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The defaults the command line tools start from.
    pub fn recommended() -> Self {
        Self {
            compression_level: cli_defaults::LEVEL,
            window_size: cli_defaults::WINDOW,
            mode: cli_defaults::MODE,
            work_factor: cli_defaults::WORK_FACTOR,
            shuffle: cli_defaults::SHUFFLE,
            number_threads: cli_defaults::THREADS,
        }
    }

    pub fn compression_level(&self) -> u8 {
        self.compression_level
    }

    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    pub fn mode(&self) -> u8 {
        self.mode
    }

    pub fn work_factor(&self) -> u8 {
        self.work_factor
    }

    pub fn shuffle(&self) -> u8 {
        self.shuffle
    }

    pub fn number_threads(&self) -> u8 {
        self.number_threads
    }

    pub fn set_compression_level(&mut self, level: u8) {
        self.compression_level = level;
    }

    pub fn set_window_size(&mut self, window: u32) {
        self.window_size = window;
    }

    pub fn set_mode(&mut self, mode: u8) {
        self.mode = mode;
    }

    pub fn set_work_factor(&mut self, work_factor: u8) {
        self.work_factor = work_factor;
    }

    pub fn set_shuffle(&mut self, shuffle: u8) {
        self.shuffle = shuffle;
    }

    pub fn set_number_threads(&mut self, threads: u8) {
        self.number_threads = threads;
    }

    // ---- Builder style ----

    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level;
        self
    }

    pub fn with_window_size(mut self, window: u32) -> Self {
        self.window_size = window;
        self
    }

    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_work_factor(mut self, work_factor: u8) -> Self {
        self.work_factor = work_factor;
        self
    }

    pub fn with_shuffle(mut self, shuffle: u8) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_number_threads(mut self, threads: u8) -> Self {
        self.number_threads = threads;
        self
    }

    /// Encode into the canonical wire layout.
    ///
    /// ```text
    /// [ level (1) ][ window (4, LE) ][ mode (1) ][ work_factor (1) ][ shuffle (1) ][ threads (1) ]
    /// ```
    pub fn encode_le(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        out[0] = self.compression_level;
        LittleEndian::write_u32(&mut out[1..5], self.window_size);
        out[5] = self.mode;
        out[6] = self.work_factor;
        out[7] = self.shuffle;
        out[8] = self.number_threads;
        out
    }

    pub fn decode_le(buf: &[u8; Self::WIRE_LEN]) -> Self {
        Self {
            compression_level: buf[0],
            window_size: LittleEndian::read_u32(&buf[1..5]),
            mode: buf[5],
            work_factor: buf[6],
            shuffle: buf[7],
            number_threads: buf[8],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_layout_is_little_endian() {
        let opts = Options::new()
            .with_compression_level(9)
            .with_window_size(0x0102_0304)
            .with_mode(2)
            .with_work_factor(30)
            .with_shuffle(1)
            .with_number_threads(4);

        let wire = opts.encode_le();
        assert_eq!(wire, [9, 0x04, 0x03, 0x02, 0x01, 2, 30, 1, 4]);
        assert_eq!(Options::decode_le(&wire), opts);
    }

    #[test]
    fn recommended_matches_cli_defaults() {
        let opts = Options::recommended();
        assert_eq!(opts.compression_level(), 1);
        assert_eq!(opts.window_size(), 10);
        assert_eq!(opts.work_factor(), 30);
        assert_eq!(opts.number_threads(), 1);
    }
}
