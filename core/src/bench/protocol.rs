//! bench/protocol.rs
//! Request header that opens a network benchmark.
//!
//! ```text
//! [ options (9) ][ name_len u8 ][ name ][ all_options u8 ][ best u8 ]
//! [ best_count u32 ][ repetitions u32 ][ pipelined u8 ]
//! ```

use std::io::{Read, Write};

use crate::bench::plan::{plan, Configuration};
use crate::compression::{CodecError, CodecRegistry};
use crate::options::Options;
use crate::stats::RankKey;
use crate::transport::{Connection, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchRequest {
    pub options: Options,
    pub library: String,
    /// Enumerate every legal option combination.
    pub all_options: bool,
    pub best: RankKey,
    /// Results kept after ranking; 0 keeps all.
    pub best_count: u32,
    pub repetitions: u32,
    pub pipelined: bool,
}

impl BenchRequest {
    pub fn new(library: &str, options: Options) -> Self {
        Self {
            options,
            library: library.into(),
            all_options: false,
            best: RankKey::None,
            best_count: 0,
            repetitions: 1,
            pipelined: false,
        }
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        if self.repetitions == 0 {
            return Err(TransportError::Protocol("repetitions must be at least 1".into()));
        }
        Ok(())
    }

    /// Configurations both peers iterate, in order.
    pub fn plan(&self, registry: &CodecRegistry) -> Result<Vec<Configuration>, CodecError> {
        plan(registry, &self.library, self.options, self.all_options)
    }

    pub fn send<S: Read + Write>(&self, conn: &mut Connection<S>) -> Result<(), TransportError> {
        self.validate()?;
        let name = self.library.as_bytes();
        let name_len = u8::try_from(name.len()).map_err(|_| {
            TransportError::Protocol(format!("library name of {} bytes", name.len()))
        })?;

        conn.send_buffer(&self.options.encode_le())?;
        conn.send_u8(name_len)?;
        conn.send_buffer(name)?;
        conn.send_u8(self.all_options as u8)?;
        conn.send_u8(self.best.into())?;
        conn.send_u32(self.best_count)?;
        conn.send_u32(self.repetitions)?;
        conn.send_u8(self.pipelined as u8)?;
        conn.flush()
    }

    pub fn recv<S: Read + Write>(conn: &mut Connection<S>) -> Result<Self, TransportError> {
        let mut raw = [0u8; Options::WIRE_LEN];
        conn.recv_buffer(&mut raw)?;
        let options = Options::decode_le(&raw);

        let name_len = conn.recv_u8()? as usize;
        let mut name = vec![0u8; name_len];
        conn.recv_buffer(&mut name)?;
        let library = String::from_utf8(name)
            .map_err(|_| TransportError::Protocol("library name is not UTF-8".into()))?;

        let all_options = conn.recv_u8()? != 0;
        let best_raw = conn.recv_u8()?;
        let best = RankKey::try_from(best_raw)
            .map_err(|_| TransportError::Protocol(format!("unknown rank key {best_raw}")))?;
        let best_count = conn.recv_u32()?;
        let repetitions = conn.recv_u32()?;
        let pipelined = conn.recv_u8()? != 0;

        let request = Self {
            options,
            library,
            all_options,
            best,
            best_count,
            repetitions,
            pipelined,
        };
        request.validate()?;
        Ok(request)
    }
}
