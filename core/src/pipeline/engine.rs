//! pipeline/engine.rs
//! Pipelined sender: chunk the buffer, compress chunks on a worker pool and
//! stream them in index order while later chunks are still compressing.
//!
//! `Idle → Streaming → Draining → Finished`, or `Failed` on any error.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::bounded;

use crate::compression::{CodecError, CodecRegistry};
use crate::options::Options;
use crate::pipeline::framing::ChunkHeader;
use crate::pipeline::ordering::OrderedChunkWriter;
use crate::pipeline::types::{
    Chunk, CompressedChunk, PipelineConfig, PipelineError, PipelineReport, PipelineState,
};
use crate::pipeline::worker::run_compression_worker;
use crate::smash::Smash;
use crate::transport::Connection;

pub struct PipelineEngine {
    registry: CodecRegistry,
    library: String,
    options: Options,
    config: PipelineConfig,
    state: PipelineState,
    transitions: Vec<PipelineState>,
}

impl std::fmt::Debug for PipelineEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineEngine")
            .field("library", &self.library)
            .field("options", &self.options)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("transitions", &self.transitions)
            .finish_non_exhaustive()
    }
}

impl PipelineEngine {
    pub fn new(library: &str, options: Options, config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::with_registry(CodecRegistry::builtin(), library, options, config)
    }

    /// Validates the configuration and the options up front.
    pub fn with_registry(
        registry: CodecRegistry,
        library: &str,
        options: Options,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let probe = registry.create_codec(library)?;
        if !probe.check_options(&options, true) {
            return Err(CodecError::InvalidOptions {
                library: library.into(),
            }
            .into());
        }

        Ok(Self {
            registry,
            library: library.into(),
            options,
            config,
            state: PipelineState::Idle,
            transitions: vec![PipelineState::Idle],
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state entered since construction or the last `reset`.
    pub fn transitions(&self) -> &[PipelineState] {
        &self.transitions
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Return to `Idle` so the engine can run another trial.
    pub fn reset(&mut self) {
        self.state = PipelineState::Idle;
        self.transitions = vec![PipelineState::Idle];
    }

    fn enter(&mut self, next: PipelineState) {
        log::debug!("[PIPELINE] {} -> {}", self.state, next);
        self.state = next;
        self.transitions.push(next);
    }

    /// Stream `data` over `conn` and wait for the receiver's single ACK.
    pub fn send<S>(&mut self, data: &[u8], conn: &mut Connection<S>) -> Result<PipelineReport, PipelineError>
    where
        S: Read + Write,
    {
        if self.state != PipelineState::Idle {
            return Err(PipelineError::NotIdle(self.state));
        }

        let started = Instant::now();
        match self.run(data, conn) {
            Ok(mut report) => {
                report.elapsed = started.elapsed();
                self.enter(PipelineState::Finished);
                log::info!(
                    "[PIPELINE] {} chunks, {} -> {} bytes in {:?}",
                    report.chunks,
                    report.original_bytes,
                    report.compressed_bytes,
                    report.elapsed
                );
                Ok(report)
            }
            Err(e) => {
                self.enter(PipelineState::Failed);
                log::error!("[PIPELINE] aborted: {e}");
                if !matches!(e, PipelineError::Transport(_)) {
                    // best effort: let the receiver discard what it got
                    let _ = conn.send_buffer(&ChunkHeader::abort().encode());
                }
                Err(e)
            }
        }
    }

    fn run<S>(&mut self, data: &[u8], conn: &mut Connection<S>) -> Result<PipelineReport, PipelineError>
    where
        S: Read + Write,
    {
        let total = self.config.chunk_count(data.len());
        let chunk_total = u32::try_from(total).map_err(|_| PipelineError::InputTooLarge(data.len()))?;

        // One private codec per worker, armed before any byte hits the wire.
        let workers = self.config.worker_count.min(total.max(1));
        let codecs = (0..workers)
            .map(|_| {
                let mut codec = Smash::with_registry(&self.registry, &self.library)?;
                codec.set_options_compressor(self.options)?;
                Ok(codec)
            })
            .collect::<Result<Vec<_>, CodecError>>()?;

        self.enter(PipelineState::Streaming);
        let (compressed_bytes, compress_time) = self.stream_chunks(data, chunk_total, codecs, conn)?;
        if self.state == PipelineState::Streaming {
            self.enter(PipelineState::Draining);
        }

        // ---- Stream end + single ACK ----
        conn.send_buffer(&ChunkHeader::end(chunk_total).encode())?;
        conn.flush()?;
        log::debug!("[PIPELINE] end marker sent, waiting for ACK");
        conn.recv_ack()?;

        Ok(PipelineReport {
            chunks: chunk_total,
            original_bytes: data.len() as u64,
            compressed_bytes,
            elapsed: Duration::ZERO,
            compress_time,
        })
    }

    fn stream_chunks<S>(
        &mut self,
        data: &[u8],
        chunk_total: u32,
        codecs: Vec<Smash>,
        conn: &mut Connection<S>,
    ) -> Result<(u64, Duration), PipelineError>
    where
        S: Read + Write,
    {
        let chunk_size = self.config.chunk_size;
        let inflight = self.config.inflight_chunks;
        let abort = AtomicBool::new(false);
        let exhausted = AtomicBool::new(false);

        thread::scope(|scope| {
            // ---- Channels ----
            let (chunk_tx, chunk_rx) = bounded::<Chunk<'_>>(inflight);
            let (out_tx, out_rx) = bounded::<Result<CompressedChunk, PipelineError>>(inflight);

            // ---- Feeder ----
            let (abort_ref, exhausted_ref) = (&abort, &exhausted);
            scope.spawn(move || {
                for (i, slice) in data.chunks(chunk_size).enumerate() {
                    if abort_ref.load(Ordering::Acquire) {
                        break;
                    }
                    let chunk = Chunk {
                        index: i as u32,
                        data: slice,
                    };
                    if chunk_tx.send(chunk).is_err() {
                        break; // workers gone
                    }
                }
                exhausted_ref.store(true, Ordering::Release);
                log::debug!("[FEEDER] source exhausted");
            });

            // ---- Workers ----
            for (id, codec) in codecs.into_iter().enumerate() {
                let rx = chunk_rx.clone();
                let tx = out_tx.clone();
                scope.spawn(move || run_compression_worker(id, rx, tx, codec, abort_ref));
            }
            drop(chunk_rx);
            drop(out_tx);

            // ---- Ordered writer ----
            let mut ordered = OrderedChunkWriter::new(conn);
            let mut outcome = Ok(());
            for res in out_rx.iter() {
                if let Err(e) = res.and_then(|chunk| ordered.push(chunk)) {
                    outcome = Err(e);
                    break;
                }
                if self.state == PipelineState::Streaming && exhausted.load(Ordering::Acquire) {
                    self.enter(PipelineState::Draining);
                }
            }
            let outcome = outcome.and_then(|()| ordered.finish(chunk_total));

            if outcome.is_err() {
                abort.store(true, Ordering::Release);
            }
            // unblocks workers waiting to hand over results
            drop(out_rx);

            log::debug!(
                "[WRITER] emitted {} chunks, at most {} held back",
                ordered.emitted(),
                ordered.peak_pending()
            );
            outcome.map(|()| (ordered.emitted_bytes(), ordered.compress_time()))
        })
    }
}
