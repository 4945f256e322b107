//! bench/server.rs
//! Receiving side of the network benchmark.
//!
//! Connections are served one at a time. Per configuration the server keeps
//! the raw file, decompresses every trial, compares and answers ACK or NACK.

use std::io::{Read, Write};
use std::net::{TcpListener, ToSocketAddrs};
use std::time::Instant;

use crate::bench::plan::Configuration;
use crate::bench::protocol::BenchRequest;
use crate::compression::{CodecError, CodecRegistry};
use crate::constants::{DEFAULT_MAX_PAYLOAD, TRIAL_ABORTED};
use crate::pipeline::{discard_stream, receive_stream, PipelineError, StreamOutcome};
use crate::smash::Smash;
use crate::transport::Connection;
use crate::types::SmashError;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// Largest length prefix accepted from a client.
    pub max_payload: u64,
}

impl ServerConfig {
    pub fn new(bind: impl Into<String>) -> Self {
        Self {
            bind: bind.into(),
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// Accept and serve clients until the listener fails.
pub fn serve(config: &ServerConfig, registry: &CodecRegistry) -> Result<(), SmashError> {
    let listener = bind(&config.bind)?;
    log::info!("[SERVER] listening on {}", listener.local_addr()?);
    serve_listener(&listener, config, registry)
}

pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<TcpListener, SmashError> {
    Ok(TcpListener::bind(addr)?)
}

pub fn serve_listener(
    listener: &TcpListener,
    config: &ServerConfig,
    registry: &CodecRegistry,
) -> Result<(), SmashError> {
    for stream in listener.incoming() {
        let mut conn = Connection::from_tcp(stream?)?;
        let peer = conn.peer();
        log::info!("[SERVER] client {} connected", peer);
        match serve_connection(&mut conn, registry, config.max_payload) {
            Ok(served) => log::info!("[SERVER] client {} done, {} configurations", peer, served),
            Err(e) => log::error!("[SERVER] client {}: {e}", peer),
        }
    }
    Ok(())
}

/// Serve one benchmark request; returns the number of configurations.
pub fn serve_connection<S: Read + Write>(
    conn: &mut Connection<S>,
    registry: &CodecRegistry,
    max_payload: u64,
) -> Result<usize, SmashError> {
    let request = BenchRequest::recv(conn)?;
    let configurations = request
        .plan(registry)
        .map_err(|e| SmashError::Protocol(e.to_string()))?;
    log::debug!(
        "[SERVER] {} {:?}: {} configurations",
        request.library,
        request.options,
        configurations.len()
    );

    for configuration in &configurations {
        let original = conn.recv_frame(max_payload)?;
        let decoder = decompressor(registry, configuration);
        if request.pipelined {
            serve_pipelined(conn, configuration, decoder, &original, request.repetitions, max_payload)?;
        } else {
            serve_sequential(conn, decoder, &original, request.repetitions, max_payload)?;
        }
    }
    Ok(configurations.len())
}

fn decompressor(registry: &CodecRegistry, configuration: &Configuration) -> Result<Smash, CodecError> {
    let mut smash = Smash::with_registry(registry, &configuration.library)?;
    smash.set_options_decompressor(configuration.options)?;
    Ok(smash)
}

fn serve_sequential<S: Read + Write>(
    conn: &mut Connection<S>,
    mut decoder: Result<Smash, CodecError>,
    original: &[u8],
    repetitions: u32,
    max_payload: u64,
) -> Result<(), SmashError> {
    let mut decompressed = vec![0u8; original.len()];

    for _ in 0..repetitions {
        let declared = conn.recv_u64()?;
        if declared == TRIAL_ABORTED {
            log::debug!("[SERVER] client abandoned the configuration");
            break;
        }
        let compressed = conn.recv_payload(declared, max_payload)?;

        let started = Instant::now();
        let outcome = match decoder.as_mut() {
            Ok(smash) => smash.decompress(&compressed, &mut decompressed).map(Some),
            Err(_) => Ok(None),
        };
        let secs = started.elapsed().as_secs_f64();

        let accepted = match outcome {
            Ok(Some(n)) => Smash::compare_data(original, &decompressed[..n]),
            Ok(None) => false,
            Err(e) => {
                log::warn!("[SERVER] {e}");
                false
            }
        };
        if accepted {
            conn.send_ack()?;
            conn.send_f64(secs)?;
            conn.flush()?;
        } else {
            conn.send_nack()?;
            conn.send_f64(0.0)?;
            conn.flush()?;
            break;
        }
    }
    Ok(())
}

fn serve_pipelined<S: Read + Write>(
    conn: &mut Connection<S>,
    configuration: &Configuration,
    mut decoder: Result<Smash, CodecError>,
    original: &[u8],
    repetitions: u32,
    max_payload: u64,
) -> Result<(), SmashError> {
    for _ in 0..repetitions {
        let outcome = match decoder.as_mut() {
            Ok(smash) => receive_stream(conn, smash, max_payload)?,
            Err(e) => {
                let reason = CodecError::init(&configuration.library, e);
                discard_stream(conn, PipelineError::Codec(reason), max_payload)?
            }
        };

        match outcome {
            StreamOutcome::Complete { data, chunks } if Smash::compare_data(original, &data) => {
                log::debug!("[SERVER] stream of {} chunks verified", chunks);
                conn.send_ack()?;
                conn.flush()?;
            }
            StreamOutcome::Complete { .. } => {
                log::warn!("[SERVER] reassembled stream differs from the original");
                conn.send_nack()?;
                conn.flush()?;
                break;
            }
            StreamOutcome::Rejected { reason } => {
                log::warn!("[SERVER] stream rejected: {reason}");
                conn.send_nack()?;
                conn.flush()?;
                break;
            }
            StreamOutcome::Aborted => break,
        }
    }
    Ok(())
}
