//! transport/connection.rs
//! Exact-length buffer exchange, fixed-width integers, length-prefixed
//! frames and ACK/NACK tokens over one bidirectional byte stream.
//!
//! All integers travel little-endian.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use byteorder::{ByteOrder, LittleEndian};

use crate::constants::{ACK_TOKEN, NACK_TOKEN};
use crate::transport::types::TransportError;

pub struct Connection<S> {
    stream: S,
    bytes_sent: u64,
    bytes_received: u64,
}

impl Connection<TcpStream> {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)?;
        Self::from_tcp(stream)
    }

    pub fn from_tcp(stream: TcpStream) -> Result<Self, TransportError> {
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }

    pub fn peer(&self) -> String {
        self.stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "<unknown>".into())
    }
}

impl<S: Read + Write> Connection<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    // ================= Raw buffers =================

    /// Write every byte of `buf`, retrying partial writes.
    pub fn send_buffer(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        let mut off = 0;
        while off < buf.len() {
            match self.stream.write(&buf[off..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        ErrorKind::WriteZero,
                        format!("peer stopped accepting data after {} of {} bytes", off, buf.len()),
                    )
                    .into())
                }
                Ok(n) => off += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.bytes_sent += buf.len() as u64;
        Ok(())
    }

    /// Fill `buf` completely, retrying partial reads.
    pub fn recv_buffer(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let mut off = 0;
        while off < buf.len() {
            match self.stream.read(&mut buf[off..]) {
                Ok(0) => {
                    return Err(TransportError::ConnectionClosed {
                        expected: buf.len(),
                        received: off,
                    })
                }
                Ok(n) => off += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.bytes_received += buf.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), TransportError> {
        self.stream.flush()?;
        Ok(())
    }

    // ================= Control tokens =================

    pub fn send_ack(&mut self) -> Result<(), TransportError> {
        log::trace!("[TRANSPORT] ACK");
        self.send_buffer(&ACK_TOKEN)
    }

    pub fn send_nack(&mut self) -> Result<(), TransportError> {
        log::trace!("[TRANSPORT] NACK");
        self.send_buffer(&NACK_TOKEN)
    }

    /// `true` for ACK, `false` for NACK, error for anything else.
    pub fn recv_ack_status(&mut self) -> Result<bool, TransportError> {
        let mut token = [0u8; 4];
        self.recv_buffer(&mut token)?;
        match token {
            ACK_TOKEN => Ok(true),
            NACK_TOKEN => Ok(false),
            token => Err(TransportError::InvalidAck { token }),
        }
    }

    pub fn recv_ack(&mut self) -> Result<(), TransportError> {
        if self.recv_ack_status()? {
            Ok(())
        } else {
            Err(TransportError::Nack)
        }
    }

    // ================= Fixed-width integers =================

    pub fn send_u8(&mut self, v: u8) -> Result<(), TransportError> {
        self.send_buffer(&[v])
    }

    pub fn recv_u8(&mut self) -> Result<u8, TransportError> {
        let mut buf = [0u8; 1];
        self.recv_buffer(&mut buf)?;
        Ok(buf[0])
    }

    pub fn send_u32(&mut self, v: u32) -> Result<(), TransportError> {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, v);
        self.send_buffer(&buf)
    }

    pub fn recv_u32(&mut self) -> Result<u32, TransportError> {
        let mut buf = [0u8; 4];
        self.recv_buffer(&mut buf)?;
        Ok(LittleEndian::read_u32(&buf))
    }

    pub fn send_u64(&mut self, v: u64) -> Result<(), TransportError> {
        let mut buf = [0u8; 8];
        LittleEndian::write_u64(&mut buf, v);
        self.send_buffer(&buf)
    }

    pub fn recv_u64(&mut self) -> Result<u64, TransportError> {
        let mut buf = [0u8; 8];
        self.recv_buffer(&mut buf)?;
        Ok(LittleEndian::read_u64(&buf))
    }

    pub fn send_f64(&mut self, v: f64) -> Result<(), TransportError> {
        let mut buf = [0u8; 8];
        LittleEndian::write_f64(&mut buf, v);
        self.send_buffer(&buf)
    }

    pub fn recv_f64(&mut self) -> Result<f64, TransportError> {
        let mut buf = [0u8; 8];
        self.recv_buffer(&mut buf)?;
        Ok(LittleEndian::read_f64(&buf))
    }

    // ================= Length-prefixed frames =================

    /// `[ len (u64) ][ payload (len) ]`
    pub fn send_frame(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        self.send_u64(payload.len() as u64)?;
        self.send_buffer(payload)
    }

    /// Read one frame whose declared length must not exceed `max`.
    pub fn recv_frame(&mut self, max: u64) -> Result<Vec<u8>, TransportError> {
        let declared = self.recv_u64()?;
        self.recv_payload(declared, max)
    }

    /// Read a payload whose length prefix has already been consumed.
    pub fn recv_payload(&mut self, declared: u64, max: u64) -> Result<Vec<u8>, TransportError> {
        let mut buf = allocate(declared, max)?;
        self.recv_buffer(&mut buf)?;
        Ok(buf)
    }
}

/// Zeroed buffer of `declared` bytes, refusing lengths above `max` or that
/// cannot be allocated.
pub fn allocate(declared: u64, max: u64) -> Result<Vec<u8>, TransportError> {
    if declared > max {
        return Err(TransportError::FrameTooLarge { declared, max });
    }
    let len = usize::try_from(declared).map_err(|_| TransportError::Allocation { declared })?;

    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| TransportError::Allocation { declared })?;
    buf.resize(len, 0);
    Ok(buf)
}
