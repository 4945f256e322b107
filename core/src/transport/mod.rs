//! transport/mod.rs
//! Framed, acknowledgment-driven byte exchange over a stream socket.

pub mod connection;
pub mod types;

pub use connection::*;
pub use types::*;
