//! stats/mod.rs
//! Trimmed statistics over repeated trials and result ranking.

pub mod aggregate;
pub mod ranking;

pub use aggregate::*;
pub use ranking::*;
