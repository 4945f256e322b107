//! compression/constants.rs
//! Names shared by the registry and the command line.

/// Library name that expands to every registered engine.
pub const ALL_LIBRARIES: &str = "all";
