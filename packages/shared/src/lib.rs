//! Utilities shared by the Jubensha server and client binaries.

pub mod logger;
pub mod time;
