//! Command implementations for the gatekeep CLI
//!
//! Every command returns the exit code the process should end with.

pub mod check;
pub mod config;
pub mod gate;
pub mod status;
