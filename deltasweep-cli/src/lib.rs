//! Support library for the `deltasweep` binary.
//!
//! Exposes argument parsing, sweep execution, and logging set-up so tests can
//! drive a full sweep without spawning a subprocess.

pub mod cli;
pub mod logging;
