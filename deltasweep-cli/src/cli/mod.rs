//! Command-line interface for the `deltasweep` binary.
//!
//! A single command sweeps a corpus: options map onto a
//! [`deltasweep_core::SweepConfig`], the stylometry provider supplies the
//! analysis, and the report is rendered as one line per cell.

mod commands;

pub use commands::{Cli, CliError, MeasureArg, ScoreMetric, render_report, run_cli};

#[cfg(test)]
mod test_helpers;
