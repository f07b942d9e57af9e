//! Entry point for the `deltasweep` binary.
//!
//! Installs logging, runs the sweep, and prints the per-cell report on
//! stdout. Failures are logged with their stable error code and turn into a
//! non-zero exit status.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use deltasweep_cli::{
    cli::{Cli, CliError, render_report, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let report = run_cli(cli).context("sweep failed")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_report(&report, &mut writer).context("failed to render report")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let (code, word_spec_code) = err
            .downcast_ref::<CliError>()
            .map(|cli_error| match cli_error {
                CliError::Sweep(sweep) => (Some(sweep.code()), sweep.word_spec_code()),
            })
            .unwrap_or((None, None));

        error!(
            error = format_args!("{err:#}"),
            code = code.map(|code| field::display(code.as_str())),
            word_spec_code = word_spec_code.map(|code| field::display(code.as_str())),
            "command execution failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[expect(
    clippy::print_stderr,
    reason = "logging is unavailable until the subscriber is installed"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialise logging: {err}");
}
