//! Argument parsing and sweep execution for the `deltasweep` binary.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use deltasweep_core::{
    AlgorithmVariant, CellOutcome, DistanceMeasure, ExclusionReason, FailurePolicy, SweepConfig,
    SweepConfigBuilder, SweepController, SweepError, SweepReport, WordSpec,
};
use deltasweep_providers_stylometry::{ScoreMethod, StylometryProvider};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Command-line options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "deltasweep",
    about = "Sweep stylometric distance measures over word cutoffs and case settings."
)]
pub struct Cli {
    /// Directory of `.txt` documents, one per text.
    #[arg(default_value = "corpus", value_name = "CORPUS_DIR")]
    pub corpus_dir: PathBuf,

    /// Reference corpus for measures that need one.
    #[arg(short = 'r', long = "refcorpus", value_name = "DIR")]
    pub reference: Option<PathBuf>,

    /// Output directory (defaults to `<CORPUS_DIR>_deltas`).
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Replace an existing output directory.
    #[arg(short = 'f', long)]
    pub overwrite: bool,

    /// Resume into an existing output directory, skipping finished cells.
    #[arg(short = 'c', long = "continue", conflicts_with = "overwrite")]
    pub resume: bool,

    /// Word counts to sweep, e.g. `100,500:3001:500`. Repeated values are joined.
    #[arg(short, long = "words", value_name = "SPEC")]
    pub words: Vec<String>,

    /// Precomputed stylo frequency table used instead of the corpus.
    #[arg(short = 't', long = "frequency-table", value_name = "FILE")]
    pub frequency_table: Option<PathBuf>,

    /// Distance measure to sweep; may be repeated.
    #[arg(short = 'm', long = "measure", value_enum, value_name = "NAME")]
    pub measures: Vec<MeasureArg>,

    /// Never fall back to the corpus itself as reference.
    #[arg(long = "no-self-reference")]
    pub no_self_reference: bool,

    /// Record failing cells and carry on instead of stopping.
    #[arg(long = "keep-going")]
    pub keep_going: bool,

    /// Clustering score written to the summary.
    #[arg(long, value_enum, default_value_t = ScoreMetric::Simple)]
    pub score: ScoreMetric,
}

impl Cli {
    /// Options equivalent to running `deltasweep <corpus_dir>` with no flags.
    #[must_use]
    pub fn for_corpus(corpus_dir: impl Into<PathBuf>) -> Self {
        Self {
            corpus_dir: corpus_dir.into(),
            reference: None,
            output: None,
            overwrite: false,
            resume: false,
            words: Vec::new(),
            frequency_table: None,
            measures: Vec::new(),
            no_self_reference: false,
            keep_going: false,
            score: ScoreMetric::Simple,
        }
    }
}

/// Measures selectable with `--measure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MeasureArg {
    /// Burrows' Delta.
    Burrows,
    /// Quadratic Delta.
    Quadratic,
    /// Eder's Delta.
    Eder,
    /// Cosine Delta.
    CosineDelta,
    /// Cosine distance of rank-weighted z-scores.
    CosineEder,
    /// Cosine distance of z-score signs.
    CosineBinary,
    /// Rotated Delta; needs a reference table.
    RotatedDelta,
}

impl From<MeasureArg> for DistanceMeasure {
    fn from(value: MeasureArg) -> Self {
        match value {
            MeasureArg::Burrows => Self::Burrows,
            MeasureArg::Quadratic => Self::Quadratic,
            MeasureArg::Eder => Self::Eder,
            MeasureArg::CosineDelta => Self::CosineDelta,
            MeasureArg::CosineEder => Self::CosineEder,
            MeasureArg::CosineBinary => Self::CosineBinary,
            MeasureArg::RotatedDelta => Self::RotatedDelta,
        }
    }
}

/// Scores selectable with `--score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScoreMetric {
    /// Standardised gap between between-author and within-author distances.
    Simple,
    /// Adjusted Rand index of single-linkage clusters.
    Ari,
}

impl From<ScoreMetric> for ScoreMethod {
    fn from(value: ScoreMetric) -> Self {
        match value {
            ScoreMetric::Simple => Self::Simple,
            ScoreMetric::Ari => Self::AdjustedRand,
        }
    }
}

/// Errors surfaced while executing the command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The sweep rejected its configuration or failed while running.
    #[error(transparent)]
    Sweep(#[from] SweepError),
}

/// Executes the sweep described by `cli` with the stylometry provider.
///
/// # Errors
/// Returns [`CliError`] when the configuration is invalid or the sweep
/// aborts.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use deltasweep_cli::cli::{Cli, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = tempfile::tempdir()?;
/// let corpus = dir.path().join("corpus");
/// std::fs::create_dir(&corpus)?;
/// let mut cli = Cli::for_corpus(&corpus);
/// cli.words = vec![String::new()];
/// let report = run_cli(cli)?;
/// assert!(report.cells().is_empty());
/// assert!(report.summary_path().exists());
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(corpus = field::Empty, score = field::Empty, policy = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<SweepReport, CliError> {
    let span = Span::current();
    span.record("corpus", field::display(cli.corpus_dir.display()));
    let method = ScoreMethod::from(cli.score);
    span.record("score", field::display(method));

    let config = build_config(cli)?;
    span.record("policy", field::debug(config.failure_policy()));

    let provider = StylometryProvider::new(method);
    let report = SweepController::new(config, provider.collaborators()).run()?;
    info!(
        cells = report.cells().len(),
        computed = report.count_where(|outcome| matches!(outcome, CellOutcome::Computed { .. })),
        skipped = report.count_where(|outcome| matches!(outcome, CellOutcome::Skipped { .. })),
        failed = report.count_where(|outcome| matches!(outcome, CellOutcome::Failed { .. })),
        "command completed"
    );
    Ok(report)
}

/// Maps parsed options onto a validated [`SweepConfig`].
pub(super) fn build_config(cli: Cli) -> Result<SweepConfig, SweepError> {
    let Cli {
        corpus_dir,
        reference,
        output,
        overwrite,
        resume,
        words,
        frequency_table,
        measures,
        no_self_reference,
        keep_going,
        score: _,
    } = cli;

    let mut builder = SweepConfigBuilder::new(corpus_dir)
        .with_reference_dir(reference)
        .with_output_dir(output)
        .with_overwrite(overwrite)
        .with_resume(resume)
        .with_frequency_table(frequency_table)
        .with_self_reference(!no_self_reference)
        .with_failure_policy(if keep_going {
            FailurePolicy::Isolate
        } else {
            FailurePolicy::Abort
        });
    if !words.is_empty() {
        builder = builder.with_word_spec(WordSpec::from_items(&words));
    }
    if !measures.is_empty() {
        builder = builder.with_variants(
            measures
                .into_iter()
                .map(|measure| AlgorithmVariant::from(DistanceMeasure::from(measure))),
        );
    }
    builder.build()
}

fn outcome_label(outcome: &CellOutcome) -> &'static str {
    match outcome {
        CellOutcome::Computed { .. } => "computed",
        CellOutcome::Skipped { .. } => "skipped",
        CellOutcome::Failed { .. } => "failed",
    }
}

/// Renders `report` to `writer`, one tab-separated line per cell.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_report(report: &SweepReport, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "summary: {}", report.summary_path().display())?;
    for excluded in report.excluded() {
        let reason = match excluded.reason {
            ExclusionReason::MissingReference => "no reference corpus",
        };
        writeln!(
            writer,
            "excluded: {} ({reason})",
            excluded.variant.display_name()
        )?;
    }
    for cell in report.cells() {
        let score = cell
            .score()
            .map_or_else(|| "-".to_owned(), |score| format!("{score:.6}"));
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{score}",
            cell.cell().variant().display_name(),
            cell.cell().words(),
            cell.cell().case(),
            outcome_label(cell.outcome()),
        )?;
    }
    Ok(())
}
