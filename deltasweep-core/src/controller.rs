//! Sweep orchestration.
//!
//! Provides the [`SweepController`] entry point that walks a [`SweepPlan`],
//! calls the analysis collaborators for each cell, writes the per-cell
//! artifacts, and checkpoints the [`ScoreTable`] to the summary file.

use std::{
    collections::{BTreeMap, btree_map::Entry},
    fmt, fs,
    path::{Path, PathBuf},
};

use tracing::{debug, error, info, instrument, warn};

use crate::{
    Result,
    analysis::Collaborators,
    cell::{CaseSensitivity, SweepCell},
    config::{FailurePolicy, SweepConfig},
    error::{AnalysisError, AnalysisOperation, SweepError},
    plan::{ExcludedVariant, SweepPlan},
    score_table::ScoreTable,
    table::{DistanceTable, FrequencyTable},
};

/// Lifecycle phases of a sweep, reported in tracing events.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SweepPhase {
    /// Configuration accepted, nothing touched yet.
    Init,
    /// Output directory and frequency tables are being prepared.
    PreparingCorpora,
    /// Cells are being visited.
    Iterating,
    /// Every cell was visited and the summary written.
    Done,
    /// The run stopped on a fatal error.
    Aborted,
}

impl SweepPhase {
    /// Label used in log events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::PreparingCorpora => "preparing_corpora",
            Self::Iterating => "iterating",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for SweepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one cell during a run.
#[derive(Clone, Debug, PartialEq)]
pub enum CellOutcome {
    /// The cell was computed and scored.
    Computed {
        /// Clustering score.
        score: f64,
    },
    /// The artifact already existed and the run was resuming.
    Skipped {
        /// Score recovered from an earlier summary, if any.
        prior: Option<f64>,
    },
    /// The cell failed and the failure was isolated.
    Failed {
        /// Rendered collaborator error.
        reason: String,
    },
}

/// Outcome of one cell together with its artifact path.
#[derive(Clone, Debug, PartialEq)]
pub struct CellReport {
    cell: SweepCell,
    path: PathBuf,
    outcome: CellOutcome,
}

impl CellReport {
    /// The cell.
    #[must_use]
    pub const fn cell(&self) -> &SweepCell {
        &self.cell
    }

    /// Artifact path of the cell.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What happened to the cell.
    #[must_use]
    pub const fn outcome(&self) -> &CellOutcome {
        &self.outcome
    }

    /// Score known for the cell after the run, if any.
    #[must_use]
    pub const fn score(&self) -> Option<f64> {
        match self.outcome {
            CellOutcome::Computed { score } => Some(score),
            CellOutcome::Skipped { prior } => prior,
            CellOutcome::Failed { .. } => None,
        }
    }
}

/// Summary of a completed sweep.
#[derive(Clone, Debug)]
pub struct SweepReport {
    cells: Vec<CellReport>,
    scores: ScoreTable,
    summary_path: PathBuf,
    excluded: Vec<ExcludedVariant>,
}

impl SweepReport {
    /// Per-cell outcomes in plan order.
    #[must_use]
    pub fn cells(&self) -> &[CellReport] {
        &self.cells
    }

    /// Final state of the score table.
    #[must_use]
    pub const fn scores(&self) -> &ScoreTable {
        &self.scores
    }

    /// Path of the written summary.
    #[must_use]
    pub fn summary_path(&self) -> &Path {
        &self.summary_path
    }

    /// Variants dropped while planning.
    #[must_use]
    pub fn excluded(&self) -> &[ExcludedVariant] {
        &self.excluded
    }

    /// Number of cells with the given kind of outcome.
    #[must_use]
    pub fn count_where(&self, predicate: impl Fn(&CellOutcome) -> bool) -> usize {
        self.cells
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }
}

type CaseTables = BTreeMap<CaseSensitivity, FrequencyTable>;

#[derive(Debug, Default)]
struct PreparedCorpora {
    primary: CaseTables,
    reference: Option<CaseTables>,
}

/// Drives a sweep over every cell of a [`SweepPlan`].
///
/// # Examples
/// ```
/// use std::path::Path;
/// use deltasweep_core::{
///     AnalysisError, CaseSensitivity, ClusteringScorer, Collaborators, DistanceComputer,
///     DistanceMeasure, DistanceTable, FrequencySource, FrequencyTable, SweepConfigBuilder,
///     SweepController, WordSpec,
/// };
///
/// struct Flat;
///
/// impl FrequencySource for Flat {
///     fn build(&self, _: &Path, _: CaseSensitivity) -> Result<FrequencyTable, AnalysisError> {
///         Ok(FrequencyTable::new(
///             vec!["a_1".into(), "b_1".into()],
///             vec!["the".into()],
///             vec![vec![0.5], vec![0.25]],
///         ).expect("valid table"))
///     }
///
///     fn load_table(&self, path: &Path) -> Result<FrequencyTable, AnalysisError> {
///         self.build(path, CaseSensitivity::Insensitive)
///     }
/// }
///
/// impl DistanceComputer for Flat {
///     fn compute(
///         &self,
///         table: &FrequencyTable,
///         _: DistanceMeasure,
///         _: Option<&FrequencyTable>,
///     ) -> Result<DistanceTable, AnalysisError> {
///         Ok(DistanceTable::new(
///             table.documents().to_vec(),
///             vec![vec![0.0, 1.0], vec![1.0, 0.0]],
///         ).expect("square table"))
///     }
/// }
///
/// impl ClusteringScorer for Flat {
///     fn score(&self, _: &DistanceTable) -> Result<f64, AnalysisError> {
///         Ok(1.0)
///     }
/// }
///
/// let dir = tempfile::tempdir()?;
/// let config = SweepConfigBuilder::new(dir.path().join("corpus"))
///     .with_word_spec(WordSpec::new("10"))
///     .build()?;
/// let flat = Flat;
/// let collaborators = Collaborators { frequencies: &flat, distances: &flat, scorer: &flat };
/// let report = SweepController::new(config, collaborators).run()?;
/// assert_eq!(report.cells().len(), 4);
/// assert!(report.summary_path().exists());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct SweepController<'a> {
    config: SweepConfig,
    collaborators: Collaborators<'a>,
    plan: SweepPlan,
}

impl<'a> SweepController<'a> {
    /// Plans the sweep described by `config`.
    #[must_use]
    pub fn new(config: SweepConfig, collaborators: Collaborators<'a>) -> Self {
        let plan = SweepPlan::from_config(&config);
        Self {
            config,
            collaborators,
            plan,
        }
    }

    /// Returns the configuration of this run.
    #[must_use]
    pub const fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Returns the plan this controller will execute.
    #[must_use]
    pub const fn plan(&self) -> &SweepPlan {
        &self.plan
    }

    /// Executes the sweep.
    ///
    /// # Errors
    /// Returns [`SweepError::OutputExists`] when the output directory exists
    /// and neither overwrite nor continue is configured,
    /// [`SweepError::Preparation`] when the frequency tables cannot be built,
    /// [`SweepError::Cell`] when a cell fails under
    /// [`FailurePolicy::Abort`], and persistence errors when an artifact or
    /// the summary cannot be written.
    #[instrument(
        name = "sweep.run",
        err,
        skip(self),
        fields(
            corpus = %self.config.corpus_dir().display(),
            output = %self.config.output_dir().display(),
            cells = self.plan.cell_count(),
            policy = ?self.config.failure_policy(),
        ),
    )]
    pub fn run(&self) -> Result<SweepReport> {
        enter_phase(SweepPhase::Init);
        let outcome = self.run_phases();
        match &outcome {
            Ok(report) => {
                enter_phase(SweepPhase::Done);
                info!(
                    computed = report.count_where(|o| matches!(o, CellOutcome::Computed { .. })),
                    skipped = report.count_where(|o| matches!(o, CellOutcome::Skipped { .. })),
                    failed = report.count_where(|o| matches!(o, CellOutcome::Failed { .. })),
                    summary = %report.summary_path().display(),
                    "sweep finished"
                );
            }
            Err(err) => {
                error!(phase = %SweepPhase::Aborted, code = %err.code(), "sweep aborted");
            }
        }
        outcome
    }

    fn run_phases(&self) -> Result<SweepReport> {
        enter_phase(SweepPhase::PreparingCorpora);
        self.prepare_output_dir()?;
        let corpora = self.prepare_corpora()?;
        let summary_path = self.config.summary_path();
        let mut scores = ScoreTable::over(self.plan.cells());
        if self.config.resume() && summary_path.is_file() {
            let seeded = scores.seed_from_csv(&summary_path)?;
            info!(seeded, summary = %summary_path.display(), "restored prior scores");
        }

        enter_phase(SweepPhase::Iterating);
        let mut cells = Vec::with_capacity(self.plan.cell_count());
        for &words in self.plan.words() {
            let mut truncated = CaseTables::new();
            for variant in self.plan.variants() {
                for &case in self.plan.cases() {
                    let cell = SweepCell::new(variant.clone(), words, case);
                    let report = self.process_cell(cell, &corpora, &mut truncated, &mut scores)?;
                    cells.push(report);
                }
                scores.write_csv(&summary_path)?;
                debug!(
                    algorithm = %variant.display_name(),
                    words,
                    summary = %summary_path.display(),
                    "score table flushed"
                );
            }
        }
        if cells.is_empty() {
            scores.write_csv(&summary_path)?;
        }

        Ok(SweepReport {
            cells,
            scores,
            summary_path,
            excluded: self.plan.excluded().to_vec(),
        })
    }

    fn prepare_output_dir(&self) -> Result<()> {
        let output = self.config.output_dir();
        if output.exists() {
            if !(self.config.overwrite() || self.config.resume()) {
                return Err(SweepError::OutputExists {
                    path: output.to_path_buf(),
                });
            }
            debug!(output = %output.display(), "reusing existing output folder");
        }
        fs::create_dir_all(output).map_err(|source| SweepError::CreateOutput {
            path: output.to_path_buf(),
            source,
        })
    }

    #[instrument(name = "sweep.prepare", err, skip(self))]
    fn prepare_corpora(&self) -> Result<PreparedCorpora> {
        if self.plan.cell_count() == 0 {
            debug!("empty plan, skipping corpus preparation");
            return Ok(PreparedCorpora::default());
        }
        let sources = self.collaborators.frequencies;
        let mut primary = CaseTables::new();
        if let Some(path) = self.config.frequency_table() {
            let table = sources
                .load_table(path)
                .map_err(|error| SweepError::Preparation { error })?;
            primary.insert(CaseSensitivity::Insensitive, table);
        } else {
            for &case in self.plan.cases() {
                let table = sources
                    .build(self.config.corpus_dir(), case)
                    .map_err(|error| SweepError::Preparation { error })?;
                info!(
                    %case,
                    documents = table.document_count(),
                    features = table.feature_count(),
                    "frequency table ready"
                );
                primary.insert(case, table);
            }
        }

        let reference = match self.config.reference_dir() {
            Some(dir) if self.plan.needs_reference() => {
                let mut tables = CaseTables::new();
                for &case in self.plan.cases() {
                    let table = sources
                        .build(dir, case)
                        .map_err(|error| SweepError::Preparation { error })?;
                    tables.insert(case, table);
                }
                Some(tables)
            }
            _ => None,
        };
        Ok(PreparedCorpora { primary, reference })
    }

    #[instrument(
        name = "sweep.cell",
        skip_all,
        fields(
            algorithm = %cell.variant().display_name(),
            words = cell.words(),
            case = %cell.case(),
        ),
    )]
    fn process_cell(
        &self,
        cell: SweepCell,
        corpora: &PreparedCorpora,
        truncated: &mut CaseTables,
        scores: &mut ScoreTable,
    ) -> Result<CellReport> {
        let path = self.config.output_dir().join(cell.file_name());
        if self.config.resume() && path.exists() {
            scores.mark_skipped(&cell)?;
            let prior = scores.get(&cell);
            info!(path = %path.display(), prior = ?prior, "cell skipped");
            return Ok(CellReport {
                cell,
                path,
                outcome: CellOutcome::Skipped { prior },
            });
        }

        let outcome = match self.evaluate(&cell, corpora, truncated) {
            Ok((distances, score)) => {
                scores.set(&cell, score)?;
                distances
                    .write_csv(&path)
                    .map_err(|source| SweepError::WriteArtifact {
                        path: path.clone(),
                        source,
                    })?;
                info!(score, path = %path.display(), "cell scored");
                CellOutcome::Computed { score }
            }
            Err(error) => match self.config.failure_policy() {
                FailurePolicy::Abort => {
                    return Err(SweepError::Cell {
                        cell: cell.to_string(),
                        error,
                    });
                }
                FailurePolicy::Isolate => {
                    warn!(error = %error, "cell failed, continuing");
                    scores.mark_failed(&cell)?;
                    CellOutcome::Failed {
                        reason: error.to_string(),
                    }
                }
            },
        };
        Ok(CellReport {
            cell,
            path,
            outcome,
        })
    }

    fn evaluate(
        &self,
        cell: &SweepCell,
        corpora: &PreparedCorpora,
        truncated: &mut CaseTables,
    ) -> core::result::Result<(DistanceTable, f64), AnalysisError> {
        let case = cell.case();
        let full = corpora.primary.get(&case).ok_or_else(|| {
            AnalysisError::new(
                AnalysisOperation::Truncate,
                format!("no {case} frequency table was prepared"),
            )
        })?;
        let table = match truncated.entry(case) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => slot.insert(
                self.collaborators
                    .frequencies
                    .truncate(full, cell.words())?,
            ),
        };

        let reference = if cell.variant().requires_reference() {
            self.resolve_reference(corpora, full, case)
        } else {
            None
        };
        let distances =
            self.collaborators
                .distances
                .compute(table, cell.variant().measure(), reference)?;
        let score = self.collaborators.scorer.score(&distances)?;
        if !score.is_finite() {
            return Err(AnalysisError::new(
                AnalysisOperation::Score,
                format!("scorer returned a non-finite value ({score})"),
            ));
        }
        Ok((distances, score))
    }

    fn resolve_reference<'t>(
        &self,
        corpora: &'t PreparedCorpora,
        primary: &'t FrequencyTable,
        case: CaseSensitivity,
    ) -> Option<&'t FrequencyTable> {
        match corpora.reference.as_ref() {
            Some(tables) => tables.get(&case),
            None if self.config.self_reference() => Some(primary),
            None => None,
        }
    }
}

fn enter_phase(phase: SweepPhase) {
    debug!(%phase, "sweep phase");
}
