//! Deltasweep core library.
//!
//! Plans and runs parameter sweeps over stylometric distance measures,
//! most-frequent-word cutoffs, and case settings. The analysis itself is
//! reached through the [`FrequencySource`], [`DistanceComputer`], and
//! [`ClusteringScorer`] traits.

mod analysis;
mod cell;
mod config;
mod controller;
mod error;
mod measure;
mod naming;
mod plan;
mod score_table;
mod table;
mod words;

pub use crate::{
    analysis::{ClusteringScorer, Collaborators, DistanceComputer, FrequencySource},
    cell::{CaseSensitivity, SweepCell},
    config::{FailurePolicy, SweepConfig, SweepConfigBuilder},
    controller::{CellOutcome, CellReport, SweepController, SweepPhase, SweepReport},
    error::{AnalysisError, AnalysisOperation, Result, SweepError, SweepErrorCode},
    measure::{AlgorithmVariant, DistanceMeasure, UnknownMeasureError},
    naming::{artifact_file_name, default_output_dir, summary_path, title_case},
    plan::{
        ExcludedVariant, ExclusionReason, ReferenceAvailability, SweepPlan, case_settings,
    },
    score_table::{CellStatus, ScoreEntry, ScoreTable, ScoreTableError},
    table::{DistanceTable, FrequencyTable, TableShapeError},
    words::{
        DEFAULT_WORD_SPEC, MAX_WORD_COUNTS, WordSpec, WordSpecError, WordSpecErrorCode,
        expand_word_spec,
    },
};
