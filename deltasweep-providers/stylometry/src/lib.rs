//! Stylometry provider implementing the deltasweep analysis traits.
//!
//! Builds relative word-frequency tables from plain-text corpora or stylo
//! exports, evaluates the Delta family of distance measures, and scores the
//! resulting distance tables against the author encoded in document names.

mod corpus;
mod errors;
mod linalg;
mod measures;
mod scoring;
mod stylo;
mod union_find;

use std::path::Path;

use deltasweep_core::{
    AnalysisError, AnalysisOperation, CaseSensitivity, ClusteringScorer, Collaborators,
    DistanceComputer, DistanceMeasure, DistanceTable, FrequencySource, FrequencyTable,
};

pub use crate::{
    corpus::{corpus_files, frequency_table, frequency_table_from_relative, load_corpus, tokenize},
    errors::StylometryError,
    measures::{FeatureStats, delta_distances},
    scoring::{ScoreMethod, adjusted_rand_index, ari_score, author_of, simple_score},
    stylo::{load_stylo_table, parse_stylo_table},
};

/// Provider backed by the functions of this crate.
///
/// # Examples
/// ```no_run
/// use deltasweep_core::{SweepConfigBuilder, SweepController};
/// use deltasweep_providers_stylometry::{ScoreMethod, StylometryProvider};
///
/// let provider = StylometryProvider::new(ScoreMethod::Simple);
/// let config = SweepConfigBuilder::new("corpus").build()?;
/// let report = SweepController::new(config, provider.collaborators()).run()?;
/// println!("{} cells", report.cells().len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct StylometryProvider {
    score: ScoreMethod,
}

impl StylometryProvider {
    /// Creates a provider scoring with `score`.
    #[must_use]
    pub const fn new(score: ScoreMethod) -> Self {
        Self { score }
    }

    /// Returns the configured score.
    #[must_use]
    pub const fn score_method(&self) -> ScoreMethod {
        self.score
    }

    /// Borrows this provider as all three sweep collaborators.
    #[must_use]
    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            frequencies: self,
            distances: self,
            scorer: self,
        }
    }
}

impl FrequencySource for StylometryProvider {
    fn build(
        &self,
        corpus: &Path,
        case: CaseSensitivity,
    ) -> Result<FrequencyTable, AnalysisError> {
        load_corpus(corpus, case)
            .map_err(|err| AnalysisError::new(AnalysisOperation::BuildFrequencies, err))
    }

    fn load_table(&self, path: &Path) -> Result<FrequencyTable, AnalysisError> {
        load_stylo_table(path)
            .map_err(|err| AnalysisError::new(AnalysisOperation::LoadFrequencies, err))
    }
}

impl DistanceComputer for StylometryProvider {
    fn compute(
        &self,
        table: &FrequencyTable,
        measure: DistanceMeasure,
        reference: Option<&FrequencyTable>,
    ) -> Result<DistanceTable, AnalysisError> {
        delta_distances(table, measure, reference)
            .map_err(|err| AnalysisError::new(AnalysisOperation::Distance, err))
    }
}

impl ClusteringScorer for StylometryProvider {
    fn score(&self, distances: &DistanceTable) -> Result<f64, AnalysisError> {
        self.score
            .score(distances)
            .map_err(|err| AnalysisError::new(AnalysisOperation::Score, err))
    }
}
