//! Capability traits implemented by the analysis provider.
//!
//! The sweep controller depends only on these three seams, so tests can swap
//! in fakes and alternative providers can be plugged in without touching the
//! control loop.

use std::path::Path;

use crate::{
    cell::CaseSensitivity,
    error::AnalysisError,
    measure::DistanceMeasure,
    table::{DistanceTable, FrequencyTable},
};

/// Builds frequency tables from corpora or precomputed files.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use deltasweep_core::{AnalysisError, CaseSensitivity, FrequencySource, FrequencyTable};
///
/// struct Fixed;
///
/// impl FrequencySource for Fixed {
///     fn build(&self, _: &Path, _: CaseSensitivity) -> Result<FrequencyTable, AnalysisError> {
///         Ok(FrequencyTable::new(
///             vec!["a".into()],
///             vec!["the".into(), "of".into()],
///             vec![vec![0.6, 0.4]],
///         ).expect("valid table"))
///     }
///
///     fn load_table(&self, path: &Path) -> Result<FrequencyTable, AnalysisError> {
///         self.build(path, CaseSensitivity::Insensitive)
///     }
/// }
///
/// let source = Fixed;
/// let full = source.build(Path::new("corpus"), CaseSensitivity::Sensitive)?;
/// assert_eq!(source.truncate(&full, 1)?.feature_count(), 1);
/// # Ok::<(), AnalysisError>(())
/// ```
pub trait FrequencySource {
    /// Builds the full frequency table of the corpus in `corpus`.
    ///
    /// # Errors
    /// Returns [`AnalysisError`] when the corpus cannot be read or is empty.
    fn build(&self, corpus: &Path, case: CaseSensitivity)
    -> Result<FrequencyTable, AnalysisError>;

    /// Loads a precomputed, already case-folded frequency table and scales it
    /// to fractional units.
    ///
    /// # Errors
    /// Returns [`AnalysisError`] when the file cannot be read or parsed.
    fn load_table(&self, path: &Path) -> Result<FrequencyTable, AnalysisError>;

    /// Keeps the `words` most frequent features of `table`.
    ///
    /// # Errors
    /// The default implementation never fails.
    fn truncate(
        &self,
        table: &FrequencyTable,
        words: usize,
    ) -> Result<FrequencyTable, AnalysisError> {
        Ok(table.most_frequent(words))
    }
}

/// Computes pairwise document distances.
pub trait DistanceComputer {
    /// Computes the distance table of `table` under `measure`.
    ///
    /// `reference` is supplied for measures that require one.
    ///
    /// # Errors
    /// Returns [`AnalysisError`] when the measure cannot be evaluated on the
    /// input.
    fn compute(
        &self,
        table: &FrequencyTable,
        measure: DistanceMeasure,
        reference: Option<&FrequencyTable>,
    ) -> Result<DistanceTable, AnalysisError>;
}

/// Scores how well a distance table recovers known document groupings.
pub trait ClusteringScorer {
    /// Returns a finite score for `distances`.
    ///
    /// # Errors
    /// Returns [`AnalysisError`] when no meaningful score exists.
    fn score(&self, distances: &DistanceTable) -> Result<f64, AnalysisError>;
}

/// Borrowed bundle of the three collaborators used by a sweep.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Frequency table construction and truncation.
    pub frequencies: &'a dyn FrequencySource,
    /// Distance computation.
    pub distances: &'a dyn DistanceComputer,
    /// Clustering-quality scoring.
    pub scorer: &'a dyn ClusteringScorer,
}
