//! Run parameters for a sweep and the builder that validates them.

use std::path::{Path, PathBuf};

use crate::{
    Result,
    error::SweepError,
    measure::{AlgorithmVariant, DistanceMeasure},
    naming::{default_output_dir, summary_path},
    words::WordSpec,
};

/// What happens when a single cell's computation fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the sweep at the first failing cell.
    #[default]
    Abort,
    /// Log the failure, mark the cell as failed, and carry on.
    Isolate,
}

/// Immutable parameters of one sweep run.
///
/// Built through [`SweepConfigBuilder`].
#[derive(Debug, Clone)]
pub struct SweepConfig {
    corpus_dir: PathBuf,
    reference_dir: Option<PathBuf>,
    output_dir: PathBuf,
    overwrite: bool,
    resume: bool,
    words: Vec<usize>,
    frequency_table: Option<PathBuf>,
    variants: Vec<AlgorithmVariant>,
    self_reference: bool,
    failure_policy: FailurePolicy,
}

impl SweepConfig {
    /// Directory holding the primary corpus.
    #[must_use]
    pub fn corpus_dir(&self) -> &Path {
        &self.corpus_dir
    }

    /// Directory holding the reference corpus, if any.
    #[must_use]
    pub fn reference_dir(&self) -> Option<&Path> {
        self.reference_dir.as_deref()
    }

    /// Directory receiving the per-cell artifacts.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the score summary written next to the output directory.
    #[must_use]
    pub fn summary_path(&self) -> PathBuf {
        summary_path(&self.output_dir)
    }

    /// Whether an existing output directory may be reused and recomputed.
    #[must_use]
    pub const fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Whether cells with an existing artifact are skipped.
    #[must_use]
    pub const fn resume(&self) -> bool {
        self.resume
    }

    /// Expanded most-frequent-word cutoffs.
    #[must_use]
    pub fn words(&self) -> &[usize] {
        &self.words
    }

    /// Precomputed frequency table replacing corpus loading, if any.
    #[must_use]
    pub fn frequency_table(&self) -> Option<&Path> {
        self.frequency_table.as_deref()
    }

    /// Algorithm variants to sweep.
    #[must_use]
    pub fn variants(&self) -> &[AlgorithmVariant] {
        &self.variants
    }

    /// Whether the primary corpus may act as its own reference.
    #[must_use]
    pub const fn self_reference(&self) -> bool {
        self.self_reference
    }

    /// Policy applied to per-cell failures.
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }
}

/// Configures and validates [`SweepConfig`] instances.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use deltasweep_core::{SweepConfigBuilder, WordSpec};
///
/// let config = SweepConfigBuilder::new("novels")
///     .with_word_spec(WordSpec::new("100,200"))
///     .build()?;
/// assert_eq!(config.output_dir(), Path::new("novels_deltas"));
/// assert_eq!(config.summary_path(), Path::new("novels_deltas_scores.csv"));
/// assert_eq!(config.words(), [100, 200]);
/// assert_eq!(config.variants().len(), 2);
/// # Ok::<(), deltasweep_core::SweepError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SweepConfigBuilder {
    corpus_dir: PathBuf,
    reference_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    overwrite: bool,
    resume: bool,
    word_spec: WordSpec,
    frequency_table: Option<PathBuf>,
    variants: Vec<AlgorithmVariant>,
    self_reference: bool,
    failure_policy: FailurePolicy,
}

impl SweepConfigBuilder {
    /// Starts a configuration for the corpus in `corpus_dir`.
    #[must_use]
    pub fn new(corpus_dir: impl Into<PathBuf>) -> Self {
        Self {
            corpus_dir: corpus_dir.into(),
            reference_dir: None,
            output_dir: None,
            overwrite: false,
            resume: false,
            word_spec: WordSpec::default(),
            frequency_table: None,
            variants: DistanceMeasure::DEFAULT_SWEEP
                .into_iter()
                .map(AlgorithmVariant::from)
                .collect(),
            self_reference: true,
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Sets the reference corpus directory.
    #[must_use]
    pub fn with_reference_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.reference_dir = dir;
        self
    }

    /// Overrides the output directory (defaults to `<corpus_dir>_deltas`).
    #[must_use]
    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    /// Allows reusing an existing output directory and recomputing every cell.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Allows reusing an existing output directory, skipping finished cells.
    #[must_use]
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// Sets the most-frequent-word specification.
    #[must_use]
    pub fn with_word_spec(mut self, spec: WordSpec) -> Self {
        self.word_spec = spec;
        self
    }

    /// Uses a precomputed frequency table instead of the corpus.
    #[must_use]
    pub fn with_frequency_table(mut self, path: Option<PathBuf>) -> Self {
        self.frequency_table = path;
        self
    }

    /// Replaces the swept algorithm variants.
    #[must_use]
    pub fn with_variants(mut self, variants: impl IntoIterator<Item = AlgorithmVariant>) -> Self {
        self.variants = variants.into_iter().collect();
        self
    }

    /// Controls whether the primary corpus may serve as its own reference.
    #[must_use]
    pub fn with_self_reference(mut self, allowed: bool) -> Self {
        self.self_reference = allowed;
        self
    }

    /// Sets the per-cell failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Validates the configuration and expands the word specification.
    ///
    /// # Errors
    /// Returns [`SweepError::ConflictingPolicies`] when both overwrite and
    /// resume are set, [`SweepError::NoVariants`] when no variant is
    /// configured, and [`SweepError::WordSpec`] when the word specification is
    /// malformed.
    pub fn build(self) -> Result<SweepConfig> {
        if self.overwrite && self.resume {
            return Err(SweepError::ConflictingPolicies);
        }
        if self.variants.is_empty() {
            return Err(SweepError::NoVariants);
        }
        let words = self.word_spec.expand()?;
        let output_dir = self
            .output_dir
            .unwrap_or_else(|| default_output_dir(&self.corpus_dir));
        Ok(SweepConfig {
            corpus_dir: self.corpus_dir,
            reference_dir: self.reference_dir,
            output_dir,
            overwrite: self.overwrite,
            resume: self.resume,
            words,
            frequency_table: self.frequency_table,
            variants: self.variants,
            self_reference: self.self_reference,
            failure_policy: self.failure_policy,
        })
    }
}
