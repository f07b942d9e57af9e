//! Enumeration of the sweep space.
//!
//! A plan is the cross-product of algorithm variants, word counts, and case
//! settings. Cells are produced with the word count outermost, then the
//! variant, then the case setting, so consecutive cells share the truncated
//! frequency table of their word count.

use tracing::warn;

use crate::{
    cell::{CaseSensitivity, SweepCell},
    config::SweepConfig,
    measure::AlgorithmVariant,
};

/// Why a configured variant was dropped from the plan.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExclusionReason {
    /// The variant needs a reference table and none can be resolved.
    MissingReference,
}

/// A configured variant that will not be swept.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExcludedVariant {
    /// Variant that was dropped.
    pub variant: AlgorithmVariant,
    /// Reason for dropping it.
    pub reason: ExclusionReason,
}

/// Whether reference-dependent variants can obtain a reference table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReferenceAvailability {
    /// A reference corpus is configured.
    Configured,
    /// The primary corpus serves as its own reference.
    SelfReference,
    /// No reference can be resolved.
    Unavailable,
}

impl ReferenceAvailability {
    /// Resolves availability from the run configuration.
    #[must_use]
    pub fn from_config(config: &SweepConfig) -> Self {
        if config.reference_dir().is_some() {
            Self::Configured
        } else if config.self_reference() {
            Self::SelfReference
        } else {
            Self::Unavailable
        }
    }
}

/// Case settings swept for a run.
///
/// A precomputed frequency table is already case-folded, so only the
/// case-insensitive branch exists for it.
#[must_use]
pub fn case_settings(precomputed_table: bool) -> Vec<CaseSensitivity> {
    if precomputed_table {
        vec![CaseSensitivity::Insensitive]
    } else {
        CaseSensitivity::ALL.to_vec()
    }
}

/// The full set of cells of a sweep.
///
/// # Examples
/// ```
/// use deltasweep_core::{
///     AlgorithmVariant, CaseSensitivity, DistanceMeasure, ReferenceAvailability, SweepPlan,
/// };
///
/// let plan = SweepPlan::new(
///     DistanceMeasure::DEFAULT_SWEEP.into_iter().map(AlgorithmVariant::from).collect(),
///     vec![100, 200],
///     CaseSensitivity::ALL.to_vec(),
///     ReferenceAvailability::SelfReference,
/// );
/// assert_eq!(plan.cell_count(), 8);
/// let first: Vec<String> = plan.cells().take(3).map(|cell| cell.to_string()).collect();
/// assert_eq!(first, [
///     "Cosine_Eder/100/case_sensitive",
///     "Cosine_Eder/100/case_insensitive",
///     "Cosine_Binary/100/case_sensitive",
/// ]);
/// ```
#[derive(Clone, Debug)]
pub struct SweepPlan {
    variants: Vec<AlgorithmVariant>,
    words: Vec<usize>,
    cases: Vec<CaseSensitivity>,
    excluded: Vec<ExcludedVariant>,
}

impl SweepPlan {
    /// Builds a plan, dropping variants whose reference cannot be resolved.
    #[must_use]
    pub fn new(
        variants: Vec<AlgorithmVariant>,
        words: Vec<usize>,
        cases: Vec<CaseSensitivity>,
        reference: ReferenceAvailability,
    ) -> Self {
        let mut kept = Vec::with_capacity(variants.len());
        let mut excluded = Vec::new();
        for variant in variants {
            if variant.requires_reference() && reference == ReferenceAvailability::Unavailable {
                warn!(
                    variant = %variant.display_name(),
                    "excluding variant: no reference corpus configured and self-reference disabled"
                );
                excluded.push(ExcludedVariant {
                    variant,
                    reason: ExclusionReason::MissingReference,
                });
            } else {
                kept.push(variant);
            }
        }
        Self {
            variants: kept,
            words,
            cases,
            excluded,
        }
    }

    /// Builds the plan described by `config`.
    #[must_use]
    pub fn from_config(config: &SweepConfig) -> Self {
        Self::new(
            config.variants().to_vec(),
            config.words().to_vec(),
            case_settings(config.frequency_table().is_some()),
            ReferenceAvailability::from_config(config),
        )
    }

    /// Variants that will be swept.
    #[must_use]
    pub fn variants(&self) -> &[AlgorithmVariant] {
        &self.variants
    }

    /// Word counts in sweep order.
    #[must_use]
    pub fn words(&self) -> &[usize] {
        &self.words
    }

    /// Case settings in sweep order.
    #[must_use]
    pub fn cases(&self) -> &[CaseSensitivity] {
        &self.cases
    }

    /// Variants dropped while planning.
    #[must_use]
    pub fn excluded(&self) -> &[ExcludedVariant] {
        &self.excluded
    }

    /// Whether any planned variant needs a reference table.
    #[must_use]
    pub fn needs_reference(&self) -> bool {
        self.variants.iter().any(AlgorithmVariant::requires_reference)
    }

    /// Total number of cells, counting duplicate word counts separately.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.words.len() * self.variants.len() * self.cases.len()
    }

    /// Iterates over every cell in sweep order.
    pub fn cells(&self) -> impl Iterator<Item = SweepCell> + '_ {
        self.words.iter().flat_map(move |&words| {
            self.variants.iter().flat_map(move |variant| {
                self.cases
                    .iter()
                    .map(move |&case| SweepCell::new(variant.clone(), words, case))
            })
        })
    }
}
