//! Distance measures and the algorithm variants built from them.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::naming::title_case;

/// Fixed set of distance measures understood by the sweep.
///
/// The core never inspects the mathematics behind a measure; it only needs the
/// stable name and whether a reference frequency table must be supplied.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum DistanceMeasure {
    /// Burrows' Delta: mean absolute z-score difference.
    Burrows,
    /// Sum of squared z-score differences.
    Quadratic,
    /// Eder's Delta: rank-weighted absolute z-score difference.
    Eder,
    /// Cosine distance between z-score vectors.
    CosineDelta,
    /// Cosine distance between rank-weighted z-score vectors.
    CosineEder,
    /// Cosine distance between z-score sign vectors.
    CosineBinary,
    /// Distance in the eigenbasis of a reference corpus covariance.
    RotatedDelta,
}

impl DistanceMeasure {
    /// Every supported measure in a stable order.
    pub const ALL: [Self; 7] = [
        Self::Burrows,
        Self::Quadratic,
        Self::Eder,
        Self::CosineDelta,
        Self::CosineEder,
        Self::CosineBinary,
        Self::RotatedDelta,
    ];

    /// Measures swept when the caller does not choose any.
    pub const DEFAULT_SWEEP: [Self; 2] = [Self::CosineEder, Self::CosineBinary];

    /// Returns the stable snake-case identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Burrows => "burrows",
            Self::Quadratic => "quadratic",
            Self::Eder => "eder",
            Self::CosineDelta => "cosine_delta",
            Self::CosineEder => "cosine_eder",
            Self::CosineBinary => "cosine_binary",
            Self::RotatedDelta => "rotated_delta",
        }
    }

    /// Whether the measure needs a reference frequency table.
    #[must_use]
    pub const fn requires_reference(self) -> bool {
        matches!(self, Self::RotatedDelta)
    }
}

impl fmt::Display for DistanceMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raised when a measure name is not part of [`DistanceMeasure::ALL`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown distance measure `{name}`")]
pub struct UnknownMeasureError {
    /// Name supplied by the caller.
    pub name: String,
}

impl FromStr for DistanceMeasure {
    type Err = UnknownMeasureError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|measure| measure.name() == wanted)
            .ok_or_else(|| UnknownMeasureError {
                name: raw.to_owned(),
            })
    }
}

/// A named algorithm variant swept over.
///
/// # Examples
/// ```
/// use deltasweep_core::{AlgorithmVariant, DistanceMeasure};
///
/// let variant = AlgorithmVariant::from(DistanceMeasure::CosineEder);
/// assert_eq!(variant.name(), "cosine_eder");
/// assert_eq!(variant.display_name(), "Cosine_Eder");
/// assert!(!variant.requires_reference());
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AlgorithmVariant {
    name: String,
    measure: DistanceMeasure,
}

impl AlgorithmVariant {
    /// Creates a variant with a custom name for `measure`.
    #[must_use]
    pub fn named(name: impl Into<String>, measure: DistanceMeasure) -> Self {
        Self {
            name: name.into(),
            measure,
        }
    }

    /// Returns the raw variant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the title-cased name used in artifacts and the score table.
    #[must_use]
    pub fn display_name(&self) -> String {
        title_case(&self.name)
    }

    /// Returns the measure computed for this variant.
    #[must_use]
    pub const fn measure(&self) -> DistanceMeasure {
        self.measure
    }

    /// Whether this variant needs a reference frequency table.
    #[must_use]
    pub const fn requires_reference(&self) -> bool {
        self.measure.requires_reference()
    }
}

impl From<DistanceMeasure> for AlgorithmVariant {
    fn from(measure: DistanceMeasure) -> Self {
        Self::named(measure.name(), measure)
    }
}
