//! Coordinates of a single sweep cell.

use std::fmt;

use crate::{measure::AlgorithmVariant, naming::artifact_file_name};

/// Whether text is lower-cased before frequencies are counted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum CaseSensitivity {
    /// Tokens keep their original case.
    Sensitive,
    /// Tokens are lower-cased before counting.
    Insensitive,
}

impl CaseSensitivity {
    /// Both settings in sweep order.
    pub const ALL: [Self; 2] = [Self::Sensitive, Self::Insensitive];

    /// Maps a "case insensitive" flag onto the enum.
    #[must_use]
    pub const fn from_insensitive(insensitive: bool) -> Self {
        if insensitive {
            Self::Insensitive
        } else {
            Self::Sensitive
        }
    }

    /// Returns `true` for [`CaseSensitivity::Insensitive`].
    #[must_use]
    pub const fn is_insensitive(self) -> bool {
        matches!(self, Self::Insensitive)
    }

    /// Label used in artifact names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sensitive => "case_sensitive",
            Self::Insensitive => "case_insensitive",
        }
    }
}

impl fmt::Display for CaseSensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One (variant, word count, case) combination of the sweep.
///
/// # Examples
/// ```
/// use deltasweep_core::{AlgorithmVariant, CaseSensitivity, DistanceMeasure, SweepCell};
///
/// let cell = SweepCell::new(
///     AlgorithmVariant::from(DistanceMeasure::CosineBinary),
///     2000,
///     CaseSensitivity::Insensitive,
/// );
/// assert_eq!(cell.file_name(), "Cosine_Binary.2000.case_insensitive.csv");
/// assert_eq!(cell.to_string(), "Cosine_Binary/2000/case_insensitive");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SweepCell {
    variant: AlgorithmVariant,
    words: usize,
    case: CaseSensitivity,
}

impl SweepCell {
    /// Creates a cell.
    #[must_use]
    pub const fn new(variant: AlgorithmVariant, words: usize, case: CaseSensitivity) -> Self {
        Self {
            variant,
            words,
            case,
        }
    }

    /// Returns the algorithm variant.
    #[must_use]
    pub const fn variant(&self) -> &AlgorithmVariant {
        &self.variant
    }

    /// Returns the most-frequent-word cutoff.
    #[must_use]
    pub const fn words(&self) -> usize {
        self.words
    }

    /// Returns the case setting.
    #[must_use]
    pub const fn case(&self) -> CaseSensitivity {
        self.case
    }

    /// Returns the artifact file name for this cell.
    #[must_use]
    pub fn file_name(&self) -> String {
        artifact_file_name(self.variant.name(), self.words, self.case)
    }
}

impl fmt::Display for SweepCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.variant.display_name(),
            self.words,
            self.case
        )
    }
}
