//! Error types for the sweep core.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and the boxed error wrapper used at the
//! collaborator seam.

use std::{error::Error as StdError, fmt, io, path::PathBuf};

use thiserror::Error;

use crate::score_table::ScoreTableError;
use crate::words::WordSpecError;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl ::core::fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

pub(crate) use define_error_codes;

/// Identifies which collaborator capability produced an [`AnalysisError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AnalysisOperation {
    /// Building a frequency table from a corpus directory.
    BuildFrequencies,
    /// Loading a precomputed frequency table from disk.
    LoadFrequencies,
    /// Truncating a frequency table to its most frequent features.
    Truncate,
    /// Computing a distance table.
    Distance,
    /// Scoring a distance table against ground truth.
    Score,
}

impl AnalysisOperation {
    /// Returns a short human-readable label for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BuildFrequencies => "frequency table construction",
            Self::LoadFrequencies => "frequency table loading",
            Self::Truncate => "frequency table truncation",
            Self::Distance => "distance computation",
            Self::Score => "clustering score",
        }
    }
}

impl fmt::Display for AnalysisOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by one of the analysis collaborators.
///
/// The core treats collaborator failures as opaque; the wrapped error keeps the
/// provider's own type available through [`std::error::Error::source`].
///
/// # Examples
/// ```
/// use deltasweep_core::{AnalysisError, AnalysisOperation};
///
/// let err = AnalysisError::new(AnalysisOperation::Distance, "degenerate input");
/// assert_eq!(err.operation(), AnalysisOperation::Distance);
/// assert_eq!(err.to_string(), "distance computation failed: degenerate input");
/// ```
#[derive(Debug, Error)]
#[error("{operation} failed: {source}")]
pub struct AnalysisError {
    operation: AnalysisOperation,
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl AnalysisError {
    /// Wraps `source` as a failure of `operation`.
    pub fn new(
        operation: AnalysisOperation,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }

    /// Returns the capability that failed.
    #[must_use]
    pub const fn operation(&self) -> AnalysisOperation {
        self.operation
    }
}

/// Error type produced when configuring or running a sweep.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SweepError {
    /// The output directory already exists and neither overwrite nor continue
    /// was requested.
    #[error("output folder `{}` already exists; pass --overwrite or --continue", path.display())]
    OutputExists {
        /// Directory that blocked the run.
        path: PathBuf,
    },
    /// Overwrite and continue were both requested.
    #[error("overwrite and continue are mutually exclusive")]
    ConflictingPolicies,
    /// The sweep was configured without any algorithm variant.
    #[error("at least one algorithm variant must be configured")]
    NoVariants,
    /// The word-count specification could not be parsed.
    #[error(transparent)]
    WordSpec {
        /// Underlying parse failure.
        #[from]
        source: WordSpecError,
    },
    /// The output directory could not be created.
    #[error("failed to create output folder `{}`: {source}", path.display())]
    CreateOutput {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Corpus or reference preparation failed before any cell ran.
    #[error("corpus preparation failed: {error}")]
    Preparation {
        /// Collaborator failure.
        #[source]
        error: AnalysisError,
    },
    /// A single cell failed and the failure policy aborts the run.
    #[error("cell {cell} failed: {error}")]
    Cell {
        /// Display form of the failing cell.
        cell: String,
        /// Collaborator failure.
        #[source]
        error: AnalysisError,
    },
    /// A distance-table artifact could not be written.
    #[error("failed to write `{}`: {source}", path.display())]
    WriteArtifact {
        /// Artifact path.
        path: PathBuf,
        /// Underlying CSV or IO error.
        #[source]
        source: csv::Error,
    },
    /// Reading, updating, or flushing the score table failed.
    #[error(transparent)]
    ScoreTable {
        /// Underlying score table failure.
        #[from]
        source: ScoreTableError,
    },
}

define_error_codes! {
    /// Stable codes describing [`SweepError`] variants.
    enum SweepErrorCode for SweepError {
        /// The output directory already exists.
        OutputExists => OutputExists { .. } => "SWEEP_OUTPUT_EXISTS",
        /// Overwrite and continue were both requested.
        ConflictingPolicies => ConflictingPolicies => "SWEEP_CONFLICTING_POLICIES",
        /// No algorithm variant was configured.
        NoVariants => NoVariants => "SWEEP_NO_VARIANTS",
        /// The word-count specification could not be parsed.
        WordSpec => WordSpec { .. } => "SWEEP_WORD_SPEC",
        /// The output directory could not be created.
        CreateOutput => CreateOutput { .. } => "SWEEP_CREATE_OUTPUT",
        /// Corpus preparation failed.
        Preparation => Preparation { .. } => "SWEEP_PREPARATION_FAILED",
        /// A cell failed under the abort policy.
        Cell => Cell { .. } => "SWEEP_CELL_FAILED",
        /// An artifact could not be written.
        WriteArtifact => WriteArtifact { .. } => "SWEEP_WRITE_ARTIFACT",
        /// The score table could not be read or written.
        ScoreTable => ScoreTable { .. } => "SWEEP_SCORE_TABLE",
    }
}

impl SweepError {
    /// Retrieve the inner [`crate::WordSpecErrorCode`] when the error came from
    /// parsing the word-count specification.
    #[must_use]
    pub const fn word_spec_code(&self) -> Option<crate::WordSpecErrorCode> {
        match self {
            Self::WordSpec { source } => Some(source.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the sweep API.
pub type Result<T> = core::result::Result<T, SweepError>;
