use std::path::PathBuf;

use deltasweep_core::TableShapeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StylometryError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corpus folder `{}` contains no .txt documents", path.display())]
    EmptyCorpus { path: PathBuf },
    #[error("document `{document}` contains no word tokens")]
    EmptyDocument { document: String },
    #[error("frequency table line {line}: {reason}")]
    TableFormat { line: usize, reason: String },
    #[error("at least {needed} documents are required but found {actual}")]
    TooFewDocuments { needed: usize, actual: usize },
    #[error("the frequency table has no features")]
    NoFeatures,
    #[error("document `{document}` has a zero-length feature vector")]
    ZeroMagnitude { document: String },
    #[error("measure `{measure}` requires a reference frequency table")]
    ReferenceRequired { measure: String },
    #[error("the reference table has no usable principal components")]
    DegenerateReference,
    #[error("no two documents share an author")]
    NoWithinAuthorPairs,
    #[error("all documents belong to a single author")]
    SingleAuthor,
    #[error("all pairwise distances are equal")]
    ZeroSpread,
    #[error("label length mismatch: truth={truth}, predicted={predicted}")]
    LabelLengthMismatch { truth: usize, predicted: usize },
    #[error(transparent)]
    Shape(#[from] TableShapeError),
}
