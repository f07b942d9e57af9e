//! Clustering-quality scores against author ground truth.
//!
//! The author of a document is the part of its name before the first `_`, so
//! `austen_emma` and `austen_persuasion` share the author `austen`.

use std::{
    cmp::Ordering,
    collections::HashMap,
    fmt,
    str::FromStr,
};

use deltasweep_core::DistanceTable;

use crate::{errors::StylometryError, union_find::DisjointSet};

/// Returns the author part of a document name.
///
/// # Examples
/// ```
/// use deltasweep_providers_stylometry::author_of;
///
/// assert_eq!(author_of("austen_emma"), "austen");
/// assert_eq!(author_of("anonymous"), "anonymous");
/// ```
#[must_use]
pub fn author_of(document: &str) -> &str {
    document
        .split_once('_')
        .map_or(document, |(author, _)| author)
}

/// Available clustering-quality scores.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ScoreMethod {
    /// Separation of between-author from within-author distances, in units
    /// of the standard deviation of all distances. Higher is better.
    #[default]
    Simple,
    /// Adjusted Rand index of a single-linkage clustering cut at the number
    /// of authors.
    AdjustedRand,
}

impl ScoreMethod {
    /// Stable name of the score.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::AdjustedRand => "ari",
        }
    }

    /// Scores `distances`.
    ///
    /// # Errors
    /// Returns [`StylometryError`] when the ground truth makes the score
    /// meaningless.
    pub fn score(self, distances: &DistanceTable) -> Result<f64, StylometryError> {
        match self {
            Self::Simple => simple_score(distances),
            Self::AdjustedRand => ari_score(distances),
        }
    }
}

impl fmt::Display for ScoreMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScoreMethod {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "ari" => Ok(Self::AdjustedRand),
            other => Err(format!("unknown score method `{other}`")),
        }
    }
}

fn author_labels(distances: &DistanceTable) -> (Vec<usize>, usize) {
    let mut ids: HashMap<&str, usize> = HashMap::new();
    let labels = distances
        .documents()
        .iter()
        .map(|document| {
            let next = ids.len();
            *ids.entry(author_of(document)).or_insert(next)
        })
        .collect();
    (labels, ids.len())
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "means and deviations over pair counts."
)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Separation score of between-author against within-author distances.
///
/// # Errors
/// Returns [`StylometryError::NoWithinAuthorPairs`] when no author has two
/// documents, [`StylometryError::SingleAuthor`] when every document shares
/// one author, and [`StylometryError::ZeroSpread`] when all distances are
/// equal.
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "score is a standardised difference of means."
)]
pub fn simple_score(distances: &DistanceTable) -> Result<f64, StylometryError> {
    let (labels, _) = author_labels(distances);
    let mut within = Vec::new();
    let mut between = Vec::new();
    let mut all = Vec::new();
    for (i, j, value) in distances.pairs() {
        all.push(value);
        if labels.get(i) == labels.get(j) {
            within.push(value);
        } else {
            between.push(value);
        }
    }
    if within.is_empty() {
        return Err(StylometryError::NoWithinAuthorPairs);
    }
    if between.is_empty() {
        return Err(StylometryError::SingleAuthor);
    }
    let overall = mean(&all);
    let variance = all
        .iter()
        .map(|value| (value - overall) * (value - overall))
        .sum::<f64>()
        / (all.len() - 1).max(1) as f64;
    let spread = variance.sqrt();
    if spread <= 0.0 || !spread.is_finite() {
        return Err(StylometryError::ZeroSpread);
    }
    Ok((mean(&between) - mean(&within)) / spread)
}

/// Assigns single-linkage cluster labels, merging the closest pairs until
/// `clusters` components remain.
fn single_linkage(distances: &DistanceTable, clusters: usize) -> Vec<usize> {
    let n = distances.len();
    let mut edges: Vec<(usize, usize, f64)> = distances.pairs().collect();
    edges.sort_by(|a, b| {
        a.2.partial_cmp(&b.2)
            .unwrap_or(Ordering::Equal)
            .then_with(|| (a.0, a.1).cmp(&(b.0, b.1)))
    });
    let mut set = DisjointSet::new(n);
    for (i, j, _) in edges {
        if set.components() <= clusters {
            break;
        }
        set.union(i, j);
    }
    (0..n).map(|node| set.find(node)).collect()
}

/// Adjusted Rand index of the single-linkage clustering of `distances`
/// against the author labels.
///
/// # Errors
/// Returns [`StylometryError::SingleAuthor`] when fewer than two authors are
/// present.
pub fn ari_score(distances: &DistanceTable) -> Result<f64, StylometryError> {
    let (truth, authors) = author_labels(distances);
    if authors < 2 {
        return Err(StylometryError::SingleAuthor);
    }
    let predicted = single_linkage(distances, authors);
    adjusted_rand_index(&truth, &predicted)
}

type Counts = HashMap<usize, usize>;

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "ARI combinatorics require floating-point arithmetic."
)]
fn comb2(value: usize) -> f64 {
    let as_float = value as f64;
    as_float * (as_float - 1.0) / 2.0
}

/// Adjusted Rand index of two labellings of the same items.
///
/// # Errors
/// Returns [`StylometryError::LabelLengthMismatch`] when the labellings
/// differ in length.
///
/// # Examples
/// ```
/// use deltasweep_providers_stylometry::adjusted_rand_index;
///
/// let ari = adjusted_rand_index(&[0, 0, 1, 1], &[7, 7, 3, 3])?;
/// assert!((ari - 1.0).abs() < f64::EPSILON);
/// # Ok::<(), deltasweep_providers_stylometry::StylometryError>(())
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "ARI definition requires floating-point arithmetic."
)]
pub fn adjusted_rand_index(truth: &[usize], predicted: &[usize]) -> Result<f64, StylometryError> {
    if truth.len() != predicted.len() {
        return Err(StylometryError::LabelLengthMismatch {
            truth: truth.len(),
            predicted: predicted.len(),
        });
    }
    let items = truth.len();
    if items < 2 {
        return Ok(1.0);
    }
    let mut truth_counts = Counts::new();
    let mut predicted_counts = Counts::new();
    let mut contingency = HashMap::<(usize, usize), usize>::new();
    for (&left, &right) in truth.iter().zip(predicted) {
        *truth_counts.entry(left).or_insert(0) += 1;
        *predicted_counts.entry(right).or_insert(0) += 1;
        *contingency.entry((left, right)).or_insert(0) += 1;
    }

    let pairs: f64 = contingency.values().copied().map(comb2).sum();
    let truth_pairs: f64 = truth_counts.values().copied().map(comb2).sum();
    let predicted_pairs: f64 = predicted_counts.values().copied().map(comb2).sum();
    let total = comb2(items);
    let expected = truth_pairs * predicted_pairs / total;
    let max_index = 0.5 * (truth_pairs + predicted_pairs);
    let denominator = max_index - expected;
    if denominator == 0.0 {
        Ok(1.0)
    } else {
        Ok((pairs - expected) / denominator)
    }
}
