//! Delta distance measures.
//!
//! Every measure works on per-feature z-scores. Standard deviations are
//! sample deviations; a feature that is constant across documents gets a
//! z-score of zero. Rows of the distance matrix are computed in parallel.

use deltasweep_core::{DistanceMeasure, DistanceTable, FrequencyTable};
use rayon::prelude::*;

use crate::{errors::StylometryError, linalg::symmetric_eigen};

/// Relative eigenvalue below which a principal component is discarded.
const EIGEN_CUTOFF: f64 = 1e-10;

/// Per-feature means and sample standard deviations.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureStats {
    means: Vec<f64>,
    deviations: Vec<f64>,
}

impl FeatureStats {
    /// Computes the statistics of every feature column of `table`.
    ///
    /// # Errors
    /// Returns [`StylometryError::TooFewDocuments`] when the table has fewer
    /// than two documents.
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "mean and sample deviation over document counts."
    )]
    pub fn of(table: &FrequencyTable) -> Result<Self, StylometryError> {
        let documents = table.document_count();
        if documents < 2 {
            return Err(StylometryError::TooFewDocuments {
                needed: 2,
                actual: documents,
            });
        }
        let n = documents as f64;
        let features = table.feature_count();
        let mut means = vec![0.0; features];
        for row in table.rows() {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value / n;
            }
        }
        let mut deviations = vec![0.0; features];
        for row in table.rows() {
            for ((deviation, mean), value) in deviations.iter_mut().zip(&means).zip(row) {
                let delta = value - mean;
                *deviation += delta * delta;
            }
        }
        for deviation in &mut deviations {
            *deviation = (*deviation / (n - 1.0)).sqrt();
        }
        Ok(Self { means, deviations })
    }

    /// Converts one row of frequencies into z-scores.
    #[expect(clippy::float_arithmetic, reason = "z-score standardisation.")]
    #[must_use]
    pub fn z_scores(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.means)
            .zip(&self.deviations)
            .map(|((value, mean), deviation)| {
                if *deviation > 0.0 {
                    (value - mean) / deviation
                } else {
                    0.0
                }
            })
            .collect()
    }
}

fn z_matrix(table: &FrequencyTable, stats: &FeatureStats) -> Vec<Vec<f64>> {
    table.rows().iter().map(|row| stats.z_scores(row)).collect()
}

/// Rank weights `(m - k) / m` for features `k = 0..m`.
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "Eder's weights are ratios of feature ranks."
)]
fn eder_weights(features: usize) -> Vec<f64> {
    let m = features as f64;
    (0..features).map(|k| (m - k as f64) / m).collect()
}

#[expect(clippy::float_arithmetic, reason = "vector arithmetic.")]
fn weighted(rows: Vec<Vec<f64>>, weights: &[f64]) -> Vec<Vec<f64>> {
    rows.into_iter()
        .map(|row| row.iter().zip(weights).map(|(z, w)| z * w).collect())
        .collect()
}

fn signs(rows: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|z| if z == 0.0 { 0.0 } else { z.signum() })
                .collect()
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Metric {
    Manhattan { scale: f64 },
    WeightedManhattan,
    SquaredEuclidean,
    Euclidean,
    Cosine,
}

#[expect(clippy::float_arithmetic, reason = "distance arithmetic.")]
fn dot(left: &[f64], right: &[f64]) -> f64 {
    left.iter().zip(right).map(|(a, b)| a * b).sum()
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "distance arithmetic."
)]
fn pair_distance(metric: Metric, left: &[f64], right: &[f64], weights: &[f64]) -> f64 {
    match metric {
        Metric::Manhattan { scale } => {
            left.iter().zip(right).map(|(a, b)| (a - b).abs()).sum::<f64>() / scale
        }
        Metric::WeightedManhattan => {
            let total: f64 = left
                .iter()
                .zip(right)
                .zip(weights)
                .map(|((a, b), w)| (a - b).abs() * w)
                .sum();
            total / weights.len().max(1) as f64
        }
        Metric::SquaredEuclidean => left.iter().zip(right).map(|(a, b)| (a - b) * (a - b)).sum(),
        Metric::Euclidean => pair_distance(Metric::SquaredEuclidean, left, right, weights).sqrt(),
        Metric::Cosine => {
            let norms = (dot(left, left) * dot(right, right)).sqrt();
            1.0 - dot(left, right) / norms
        }
    }
}

fn check_magnitudes(
    documents: &[String],
    rows: &[Vec<f64>],
) -> Result<(), StylometryError> {
    for (document, row) in documents.iter().zip(rows) {
        if dot(row, row) == 0.0 {
            return Err(StylometryError::ZeroMagnitude {
                document: document.clone(),
            });
        }
    }
    Ok(())
}

fn distance_matrix(
    documents: &[String],
    rows: &[Vec<f64>],
    metric: Metric,
    weights: &[f64],
) -> Result<DistanceTable, StylometryError> {
    if matches!(metric, Metric::Cosine) {
        check_magnitudes(documents, rows)?;
    }
    let values: Vec<Vec<f64>> = rows
        .par_iter()
        .enumerate()
        .map(|(i, left)| {
            rows.iter()
                .enumerate()
                .map(|(j, right)| {
                    if i == j {
                        0.0
                    } else {
                        pair_distance(metric, left, right, weights)
                    }
                })
                .collect()
        })
        .collect();
    Ok(DistanceTable::new(documents.to_vec(), values)?)
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "principal component projection."
)]
fn rotated_rows(
    table: &FrequencyTable,
    reference: &FrequencyTable,
) -> Result<Vec<Vec<f64>>, StylometryError> {
    let aligned = reference.aligned_to(table.features());
    let stats = FeatureStats::of(&aligned)?;
    let reference_z = z_matrix(&aligned, &stats);
    let k = reference_z.len();
    let denominator = (k - 1) as f64;

    let gram: Vec<Vec<f64>> = reference_z
        .iter()
        .map(|left| {
            reference_z
                .iter()
                .map(|right| dot(left, right) / denominator)
                .collect()
        })
        .collect();
    let eigen = symmetric_eigen(&gram);
    let largest = eigen.values.first().copied().unwrap_or(0.0);
    if largest <= 0.0 {
        return Err(StylometryError::DegenerateReference);
    }

    // Feature-space eigenvectors follow from the document-space ones:
    // v = Zᵀu / sqrt(λ (k - 1)); projections are whitened by 1 / sqrt(λ).
    let mut axes: Vec<Vec<f64>> = Vec::new();
    for (value, u) in eigen.values.iter().zip(&eigen.vectors) {
        if *value <= EIGEN_CUTOFF * largest {
            continue;
        }
        let norm = (value * denominator).sqrt();
        let whitening = value.sqrt();
        let mut axis = vec![0.0; table.feature_count()];
        for (weight, row) in u.iter().zip(&reference_z) {
            for (component, z) in axis.iter_mut().zip(row) {
                *component += weight * z;
            }
        }
        for component in &mut axis {
            *component /= norm * whitening;
        }
        axes.push(axis);
    }
    if axes.is_empty() {
        return Err(StylometryError::DegenerateReference);
    }

    Ok(table
        .rows()
        .iter()
        .map(|row| {
            let z = stats.z_scores(row);
            axes.iter().map(|axis| dot(&z, axis)).collect()
        })
        .collect())
}

/// Computes the pairwise distance table of `table` under `measure`.
///
/// # Errors
/// Returns [`StylometryError`] when the table has fewer than two documents
/// or no features, when a cosine measure meets a zero vector, and when the
/// rotated measure has no usable reference.
///
/// # Examples
/// ```
/// use deltasweep_core::{DistanceMeasure, FrequencyTable};
/// use deltasweep_providers_stylometry::delta_distances;
///
/// let table = FrequencyTable::new(
///     vec!["a_1".into(), "a_2".into(), "b_1".into()],
///     vec!["the".into(), "of".into()],
///     vec![vec![0.5, 0.1], vec![0.4, 0.2], vec![0.1, 0.5]],
/// )?;
/// let distances = delta_distances(&table, DistanceMeasure::Burrows, None)?;
/// assert_eq!(distances.get(0, 0), Some(0.0));
/// assert_eq!(distances.get(0, 2), distances.get(2, 0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[expect(
    clippy::cast_precision_loss,
    reason = "feature counts scale the Burrows mean."
)]
pub fn delta_distances(
    table: &FrequencyTable,
    measure: DistanceMeasure,
    reference: Option<&FrequencyTable>,
) -> Result<DistanceTable, StylometryError> {
    let features = table.feature_count();
    if features == 0 {
        return Err(StylometryError::NoFeatures);
    }
    let documents = table.documents();
    let stats = FeatureStats::of(table)?;
    let weights = eder_weights(features);
    match measure {
        DistanceMeasure::Burrows => distance_matrix(
            documents,
            &z_matrix(table, &stats),
            Metric::Manhattan {
                scale: features as f64,
            },
            &weights,
        ),
        DistanceMeasure::Quadratic => distance_matrix(
            documents,
            &z_matrix(table, &stats),
            Metric::SquaredEuclidean,
            &weights,
        ),
        DistanceMeasure::Eder => distance_matrix(
            documents,
            &z_matrix(table, &stats),
            Metric::WeightedManhattan,
            &weights,
        ),
        DistanceMeasure::CosineDelta => distance_matrix(
            documents,
            &z_matrix(table, &stats),
            Metric::Cosine,
            &weights,
        ),
        DistanceMeasure::CosineEder => distance_matrix(
            documents,
            &weighted(z_matrix(table, &stats), &weights),
            Metric::Cosine,
            &weights,
        ),
        DistanceMeasure::CosineBinary => distance_matrix(
            documents,
            &signs(z_matrix(table, &stats)),
            Metric::Cosine,
            &weights,
        ),
        DistanceMeasure::RotatedDelta => {
            let reference = reference.ok_or_else(|| StylometryError::ReferenceRequired {
                measure: measure.name().to_owned(),
            })?;
            distance_matrix(
                documents,
                &rotated_rows(table, reference)?,
                Metric::Euclidean,
                &weights,
            )
        }
    }
}
