//! Symmetric eigendecomposition for small dense matrices.

const MAX_SWEEPS: usize = 100;
const TOLERANCE: f64 = 1e-12;

/// Eigenvalues and unit eigenvectors of a symmetric matrix.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Eigen {
    /// Eigenvalues in descending order.
    pub(crate) values: Vec<f64>,
    /// `vectors[k]` belongs to `values[k]`.
    pub(crate) vectors: Vec<Vec<f64>>,
}

#[expect(
    clippy::float_arithmetic,
    reason = "Frobenius norm of the off-diagonal part."
)]
fn off_diagonal_norm(matrix: &[Vec<f64>]) -> f64 {
    let mut sum = 0.0;
    for (i, row) in matrix.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            if i != j {
                sum += value * value;
            }
        }
    }
    sum.sqrt()
}

/// Cyclic Jacobi eigendecomposition of the symmetric `matrix`.
///
/// Only the upper triangle drives the rotations; the input is assumed to be
/// symmetric and square.
#[expect(
    clippy::float_arithmetic,
    clippy::indexing_slicing,
    reason = "Jacobi rotations operate in place on a square matrix."
)]
pub(crate) fn symmetric_eigen(matrix: &[Vec<f64>]) -> Eigen {
    let n = matrix.len();
    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, value| acc.max(value.abs()))
        .max(1.0);
    for _ in 0..MAX_SWEEPS {
        if off_diagonal_norm(&a) <= TOLERANCE * scale {
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p][q];
                if apq.abs() <= f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + theta.mul_add(theta, 1.0).sqrt());
                let t = if theta == 0.0 { 1.0 } else { t };
                let c = 1.0 / t.mul_add(t, 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[k][p];
                    let akq = a[k][q];
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[p][k];
                    let aqk = a[q][k];
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in &mut v {
                    let vkp = row[p];
                    let vkq = row[q];
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&x, &y| a[y][y].total_cmp(&a[x][x]));
    Eigen {
        values: order.iter().map(|&k| a[k][k]).collect(),
        vectors: order
            .iter()
            .map(|&k| v.iter().map(|row| row[k]).collect())
            .collect(),
    }
}
