//! Ordinary least squares.
//!
//! The fit centres and scales every feature, then solves the normal
//! equations through a symmetric eigendecomposition of the (correlation-like)
//! Gram matrix. Directions with a negligible eigenvalue are dropped, which
//! yields the minimum-norm least-squares solution: collinear features still
//! produce a usable model instead of a singular-matrix failure.

use ndarray::{Array1, Array2, Axis};
use serde::Serialize;

use super::metrics;
use crate::error::{AnalysisError, Result};

/// Eigenvalues below `RANK_TOLERANCE * largest` are treated as zero.
const RANK_TOLERANCE: f64 = 1e-12;

/// Maximum number of Jacobi sweeps.
const MAX_SWEEPS: usize = 100;

/// A fitted linear map `y = x · coefficients + intercept`.
#[derive(Debug, Clone, Serialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// R² on the training data.
    pub r_squared: Option<f64>,
    /// Number of independent directions actually used by the fit.
    pub rank: usize,
}

impl LinearModel {
    /// Fit by least squares. No regularisation.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, feature_names: &[String]) -> Result<Self> {
        let (n, p) = x.dim();
        if n != y.len() {
            return Err(AnalysisError::Value(format!(
                "feature rows ({n}) and targets ({}) differ",
                y.len()
            )));
        }
        if n == 0 || p == 0 {
            return Err(AnalysisError::Value("cannot fit an empty training set".into()));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(AnalysisError::Numerical(
                "training data contains non-finite values".into(),
            ));
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| AnalysisError::Numerical("cannot average features".into()))?;
        let y_mean = y.sum() / n as f64;

        let mut xs = x - &x_mean;
        let scale: Array1<f64> = xs
            .columns()
            .into_iter()
            .map(|c| {
                let norm = c.dot(&c).sqrt();
                // constant column: leave it at zero, it gets no weight
                if norm > 0.0 { norm } else { 1.0 }
            })
            .collect();
        xs /= &scale;
        let yc = y - y_mean;

        let gram = xs.t().dot(&xs);
        let rhs = xs.t().dot(&yc);
        let (eigenvalues, eigenvectors) = symmetric_eigen(&gram);

        let largest = eigenvalues.iter().cloned().fold(0.0, f64::max);
        let mut beta = Array1::<f64>::zeros(p);
        let mut rank = 0;
        for (k, &lambda) in eigenvalues.iter().enumerate() {
            if largest <= 0.0 || lambda <= RANK_TOLERANCE * largest {
                continue;
            }
            let v = eigenvectors.column(k);
            beta.scaled_add(v.dot(&rhs) / lambda, &v);
            rank += 1;
        }

        let coefficients = &beta / &scale;
        let intercept = y_mean - coefficients.dot(&x_mean);

        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(AnalysisError::Numerical(
                "least-squares solution is not finite".into(),
            ));
        }
        if rank < p {
            log::warn!("Features are collinear: fitted with rank {rank} of {p}");
        }

        let mut model = LinearModel {
            feature_names: feature_names.to_vec(),
            coefficients: coefficients.to_vec(),
            intercept,
            r_squared: None,
            rank,
        };
        model.r_squared = metrics::r_squared(y, &model.predict(x)?);
        Ok(model)
    }

    /// Predict one value per row of `x`.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coefficients.len() {
            return Err(AnalysisError::Value(format!(
                "expected {} features, got {}",
                self.coefficients.len(),
                x.ncols()
            )));
        }
        let coefficients = Array1::from(self.coefficients.clone());
        Ok(x.dot(&coefficients) + self.intercept)
    }
}

/// Eigendecomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns `(eigenvalues, eigenvectors)` with eigenvector `k` in column `k`,
/// so that `a = V diag(d) Vᵀ`.
pub fn symmetric_eigen(a: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut s = a.to_owned();
    let mut v = Array2::<f64>::eye(n);

    let scale = s.iter().map(|x| x * x).sum::<f64>().sqrt();
    let tol = f64::EPSILON * scale;

    for _sweep in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += s[[p, q]] * s[[p, q]];
            }
        }
        if off.sqrt() <= tol {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = s[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (s[[q, q]] - s[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let sn = t * c;

                // S' = Jᵀ S J, columns first, then rows
                for k in 0..n {
                    let skp = s[[k, p]];
                    let skq = s[[k, q]];
                    s[[k, p]] = c * skp - sn * skq;
                    s[[k, q]] = sn * skp + c * skq;
                }
                for k in 0..n {
                    let spk = s[[p, k]];
                    let sqk = s[[q, k]];
                    s[[p, k]] = c * spk - sn * sqk;
                    s[[q, k]] = sn * spk + c * sqk;
                }
                // V' = V J
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - sn * vkq;
                    v[[k, q]] = sn * vkp + c * vkq;
                }
            }
        }
    }

    (s.diag().to_owned(), v)
}
