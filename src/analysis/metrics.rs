//! Regression metrics for evaluating the fitted model.

use ndarray::Array1;
use serde::Serialize;

use super::regression::LinearModel;
use crate::error::{AnalysisError, Result};

/// Hold-out evaluation of a fitted model.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// R-squared; `None` when the targets have no variance
    pub r_squared: Option<f64>,
    /// Number of test samples
    pub n_samples: usize,
}

/// Mean Squared Error: (1/n) * Σ(y_true - y_pred)²
pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    if y_true.is_empty() {
        return Err(AnalysisError::Value("cannot evaluate an empty test set".into()));
    }
    if y_true.len() != y_pred.len() {
        return Err(AnalysisError::Value(format!(
            "{} targets but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    let sum: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).powi(2))
        .sum();
    Ok(sum / y_true.len() as f64)
}

/// R-squared (coefficient of determination): 1 - SS_res / SS_tot
pub fn r_squared(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Option<f64> {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return None;
    }
    let mean = y_true.sum() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|&t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return None;
    }
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).powi(2))
        .sum();
    Some(1.0 - ss_res / ss_tot)
}

/// Predict the test features and score against the held-out targets.
/// Returns the evaluation together with the predictions.
pub fn evaluate(
    model: &LinearModel,
    x_test: &ndarray::Array2<f64>,
    y_test: &Array1<f64>,
) -> Result<(Evaluation, Array1<f64>)> {
    if y_test.is_empty() {
        return Err(AnalysisError::Value("cannot evaluate an empty test set".into()));
    }
    let y_pred = model.predict(x_test)?;
    if let Some(row) = y_pred.iter().position(|p| !p.is_finite()) {
        return Err(AnalysisError::Numerical(format!(
            "prediction for test row {row} is {}",
            y_pred[row]
        )));
    }
    let mse = mean_squared_error(y_test, &y_pred)?;
    let evaluation = Evaluation {
        mse,
        rmse: mse.sqrt(),
        r_squared: r_squared(y_test, &y_pred),
        n_samples: y_test.len(),
    };
    Ok((evaluation, y_pred))
}
