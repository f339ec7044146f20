use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::dataset::Dataset;
use crate::error::{AnalysisError, Result};

/// Row-aligned train/test partitions of a [`Dataset`].
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    /// Sample indices (into the dataset) of each partition.
    pub train_idx: Vec<usize>,
    pub test_idx: Vec<usize>,
}

impl Split {
    pub fn n_train(&self) -> usize {
        self.train_idx.len()
    }

    pub fn n_test(&self) -> usize {
        self.test_idx.len()
    }
}

/// Number of test samples for `n` rows: `ceil(test_size * n)`.
pub fn test_count(n: usize, test_size: f64) -> usize {
    (test_size * n as f64).ceil() as usize
}

/// Shuffle the samples with a seeded RNG, then cut off the first
/// `ceil(test_size * n)` as the test set.
///
/// The same dataset, fraction and seed always give the same partition.
pub fn train_test_split(data: &Dataset, test_size: f64, seed: u64) -> Result<Split> {
    let n = data.n_samples();
    if n < 2 {
        return Err(AnalysisError::Value(format!(
            "need at least 2 samples to split, got {n}"
        )));
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(AnalysisError::Value(format!(
            "test size must be in (0, 1), got {test_size}"
        )));
    }

    let n_test = test_count(n, test_size);
    if n_test >= n {
        return Err(AnalysisError::Value(format!(
            "test size {test_size} leaves no training samples out of {n}"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train_idx = order.split_off(n_test);
    let test_idx = order;

    log::debug!(
        "Split {n} samples: {} train, {} test (seed {seed})",
        train_idx.len(),
        test_idx.len()
    );

    Ok(Split {
        x_train: data.x.select(Axis(0), &train_idx),
        x_test: data.x.select(Axis(0), &test_idx),
        y_train: data.y.select(Axis(0), &train_idx),
        y_test: data.y.select(Axis(0), &test_idx),
        train_idx,
        test_idx,
    })
}
