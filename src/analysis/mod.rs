/// Analysis layer: the regression pipeline over a cleaned table.
///
/// ```text
///   VehicleTable (cleaned)
///        │
///        ▼
///   ┌──────────┐
///   │ dataset   │  features [Model Year, Base MSRP] → x, Electric Range → y
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  split    │  seeded shuffle, cut ceil(test_size · n) test rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐     ┌──────────┐
///   │regression │ ──▶ │ metrics   │  MSE on the held-out rows
///   └──────────┘     └──────────┘
/// ```
pub mod charts;
pub mod dataset;
pub mod metrics;
pub mod regression;
pub mod split;

use std::path::PathBuf;

use ndarray::Array1;
use serde::Serialize;

use crate::data::cleaner::{self, CleaningSummary};
use crate::data::loader;
use crate::data::model::{ColumnInfo, VehicleTable};
use crate::error::{AnalysisError, Result};
use dataset::{Dataset, MissingFeaturePolicy};
use metrics::Evaluation;
use regression::LinearModel;
use split::Split;

pub const DEFAULT_INPUT: &str = "sample_data/Electric_Vehicle_Population_Data.csv";
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_HEAD_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Everything one run needs to know.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub test_size: f64,
    pub seed: u64,
    pub missing_msrp: MissingFeaturePolicy,
    /// Rows shown by the head preview.
    pub head_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SEED,
            missing_msrp: MissingFeaturePolicy::default(),
            head_rows: DEFAULT_HEAD_ROWS,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Snapshot of the table as loaded, before cleaning.
#[derive(Debug, Clone)]
pub struct RawOverview {
    pub rows: usize,
    pub info: Vec<ColumnInfo>,
    /// The first `head_rows` rows, same columns.
    pub head: VehicleTable,
}

impl RawOverview {
    pub fn of(table: &VehicleTable, head_rows: usize) -> Self {
        Self {
            rows: table.len(),
            info: table.column_info(),
            head: VehicleTable::new(
                table.columns.clone(),
                table.rows.iter().take(head_rows).cloned().collect(),
            ),
        }
    }
}

/// Output of one full run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub config: AnalysisConfig,
    pub raw: RawOverview,
    pub cleaning: CleaningSummary,
    /// The cleaned table, including the derived `Vehicle Type`.
    pub table: VehicleTable,
    pub dataset: Dataset,
    pub split: Split,
    pub model: LinearModel,
    pub evaluation: Evaluation,
    /// Predictions for `split.x_test`, row-aligned with `split.y_test`.
    pub predictions: Array1<f64>,
}

impl Analysis {
    /// Cleaned-table row index of each test sample.
    pub fn test_rows(&self) -> Vec<usize> {
        self.split
            .test_idx
            .iter()
            .map(|&i| self.dataset.rows[i])
            .collect()
    }
}

/// Load `config.input` and run the whole pipeline on it.
pub fn run(config: &AnalysisConfig) -> Result<Analysis> {
    let table = loader::load_file(&config.input)?;
    analyze(table, config)
}

/// Clean → assemble → split → fit → evaluate.
pub fn analyze(mut table: VehicleTable, config: &AnalysisConfig) -> Result<Analysis> {
    let raw = RawOverview::of(&table, config.head_rows);

    let cleaning = cleaner::clean(&mut table)?;
    if table.is_empty() {
        return Err(AnalysisError::Value(format!(
            "no rows left after cleaning ({} loaded)",
            cleaning.rows_in
        )));
    }
    let dataset = dataset::assemble(&table, config.missing_msrp)?;
    let split = split::train_test_split(&dataset, config.test_size, config.seed)?;

    let model = LinearModel::fit(&split.x_train, &split.y_train, &dataset.feature_names)?;
    log::info!(
        "Fitted {} train rows: coefficients {:?}, intercept {:.4}",
        split.n_train(),
        model.coefficients,
        model.intercept
    );

    let (evaluation, predictions) = metrics::evaluate(&model, &split.x_test, &split.y_test)?;
    log::info!("Test MSE over {} rows: {}", evaluation.n_samples, evaluation.mse);

    Ok(Analysis {
        config: config.clone(),
        raw,
        cleaning,
        table,
        dataset,
        split,
        model,
        evaluation,
        predictions,
    })
}
