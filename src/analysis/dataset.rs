use clap::ValueEnum;
use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::data::model::{columns, VehicleTable};
use crate::error::{AnalysisError, Result};

/// Regression features, in column order of the feature matrix.
pub const FEATURES: [&str; 2] = [columns::MODEL_YEAR, columns::BASE_MSRP];

/// Regression target.
pub const TARGET: &str = columns::ELECTRIC_RANGE;

/// What to do with cleaned rows whose `Base MSRP` is null.
///
/// The cleaner keeps these rows (they still feed the charts); the
/// regression cannot use them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingFeaturePolicy {
    /// Leave the rows out of the regression.
    #[default]
    Drop,
    /// Abort the run.
    Fail,
}

/// Feature matrix and target vector ready for fitting.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// n_samples x n_features
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    /// Row index in the cleaned table for each sample.
    pub rows: Vec<usize>,
    pub feature_names: Vec<String>,
    /// Rows skipped because a feature was null.
    pub rows_skipped: usize,
}

impl Dataset {
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

/// Build the regression dataset from a cleaned table.
///
/// `Model Year` must be numeric in every row. A null feature is handled by
/// `policy`; any other non-numeric feature or target is a schema error.
pub fn assemble(table: &VehicleTable, policy: MissingFeaturePolicy) -> Result<Dataset> {
    for col in FEATURES.iter().chain(std::iter::once(&TARGET)) {
        if !table.has_column(col) {
            return Err(AnalysisError::missing_column(col));
        }
    }

    let mut values = Vec::with_capacity(table.len() * FEATURES.len());
    let mut targets = Vec::with_capacity(table.len());
    let mut rows = Vec::with_capacity(table.len());
    let mut skipped = 0;

    'rows: for i in 0..table.len() {
        let mut features = [0.0; FEATURES.len()];
        for (slot, col) in features.iter_mut().zip(FEATURES) {
            let cell = table.value(i, col);
            match cell.as_f64() {
                Some(v) => *slot = v,
                None if cell.is_null() => match policy {
                    MissingFeaturePolicy::Drop => {
                        skipped += 1;
                        continue 'rows;
                    }
                    MissingFeaturePolicy::Fail => {
                        return Err(AnalysisError::Value(format!(
                            "row {i} has no '{col}' value"
                        )));
                    }
                },
                None => {
                    return Err(AnalysisError::Schema(format!(
                        "'{col}' must be numeric, found '{cell}' in row {i}"
                    )));
                }
            }
        }
        let target = table.value(i, TARGET);
        let y = target.as_f64().ok_or_else(|| {
            AnalysisError::Schema(format!(
                "'{TARGET}' must be numeric, found '{target}' in row {i}"
            ))
        })?;

        values.extend_from_slice(&features);
        targets.push(y);
        rows.push(i);
    }

    if skipped > 0 {
        log::warn!(
            "{skipped} rows without a '{}' value left out of the regression",
            columns::BASE_MSRP
        );
    }

    let x = Array2::from_shape_vec((rows.len(), FEATURES.len()), values)
        .map_err(|e| AnalysisError::Value(e.to_string()))?;

    Ok(Dataset {
        x,
        y: Array1::from(targets),
        rows,
        feature_names: FEATURES.iter().map(|s| s.to_string()).collect(),
        rows_skipped: skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Record};

    fn table(msrp: &[CellValue]) -> VehicleTable {
        let rows = msrp
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let mut r = Record::new();
                r.insert("Model Year".into(), CellValue::Integer(2015 + i as i64));
                r.insert("Base MSRP".into(), m.clone());
                r.insert("Electric Range".into(), CellValue::Integer(100 + i as i64));
                r
            })
            .collect();
        VehicleTable::new(
            vec!["Model Year".into(), "Base MSRP".into(), "Electric Range".into()],
            rows,
        )
    }

    #[test]
    fn builds_row_aligned_matrix() {
        let t = table(&[CellValue::Integer(30000), CellValue::Float(45000.5)]);
        let d = assemble(&t, MissingFeaturePolicy::Drop).unwrap();
        assert_eq!(d.n_samples(), 2);
        assert_eq!(d.n_features(), 2);
        assert_eq!(d.x[[1, 0]], 2016.0);
        assert_eq!(d.x[[1, 1]], 45000.5);
        assert_eq!(d.y[1], 101.0);
        assert_eq!(d.rows, vec![0, 1]);
    }

    #[test]
    fn null_msrp_follows_policy() {
        let t = table(&[CellValue::Null, CellValue::Integer(0), CellValue::Null]);

        let d = assemble(&t, MissingFeaturePolicy::Drop).unwrap();
        assert_eq!(d.rows, vec![1]);
        assert_eq!(d.rows_skipped, 2);

        let err = assemble(&t, MissingFeaturePolicy::Fail).unwrap_err();
        assert!(matches!(err, AnalysisError::Value(_)));
    }

    #[test]
    fn text_feature_is_schema_error() {
        let mut t = table(&[CellValue::Integer(0)]);
        t.rows[0].insert("Model Year".into(), CellValue::String("twenty".into()));
        let err = assemble(&t, MissingFeaturePolicy::Drop).unwrap_err();
        assert!(matches!(err, AnalysisError::Schema(_)));
    }
}
