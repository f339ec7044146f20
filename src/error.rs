use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// AnalysisError – every way the pipeline can abort
// ---------------------------------------------------------------------------

/// Errors raised by the load → clean → split → fit → evaluate pipeline.
///
/// Per-cell numeric coercion never produces one of these; unparsable cells
/// become [`CellValue::Null`](crate::data::model::CellValue::Null) instead.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The input file is missing or unreadable.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid tabular data for its format.
    #[error("malformed input: {0}")]
    Parse(String),

    /// A required column is absent (or has an unusable type).
    #[error("schema error: {0}")]
    Schema(String),

    /// An argument or partition is out of its valid range.
    #[error("invalid value: {0}")]
    Value(String),

    /// The least-squares problem produced non-finite numbers.
    #[error("numerical error: {0}")]
    Numerical(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn missing_column(name: &str) -> Self {
        AnalysisError::Schema(format!("missing required column '{name}'"))
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        AnalysisError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Parse(err.to_string())
    }
}

impl From<parquet::errors::ParquetError> for AnalysisError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        AnalysisError::Parse(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for AnalysisError {
    fn from(err: arrow::error::ArrowError) -> Self {
        AnalysisError::Parse(err.to_string())
    }
}
