use std::path::PathBuf;

use clap::Parser;

use crate::analysis::dataset::MissingFeaturePolicy;
use crate::analysis::{
    AnalysisConfig, DEFAULT_HEAD_ROWS, DEFAULT_INPUT, DEFAULT_SEED, DEFAULT_TEST_SIZE,
};
use crate::report::ReportFormat;

/// Command line of the `ev-range` binary.
#[derive(Parser, Debug)]
#[command(
    name = "ev-range",
    version,
    about = "Clean EV population data, chart it, and regress electric range on model year and MSRP."
)]
pub struct Cli {
    /// CSV (or .json / .parquet) file with the EV population data
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Fraction of rows held out for evaluation, in (0, 1)
    #[arg(long, default_value_t = DEFAULT_TEST_SIZE)]
    pub test_size: f64,

    /// Seed of the train/test shuffle
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// What to do with rows that have no Base MSRP
    #[arg(long, value_enum, default_value_t = MissingFeaturePolicy::Drop)]
    pub missing_msrp: MissingFeaturePolicy,

    /// Rows shown in the head preview
    #[arg(long, default_value_t = DEFAULT_HEAD_ROWS)]
    pub head: usize,

    /// Console summary format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Do not open the chart window
    #[arg(long)]
    pub no_plots: bool,
}

impl Cli {
    pub fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            input: self.input.clone(),
            test_size: self.test_size,
            seed: self.seed,
            missing_msrp: self.missing_msrp,
            head_rows: self.head,
        }
    }
}
