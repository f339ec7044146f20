use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::analysis::charts::{self, BoxStats, HistogramBin, HISTOGRAM_BINS};
use crate::analysis::{self, Analysis};
use crate::color::ColorMap;
use crate::data::cleaner::VehicleType;
use crate::data::filter::{filtered_indices, init_filter_state, FilterState};
use crate::data::model::{columns, CellValue};

/// Columns offered as filters in the side panel.
pub const FILTER_COLUMNS: [&str; 2] = [columns::VEHICLE_TYPE, columns::MODEL_YEAR];

// ---------------------------------------------------------------------------
// Chart selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartTab {
    RangeByType,
    RangeHistogram,
    CountByYear,
    RangeVsMsrp,
    TrueVsPredicted,
    Data,
}

impl ChartTab {
    pub const ALL: [ChartTab; 6] = [
        ChartTab::RangeByType,
        ChartTab::RangeHistogram,
        ChartTab::CountByYear,
        ChartTab::RangeVsMsrp,
        ChartTab::TrueVsPredicted,
        ChartTab::Data,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartTab::RangeByType => "Electric Range by Vehicle Type",
            ChartTab::RangeHistogram => "Distribution of Electric Range",
            ChartTab::CountByYear => "Count of Vehicles by Model Year",
            ChartTab::RangeVsMsrp => "Electric Range vs Base MSRP",
            ChartTab::TrueVsPredicted => "True vs Predicted Electric Range",
            ChartTab::Data => "Data",
        }
    }
}

// ---------------------------------------------------------------------------
// Cached chart inputs
// ---------------------------------------------------------------------------

/// Chart data for the currently visible rows.
#[derive(Debug, Clone, Default)]
pub struct ChartData {
    pub range_boxes: BTreeMap<VehicleType, BoxStats>,
    pub range_histogram: Vec<HistogramBin>,
    pub year_counts: Vec<(i64, usize)>,
    /// `[msrp, range]` per vehicle type.
    pub msrp_points: BTreeMap<VehicleType, Vec<[f64; 2]>>,
    /// `[true, predicted]` for visible test rows.
    pub prediction_points: Vec<[f64; 2]>,
}

impl ChartData {
    pub fn compute(analysis: &Analysis, visible: &[usize]) -> Self {
        let table = &analysis.table;

        let mut msrp_points: BTreeMap<VehicleType, Vec<[f64; 2]>> = BTreeMap::new();
        for kind in [VehicleType::Bev, VehicleType::Phev] {
            let rows: Vec<usize> = visible
                .iter()
                .copied()
                .filter(|&i| crate::data::cleaner::vehicle_type_of(table, i) == Some(kind))
                .collect();
            let points = charts::range_vs_msrp(table, &rows);
            if !points.is_empty() {
                msrp_points.insert(kind, points);
            }
        }

        let shown: BTreeSet<usize> = visible.iter().copied().collect();
        let prediction_points = analysis
            .test_rows()
            .into_iter()
            .enumerate()
            .filter(|(_, row)| shown.contains(row))
            .map(|(pos, _)| [analysis.split.y_test[pos], analysis.predictions[pos]])
            .collect();

        ChartData {
            range_boxes: charts::range_by_vehicle_type(table, visible),
            range_histogram: charts::histogram(
                &charts::numeric_values(table, visible, columns::ELECTRIC_RANGE),
                HISTOGRAM_BINS,
            ),
            year_counts: charts::counts_by_model_year(table, visible),
            msrp_points,
            prediction_points,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Result of the last successful run.
    pub analysis: Option<Analysis>,

    /// Per-column filter selections.
    pub filters: FilterState,

    /// Indices of cleaned rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Chart inputs for `visible_indices` (cached).
    pub charts: ChartData,

    /// Colours per vehicle type.
    pub color_map: Option<ColorMap>,

    /// Which chart the central panel shows.
    pub tab: ChartTab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            analysis: None,
            filters: FilterState::default(),
            visible_indices: Vec::new(),
            charts: ChartData::default(),
            color_map: None,
            tab: ChartTab::RangeByType,
            status_message: None,
        }
    }
}

impl AppState {
    pub fn new(analysis: Analysis) -> Self {
        let mut state = Self::default();
        state.set_analysis(analysis);
        state
    }

    /// Ingest a finished run, initialise filters and colours.
    pub fn set_analysis(&mut self, analysis: Analysis) {
        let table = &analysis.table;
        self.filters = init_filter_state(table, &FILTER_COLUMNS);
        self.visible_indices = (0..table.len()).collect();
        self.color_map = Some(ColorMap::new(
            columns::VEHICLE_TYPE,
            &table.unique_values(columns::VEHICLE_TYPE),
        ));
        self.charts = ChartData::compute(&analysis, &self.visible_indices);
        self.analysis = Some(analysis);
        self.status_message = None;
    }

    /// Re-run the pipeline on another file with the same settings.
    pub fn reload(&mut self, path: PathBuf) {
        let mut config = self
            .analysis
            .as_ref()
            .map(|a| a.config.clone())
            .unwrap_or_default();
        config.input = path;

        match analysis::run(&config) {
            Ok(analysis) => {
                log::info!(
                    "Reloaded {}: {} rows, MSE {}",
                    config.input.display(),
                    analysis.table.len(),
                    analysis.evaluation.mse
                );
                self.set_analysis(analysis);
            }
            Err(e) => {
                log::error!("Failed to analyse {}: {e}", config.input.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Recompute `visible_indices` and the chart data after a filter change.
    pub fn refilter(&mut self) {
        if let Some(analysis) = &self.analysis {
            self.visible_indices = filtered_indices(&analysis.table, &self.filters);
            self.charts = ChartData::compute(analysis, &self.visible_indices);
        }
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let selected = self.filters.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: &str) {
        if let Some(analysis) = &self.analysis {
            let all_vals = analysis.table.unique_values(column);
            self.filters.insert(column.to_string(), all_vals);
            self.refilter();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: &str) {
        self.filters.insert(column.to_string(), BTreeSet::new());
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, AnalysisConfig};
    use crate::data::model::{Record, VehicleTable};

    fn state() -> AppState {
        let rows = (0..20)
            .map(|i| {
                let mut r = Record::new();
                r.insert("Electric Range".into(), CellValue::Integer(20 + 13 * i));
                r.insert("Model Year".into(), CellValue::Integer(2015 + i % 6));
                r.insert("Base MSRP".into(), CellValue::Integer(30000 + 700 * (i % 7)));
                r.insert(
                    "Electric Vehicle Type".into(),
                    CellValue::String(if i % 4 == 0 {
                        "Plug-in Hybrid Electric Vehicle (PHEV)".into()
                    } else {
                        "Battery Electric Vehicle (BEV)".into()
                    }),
                );
                r
            })
            .collect();
        let table = VehicleTable::new(
            ["Electric Range", "Model Year", "Base MSRP", "Electric Vehicle Type"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows,
        );
        AppState::new(analyze(table, &AnalysisConfig::default()).unwrap())
    }

    #[test]
    fn starts_with_everything_visible() {
        let s = state();
        assert_eq!(s.visible_indices.len(), 20);
        assert_eq!(s.charts.range_boxes.len(), 2);
        assert_eq!(s.charts.prediction_points.len(), 4);
        let binned: usize = s.charts.range_histogram.iter().map(|b| b.count).sum();
        assert_eq!(binned, 20);
    }

    #[test]
    fn filtering_updates_charts() {
        let mut s = state();
        s.toggle_filter_value("Vehicle Type", &CellValue::String("PHEV".into()));
        assert_eq!(s.visible_indices.len(), 15);
        assert!(!s.charts.range_boxes.contains_key(&VehicleType::Phev));
        assert!(!s.charts.msrp_points.contains_key(&VehicleType::Phev));

        s.select_none("Model Year");
        assert!(s.visible_indices.is_empty());
        assert!(s.charts.prediction_points.is_empty());

        s.select_all("Model Year");
        s.select_all("Vehicle Type");
        assert_eq!(s.visible_indices.len(), 20);
    }

    #[test]
    fn failed_reload_keeps_previous_run() {
        let mut s = state();
        s.reload(PathBuf::from("/definitely/not/here.csv"));
        assert!(s.status_message.is_some());
        assert_eq!(s.analysis.as_ref().map(|a| a.table.len()), Some(20));
    }
}
