use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use clap::ValueEnum;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;

use crate::analysis::metrics::Evaluation;
use crate::analysis::regression::LinearModel;
use crate::analysis::Analysis;
use crate::data::cleaner::CleaningSummary;
use crate::data::model::{columns, ColumnInfo, VehicleTable};

/// Console summary format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Serializable report
// ---------------------------------------------------------------------------

/// Everything the console summary shows, in one serializable value.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub input: &'a Path,
    pub rows_loaded: usize,
    pub columns: &'a [ColumnInfo],
    pub head: HeadRows<'a>,
    pub cleaning: &'a CleaningSummary,
    pub vehicle_types: BTreeMap<String, usize>,
    pub regression_rows: usize,
    pub rows_without_msrp: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub seed: u64,
    pub model: &'a LinearModel,
    pub evaluation: &'a Evaluation,
}

impl<'a> Report<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        let mut vehicle_types = BTreeMap::new();
        for v in analysis.table.column(columns::VEHICLE_TYPE) {
            *vehicle_types.entry(v.to_string()).or_default() += 1;
        }
        Report {
            input: &analysis.config.input,
            rows_loaded: analysis.raw.rows,
            columns: &analysis.raw.info,
            head: HeadRows(&analysis.raw.head),
            cleaning: &analysis.cleaning,
            vehicle_types,
            regression_rows: analysis.dataset.n_samples(),
            rows_without_msrp: analysis.dataset.rows_skipped,
            train_rows: analysis.split.n_train(),
            test_rows: analysis.split.n_test(),
            seed: analysis.config.seed,
            model: &analysis.model,
            evaluation: &analysis.evaluation,
        }
    }
}

/// Table rows as JSON objects whose keys follow the table's column order.
#[derive(Debug, Clone, Copy)]
pub struct HeadRows<'a>(pub &'a VehicleTable);

struct OrderedRow<'a> {
    table: &'a VehicleTable,
    row: usize,
}

impl Serialize for HeadRows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for row in 0..self.0.len() {
            seq.serialize_element(&OrderedRow { table: self.0, row })?;
        }
        seq.end()
    }
}

impl Serialize for OrderedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.columns.len()))?;
        for name in &self.table.columns {
            map.serialize_entry(name, self.table.value(self.row, name))?;
        }
        map.end()
    }
}

/// Render the summary in the requested format.
pub fn render(analysis: &Analysis, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(analysis)),
        ReportFormat::Json => serde_json::to_string_pretty(&Report::new(analysis)),
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

/// Human-readable summary: info, head, cleaning, model and MSE.
pub fn render_text(analysis: &Analysis) -> String {
    let report = Report::new(analysis);
    let mut out = String::new();

    let _ = writeln!(out, "Dataset Info:");
    out.push_str(&format_info(report.rows_loaded, report.columns));

    let _ = writeln!(out, "\nDataset Head:");
    out.push_str(&format_table(&analysis.raw.head));

    let c = report.cleaning;
    let _ = writeln!(out, "\nCleaning:");
    let _ = writeln!(out, "  rows kept:            {} of {}", c.rows_out(), c.rows_in);
    let _ = writeln!(out, "  cells coerced to NaN: {}", c.cells_coerced_to_null);
    for (kind, count) in &report.vehicle_types {
        let _ = writeln!(out, "  {kind:<5}                {count}");
    }

    let _ = writeln!(
        out,
        "\nRegression ({} ~ {}):",
        columns::ELECTRIC_RANGE,
        report.model.feature_names.join(" + ")
    );
    let _ = writeln!(
        out,
        "  rows: {} ({} without {} left out), train {}, test {}, seed {}",
        report.regression_rows,
        report.rows_without_msrp,
        columns::BASE_MSRP,
        report.train_rows,
        report.test_rows,
        report.seed
    );
    let _ = writeln!(out, "  intercept: {:>14.6}", report.model.intercept);
    for (name, coef) in report.model.feature_names.iter().zip(&report.model.coefficients) {
        let _ = writeln!(out, "  {name:<10} {coef:>14.6}");
    }
    if let Some(r2) = report.model.r_squared {
        let _ = writeln!(out, "  train R²:  {r2:>14.6}");
    }
    if let Some(r2) = report.evaluation.r_squared {
        let _ = writeln!(out, "  test R²:   {r2:>14.6}");
    }

    let _ = writeln!(out, "\nMean Squared Error (MSE): {}", report.evaluation.mse);
    out
}

/// `DataFrame.info()`-style column listing.
fn format_info(rows: usize, info: &[ColumnInfo]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{rows} entries");
    let _ = writeln!(out, "Data columns (total {} columns):", info.len());

    let width = info
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Column".len());
    let _ = writeln!(out, " #   {:<width$}  Non-Null Count  Dtype", "Column");
    let _ = writeln!(out, "---  {:<width$}  --------------  -----", "------");
    for (i, c) in info.iter().enumerate() {
        let count = format!("{} non-null", c.non_null);
        let _ = writeln!(out, " {i:<3} {:<width$}  {count:<14}  {}", c.name, c.dtype);
    }
    out
}

/// Plain aligned table with a leading row index.
pub fn format_table(table: &VehicleTable) -> String {
    let cells: Vec<Vec<String>> = (0..table.len())
        .map(|i| {
            table
                .columns
                .iter()
                .map(|c| table.value(i, c).to_string())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(j, name)| {
            cells
                .iter()
                .map(|row| row[j].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let index_width = table.len().saturating_sub(1).to_string().len();

    let mut out = String::new();
    let _ = write!(out, "{:index_width$}", "");
    for (name, w) in table.columns.iter().zip(&widths) {
        let _ = write!(out, "  {name:>w$}");
    }
    out.push('\n');
    for (i, row) in cells.iter().enumerate() {
        let _ = write!(out, "{i:<index_width$}");
        for (cell, w) in row.iter().zip(&widths) {
            let _ = write!(out, "  {cell:>w$}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, AnalysisConfig};
    use crate::data::model::{CellValue, Record};

    fn analysis() -> Analysis {
        let rows = (0..10)
            .map(|i| {
                let mut r = Record::new();
                r.insert("Electric Range".into(), CellValue::Integer(100 + 50 * i));
                r.insert("Model Year".into(), CellValue::Integer(2020 + i));
                r.insert("Base MSRP".into(), CellValue::Integer(30000 + 5000 * i));
                r.insert(
                    "Electric Vehicle Type".into(),
                    CellValue::String(if i % 3 == 0 {
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
        analyze(table, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn text_report_has_every_section() {
        let text = render_text(&analysis());
        assert!(text.contains("Dataset Info:"));
        assert!(text.contains("10 entries"));
        assert!(text.contains("Dataset Head:"));
        assert!(text.contains("Mean Squared Error (MSE):"));
        assert!(text.contains("Base MSRP"));
        assert!(text.contains("PHEV"));
    }

    #[test]
    fn json_report_parses_back() {
        let json = render(&analysis(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rows_loaded"], 10);
        assert_eq!(value["train_rows"], 8);
        assert_eq!(value["test_rows"], 2);
        assert_eq!(value["vehicle_types"]["PHEV"], 4);
        assert!(value["evaluation"]["mse"].as_f64().unwrap() >= 0.0);
        assert_eq!(value["head"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn json_head_keeps_header_order() {
        let json = render(&analysis(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = value["head"][0]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            ["Electric Range", "Model Year", "Base MSRP", "Electric Vehicle Type"]
        );
        assert_eq!(value["head"][0]["Model Year"], 2020);
    }

    #[test]
    fn table_aligns_columns() {
        let mut r = Record::new();
        r.insert("a".into(), CellValue::Integer(12345));
        r.insert("bb".into(), CellValue::Null);
        let t = VehicleTable::new(vec!["a".into(), "bb".into()], vec![r]);
        let text = format_table(&t);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), lines[1].len());
        assert!(lines[1].ends_with("NaN"));
    }
}
