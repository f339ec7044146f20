//! Numbers behind the exploratory charts.
//!
//! Everything here takes the cleaned table plus the row indices currently
//! visible in the viewer, so filtering re-runs the same computations.

use std::collections::BTreeMap;

use crate::data::cleaner::{vehicle_type_of, VehicleType};
use crate::data::model::{columns, VehicleTable};

/// Bins of the range histogram.
pub const HISTOGRAM_BINS: usize = 30;

/// Whiskers reach the furthest point within this many IQRs of the box.
const WHISKER_IQR: f64 = 1.5;

/// Five-number summary for one box of a box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
    pub count: usize,
}

/// One histogram bar covering `[start, end)` (the last bar is closed).
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Quantile with linear interpolation between closest ranks.
/// `sorted` must be ascending and non-empty.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let reach = WHISKER_IQR * (q3 - q1);
        let (lo_fence, hi_fence) = (q1 - reach, q3 + reach);

        let inside = sorted.iter().filter(|&&v| v >= lo_fence && v <= hi_fence);
        let lower_whisker = inside.clone().cloned().fold(f64::INFINITY, f64::min);
        let upper_whisker = inside.cloned().fold(f64::NEG_INFINITY, f64::max);
        let outliers = sorted
            .iter()
            .filter(|&&v| v < lo_fence || v > hi_fence)
            .copied()
            .collect();

        Some(BoxStats {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
            count: sorted.len(),
        })
    }
}

/// Equal-width histogram over the value range.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Numeric values of `column` for the given rows, skipping nulls.
pub fn numeric_values(table: &VehicleTable, rows: &[usize], column: &str) -> Vec<f64> {
    rows.iter()
        .filter_map(|&i| table.value(i, column).as_f64())
        .collect()
}

/// Electric range summaries per vehicle type.
pub fn range_by_vehicle_type(
    table: &VehicleTable,
    rows: &[usize],
) -> BTreeMap<VehicleType, BoxStats> {
    let mut groups: BTreeMap<VehicleType, Vec<f64>> = BTreeMap::new();
    for &i in rows {
        let (Some(kind), Some(range)) = (
            vehicle_type_of(table, i),
            table.value(i, columns::ELECTRIC_RANGE).as_f64(),
        ) else {
            continue;
        };
        groups.entry(kind).or_default().push(range);
    }
    groups
        .into_iter()
        .filter_map(|(kind, values)| BoxStats::from_values(&values).map(|b| (kind, b)))
        .collect()
}

/// Vehicle count per model year, ascending by year.
pub fn counts_by_model_year(table: &VehicleTable, rows: &[usize]) -> Vec<(i64, usize)> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &i in rows {
        if let Some(year) = table.value(i, columns::MODEL_YEAR).as_f64() {
            *counts.entry(year.round() as i64).or_default() += 1;
        }
    }
    counts.into_iter().collect()
}

/// `[Base MSRP, Electric Range]` points; rows without an MSRP are skipped.
pub fn range_vs_msrp(table: &VehicleTable, rows: &[usize]) -> Vec<[f64; 2]> {
    rows.iter()
        .filter_map(|&i| {
            let msrp = table.value(i, columns::BASE_MSRP).as_f64()?;
            let range = table.value(i, columns::ELECTRIC_RANGE).as_f64()?;
            Some([msrp, range])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::data::model::{CellValue, Record};

    #[test]
    fn quantiles_interpolate() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile(&v, 0.5), 2.5);
        assert_relative_eq!(quantile(&v, 0.25), 1.75);
        assert_relative_eq!(quantile(&v, 1.0), 4.0);
    }

    #[test]
    fn box_stats_split_outliers() {
        let mut values: Vec<f64> = (1..=9).map(f64::from).collect();
        values.push(100.0);
        let b = BoxStats::from_values(&values).unwrap();
        assert_relative_eq!(b.median, 5.5);
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.upper_whisker, 9.0);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.count, 10);
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..=330).map(f64::from).collect();
        let bins = histogram(&values, HISTOGRAM_BINS);
        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_relative_eq!(bins[0].start, 0.0);
        assert_relative_eq!(bins[29].end, 330.0);
        // max lands in the closed last bin
        assert!(bins[29].count > 0);
    }

    #[test]
    fn histogram_of_constant_values() {
        let bins = histogram(&[0.0, 0.0, 0.0], 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    fn table() -> VehicleTable {
        let data = [
            (2020, 200, Some(0), "BEV"),
            (2018, 25, None, "PHEV"),
            (2020, 250, Some(69900), "BEV"),
            (2023, 0, Some(0), "BEV"),
        ];
        let rows = data
            .iter()
            .map(|(year, range, msrp, kind)| {
                let mut r = Record::new();
                r.insert("Model Year".into(), CellValue::Integer(*year));
                r.insert("Electric Range".into(), CellValue::Integer(*range));
                r.insert(
                    "Base MSRP".into(),
                    msrp.map(CellValue::Integer).unwrap_or(CellValue::Null),
                );
                r.insert("Vehicle Type".into(), CellValue::String(kind.to_string()));
                r
            })
            .collect();
        VehicleTable::new(
            ["Model Year", "Electric Range", "Base MSRP", "Vehicle Type"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows,
        )
    }

    #[test]
    fn groups_and_counts_follow_visible_rows() {
        let t = table();
        let all: Vec<usize> = (0..t.len()).collect();

        let boxes = range_by_vehicle_type(&t, &all);
        assert_eq!(boxes[&VehicleType::Bev].count, 3);
        assert_eq!(boxes[&VehicleType::Phev].median, 25.0);

        assert_eq!(
            counts_by_model_year(&t, &all),
            vec![(2018, 1), (2020, 2), (2023, 1)]
        );
        assert_eq!(range_vs_msrp(&t, &all).len(), 3);

        let only_first = [0];
        assert_eq!(counts_by_model_year(&t, &only_first), vec![(2020, 1)]);
        assert!(!range_by_vehicle_type(&t, &only_first).contains_key(&VehicleType::Phev));
    }
}
