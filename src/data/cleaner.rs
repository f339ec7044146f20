use serde::Serialize;

use super::model::{columns, CellValue, VehicleTable};
use crate::error::{AnalysisError, Result};

/// Substring that marks a battery-only vehicle.
const BEV_MARKER: &str = "Battery Electric Vehicle";

const NUMERIC_COLUMNS: [&str; 2] = [columns::ELECTRIC_RANGE, columns::BASE_MSRP];

const REQUIRED_NON_NULL: [&str; 3] = [
    columns::ELECTRIC_RANGE,
    columns::MODEL_YEAR,
    columns::ELECTRIC_VEHICLE_TYPE,
];

// ---------------------------------------------------------------------------
// Vehicle type
// ---------------------------------------------------------------------------

/// Category derived from the free-text `Electric Vehicle Type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum VehicleType {
    #[serde(rename = "BEV")]
    Bev,
    #[serde(rename = "PHEV")]
    Phev,
}

impl VehicleType {
    /// `Bev` iff the description contains "Battery Electric Vehicle".
    pub fn classify(description: &str) -> Self {
        if description.contains(BEV_MARKER) {
            VehicleType::Bev
        } else {
            VehicleType::Phev
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleType::Bev => "BEV",
            VehicleType::Phev => "PHEV",
        }
    }
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

/// What the cleaner did to the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningSummary {
    pub rows_in: usize,
    pub rows_dropped: usize,
    /// Non-null cells that failed numeric coercion and became null.
    pub cells_coerced_to_null: usize,
}

impl CleaningSummary {
    pub fn rows_out(&self) -> usize {
        self.rows_in - self.rows_dropped
    }
}

/// Clean `table` in place:
///
/// 1. coerce `Electric Range` and `Base MSRP` to numbers (unparsable → null),
/// 2. drop rows with a null `Electric Range`, `Model Year` or
///    `Electric Vehicle Type`,
/// 3. add the derived `Vehicle Type` column (`BEV` / `PHEV`).
///
/// Fails only when one of the four required columns is missing.
pub fn clean(table: &mut VehicleTable) -> Result<CleaningSummary> {
    for col in NUMERIC_COLUMNS.iter().chain(REQUIRED_NON_NULL.iter()) {
        if !table.has_column(col) {
            return Err(AnalysisError::missing_column(col));
        }
    }

    let mut summary = CleaningSummary {
        rows_in: table.len(),
        ..Default::default()
    };

    for row in &mut table.rows {
        for col in NUMERIC_COLUMNS {
            let coerced = row.get(col).map(CellValue::to_numeric).unwrap_or(CellValue::Null);
            if coerced.is_null() && row.get(col).is_some_and(|v| !v.is_null()) {
                summary.cells_coerced_to_null += 1;
            }
            row.insert(col.to_string(), coerced);
        }
    }

    table.rows.retain(|row| {
        REQUIRED_NON_NULL
            .iter()
            .all(|col| row.get(*col).is_some_and(|v| !v.is_null()))
    });
    summary.rows_dropped = summary.rows_in - table.len();

    for row in &mut table.rows {
        // the retain above guarantees a non-null description
        let description = row
            .get(columns::ELECTRIC_VEHICLE_TYPE)
            .map(|v| match v {
                CellValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        let kind = VehicleType::classify(&description);
        row.insert(
            columns::VEHICLE_TYPE.to_string(),
            CellValue::String(kind.label().to_string()),
        );
    }
    table.add_column(columns::VEHICLE_TYPE);

    if summary.cells_coerced_to_null > 0 {
        log::warn!(
            "{} non-numeric cells in {:?} coerced to null",
            summary.cells_coerced_to_null,
            NUMERIC_COLUMNS
        );
    }
    log::info!(
        "Cleaning kept {} of {} rows ({} dropped)",
        summary.rows_out(),
        summary.rows_in,
        summary.rows_dropped
    );

    Ok(summary)
}

/// Vehicle type of a cleaned row, read back from the derived column.
pub fn vehicle_type_of(table: &VehicleTable, row: usize) -> Option<VehicleType> {
    match table.value(row, columns::VEHICLE_TYPE).as_str()? {
        "BEV" => Some(VehicleType::Bev),
        "PHEV" => Some(VehicleType::Phev),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::Record;

    fn header() -> Vec<String> {
        [
            "VIN (1-10)",
            "Model Year",
            "Electric Vehicle Type",
            "Electric Range",
            "Base MSRP",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn row(year: CellValue, kind: CellValue, range: CellValue, msrp: CellValue) -> Record {
        let mut r = Record::new();
        r.insert("VIN (1-10)".into(), CellValue::String("5YJ3E1EA".into()));
        r.insert("Model Year".into(), year);
        r.insert("Electric Vehicle Type".into(), kind);
        r.insert("Electric Range".into(), range);
        r.insert("Base MSRP".into(), msrp);
        r
    }

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn na_range_is_coerced_then_dropped() {
        let mut table = VehicleTable::new(
            header(),
            vec![
                row(
                    CellValue::Integer(2020),
                    s("Battery Electric Vehicle (BEV)"),
                    s("N/A"),
                    CellValue::Integer(0),
                ),
                row(
                    CellValue::Integer(2021),
                    s("Battery Electric Vehicle (BEV)"),
                    CellValue::Integer(291),
                    CellValue::Integer(0),
                ),
            ],
        );

        let summary = clean(&mut table).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(*table.value(0, "Electric Range"), CellValue::Integer(291));
        assert_eq!(summary.rows_dropped, 1);
        assert_eq!(summary.cells_coerced_to_null, 1);
    }

    #[test]
    fn adds_vehicle_type_column() {
        let mut table = VehicleTable::new(
            header(),
            vec![
                row(
                    CellValue::Integer(2018),
                    s("Plug-in Hybrid Electric Vehicle (PHEV)"),
                    CellValue::Integer(25),
                    s("bad"),
                ),
                row(
                    CellValue::Integer(2022),
                    s("Battery Electric Vehicle (BEV)"),
                    CellValue::Integer(0),
                    CellValue::Integer(0),
                ),
            ],
        );

        clean(&mut table).unwrap();
        assert_eq!(table.columns.last().map(String::as_str), Some("Vehicle Type"));
        assert_eq!(vehicle_type_of(&table, 0), Some(VehicleType::Phev));
        assert_eq!(vehicle_type_of(&table, 1), Some(VehicleType::Bev));
        // null MSRP survives cleaning
        assert!(table.value(0, "Base MSRP").is_null());
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let mut cols = header();
        cols.retain(|c| c != "Base MSRP");
        let mut table = VehicleTable::new(cols, Vec::new());
        let err = clean(&mut table).unwrap_err();
        assert!(matches!(err, AnalysisError::Schema(_)));
    }

    #[test]
    fn classification_is_substring_match() {
        assert_eq!(
            VehicleType::classify("Battery Electric Vehicle (BEV)"),
            VehicleType::Bev
        );
        assert_eq!(
            VehicleType::classify("battery electric vehicle"),
            VehicleType::Phev
        );
        assert_eq!(VehicleType::classify(""), VehicleType::Phev);
    }

    fn cell() -> impl Strategy<Value = CellValue> {
        prop_oneof![
            Just(CellValue::Null),
            any::<i64>().prop_map(CellValue::Integer),
            (-1e6f64..1e6).prop_map(CellValue::Float),
            Just(CellValue::Float(f64::NAN)),
            "[A-Za-z /()0-9.]{0,12}".prop_map(CellValue::String),
            prop_oneof![
                Just("Battery Electric Vehicle (BEV)".to_string()),
                Just("Plug-in Hybrid Electric Vehicle (PHEV)".to_string()),
            ]
            .prop_map(CellValue::String),
        ]
    }

    proptest! {
        #[test]
        fn cleaned_rows_have_required_values(
            cells in prop::collection::vec((cell(), cell(), cell(), cell()), 0..40)
        ) {
            let rows = cells
                .into_iter()
                .map(|(y, k, r, m)| row(y, k, r, m))
                .collect::<Vec<_>>();
            let rows_in = rows.len();
            let mut table = VehicleTable::new(header(), rows);

            let summary = clean(&mut table).unwrap();
            prop_assert!(table.len() <= rows_in);
            prop_assert_eq!(summary.rows_out(), table.len());

            for i in 0..table.len() {
                for col in REQUIRED_NON_NULL {
                    prop_assert!(!table.value(i, col).is_null());
                }
                prop_assert!(table.value(i, "Electric Range").as_f64().is_some());
                let msrp = table.value(i, "Base MSRP");
                prop_assert!(msrp.is_null() || msrp.as_f64().is_some());

                let description = table.value(i, "Electric Vehicle Type").to_string();
                let expected = if description.contains("Battery Electric Vehicle") {
                    "BEV"
                } else {
                    "PHEV"
                };
                prop_assert_eq!(table.value(i, "Vehicle Type").as_str(), Some(expected));
            }
        }
    }
}
