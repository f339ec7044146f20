use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Column names of the EV population dataset. Matching is exact
/// (case- and spelling-sensitive).
pub mod columns {
    pub const ELECTRIC_RANGE: &str = "Electric Range";
    pub const MODEL_YEAR: &str = "Model Year";
    pub const BASE_MSRP: &str = "Base MSRP";
    pub const ELECTRIC_VEHICLE_TYPE: &str = "Electric Vehicle Type";
    /// Derived by the cleaner.
    pub const VEHICLE_TYPE: &str = "Vehicle Type";
}

// ---------------------------------------------------------------------------
// CellValue – a single cell in the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the common Pandas dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "NaN"),
        }
    }
}

/// Text fields read as missing, the same set `pandas.read_csv` treats as NA.
pub const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

impl CellValue {
    /// Guess the type of a raw text field. Empty fields and NA tokens are null.
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() || NA_TOKENS.contains(&s) {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return if f.is_nan() {
                CellValue::Null
            } else {
                CellValue::Float(f)
            };
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    /// Missing value: `Null` or a NaN float.
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// The value as `f64` when it is already numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Lenient numeric coercion: numbers pass through, booleans become 1/0,
    /// strings are parsed after trimming, anything else is null.
    pub fn to_numeric(&self) -> CellValue {
        match self {
            CellValue::Integer(_) => self.clone(),
            CellValue::Float(v) if v.is_nan() => CellValue::Null,
            CellValue::Float(_) => self.clone(),
            CellValue::Bool(b) => CellValue::Integer(i64::from(*b)),
            CellValue::String(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    CellValue::Integer(i)
                } else {
                    match s.parse::<f64>() {
                        Ok(v) if !v.is_nan() => CellValue::Float(v),
                        _ => CellValue::Null,
                    }
                }
            }
            CellValue::Null => CellValue::Null,
        }
    }

    /// Short dtype label used by the dataset info report.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::String(_) => "object",
            CellValue::Integer(_) => "int64",
            CellValue::Float(_) => "float64",
            CellValue::Bool(_) => "bool",
            CellValue::Null => "null",
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// A single vehicle (one row of the source file): column name → value.
/// Columns absent from the map read as null.
pub type Record = BTreeMap<String, CellValue>;

// ---------------------------------------------------------------------------
// VehicleTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset. `columns` keeps the header order of the source.
#[derive(Debug, Clone, Default)]
pub struct VehicleTable {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

/// Per-column summary in the spirit of `DataFrame.info()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: String,
}

static NULL: CellValue = CellValue::Null;

impl VehicleTable {
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        VehicleTable { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Append a column name if it is not present yet.
    pub fn add_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }

    /// Cell at (`row`, `column`); missing cells are null.
    pub fn value(&self, row: usize, column: &str) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// Iterate one column top to bottom.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows.iter().map(move |r| r.get(name).unwrap_or(&NULL))
    }

    /// Sorted set of distinct values in a column.
    pub fn unique_values(&self, name: &str) -> BTreeSet<CellValue> {
        self.column(name).cloned().collect()
    }

    /// Non-null counts and the dominant dtype of each column.
    pub fn column_info(&self) -> Vec<ColumnInfo> {
        self.columns
            .iter()
            .map(|name| {
                let mut kinds: BTreeMap<&'static str, usize> = BTreeMap::new();
                let mut non_null = 0;
                for v in self.column(name) {
                    if !v.is_null() {
                        non_null += 1;
                        *kinds.entry(v.kind()).or_default() += 1;
                    }
                }
                let dtype = match kinds.len() {
                    0 => "null",
                    1 => kinds.keys().next().copied().unwrap_or("null"),
                    // ints mixed with floats widen, everything else is object
                    2 if kinds.contains_key("int64") && kinds.contains_key("float64") => {
                        "float64"
                    }
                    _ => "object",
                };
                ColumnInfo {
                    name: name.clone(),
                    non_null,
                    dtype: dtype.to_string(),
                }
            })
            .collect()
    }
}
