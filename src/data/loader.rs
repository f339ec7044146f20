use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Record, VehicleTable};
use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a vehicle table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row + one vehicle per line (also the fallback)
/// * `.json`    – `[{ "Model Year": 2020, "Electric Range": 215, ... }, ...]`
/// * `.parquet` – flat scalar columns (strings, ints, floats, bools)
///
/// Every reader owns its file handle, so the file is closed when this
/// returns, whether loading succeeded or not.
pub fn load_file(path: &Path) -> Result<VehicleTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        _ => load_csv(path)?,
    };

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every following row must have
/// exactly as many fields. Field types are guessed per cell.
fn load_csv(path: &Path) -> Result<VehicleTable> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    read_csv(file).map_err(|e| match e {
        CsvFailure::Io(source) => AnalysisError::io(path, source),
        CsvFailure::Parse(err) => err,
    })
}

enum CsvFailure {
    Io(std::io::Error),
    Parse(AnalysisError),
}

impl From<csv::Error> for CsvFailure {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            if let csv::ErrorKind::Io(source) = err.into_kind() {
                return CsvFailure::Io(source);
            }
            return CsvFailure::Parse(AnalysisError::Parse("I/O failure".into()));
        }
        CsvFailure::Parse(err.into())
    }
}

fn read_csv<R: std::io::Read>(input: R) -> std::result::Result<VehicleTable, CsvFailure> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvFailure::Parse(AnalysisError::Parse(
            "CSV has no header row".into(),
        )));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Record = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), CellValue::from_text(value)))
            .collect();
        rows.push(row);
    }

    Ok(VehicleTable::new(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Model Year": 2020, "Electric Range": 215, "Base MSRP": 0, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<VehicleTable> {
    let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| AnalysisError::Parse("expected top-level JSON array".into()))?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| AnalysisError::Parse(format!("row {i} is not a JSON object")))?;

        let mut row = Record::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(VehicleTable::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<VehicleTable> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let record: Record = columns
                .iter()
                .enumerate()
                .map(|(idx, name)| (name.clone(), arrow_cell(batch.column(idx), row)))
                .collect();
            rows.push(record);
        }
    }

    Ok(VehicleTable::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => CellValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::tempdir;

    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_csv_with_header_order() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "ev.csv",
            "Model Year,Electric Range,Electric Vehicle Type\n\
             2020,215,Battery Electric Vehicle (BEV)\n\
             2019,,Plug-in Hybrid Electric Vehicle (PHEV)\n",
        );

        let table = load_file(&path).unwrap();
        assert_eq!(
            table.columns,
            vec!["Model Year", "Electric Range", "Electric Vehicle Type"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(*table.value(0, "Model Year"), CellValue::Integer(2020));
        assert!(table.value(1, "Electric Range").is_null());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn ragged_csv_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "bad.csv", "a,b\n1,2\n3,4,5\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)), "{err}");
    }

    #[test]
    fn empty_csv_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "empty.csv", "");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)), "{err}");
    }

    #[test]
    fn loads_json_records() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "ev.json",
            r#"[{"Model Year": 2021, "Base MSRP": 0.0, "Make": "TESLA"},
                {"Model Year": 2018, "Base MSRP": null, "Make": "NISSAN"}]"#,
        );

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns, ["Model Year", "Base MSRP", "Make"]);
        assert_eq!(*table.value(0, "Make"), CellValue::String("TESLA".into()));
        assert!(table.value(1, "Base MSRP").is_null());
    }

    #[test]
    fn json_must_be_array() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "ev.json", r#"{"Model Year": 2021}"#);
        assert!(matches!(load_file(&path), Err(AnalysisError::Parse(_))));
    }

    #[test]
    fn loads_parquet_scalars() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ev.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("Model Year", DataType::Int64, false),
            Field::new("Base MSRP", DataType::Float64, true),
            Field::new("Electric Vehicle Type", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2020, 2022])),
                Arc::new(Float64Array::from(vec![Some(69900.0), None])),
                Arc::new(StringArray::from(vec![
                    "Battery Electric Vehicle (BEV)",
                    "Plug-in Hybrid Electric Vehicle (PHEV)",
                ])),
            ],
        )
        .unwrap();
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(*table.value(0, "Base MSRP"), CellValue::Float(69900.0));
        assert!(table.value(1, "Base MSRP").is_null());
        assert_eq!(*table.value(1, "Model Year"), CellValue::Integer(2022));
    }
}
