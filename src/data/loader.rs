use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::FrameRecord;
use crate::error::FrameError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load frame records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one frame per row
/// * `.parquet` – one frame per row, numeric columns
///
/// Only numeric cells are kept; the caller picks the columns it needs.
pub fn load_records(path: &Path) -> Result<Vec<FrameRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" => load_parquet(path),
        other => Err(FrameError::UnsupportedFormat(format!(
            "{}: expected .csv or .parquet, got .{other}",
            path.display()
        ))
        .into()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one frame per row, e.g.
/// `frame_start,frame_end,voice_probability`.
///
/// Empty cells become NaN. Cells that are not numbers are left out of the
/// record, so a required column holding text shows up as missing later.
fn load_csv(path: &Path) -> Result<Vec<FrameRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut record = FrameRecord::new();
        for (col_idx, cell) in row.iter().enumerate() {
            let Some(col_name) = headers.get(col_idx) else {
                continue;
            };
            if let Some(v) = parse_cell(cell) {
                record.insert(col_name.clone(), v);
            }
        }
        records.push(record);
    }

    Ok(records)
}

fn parse_cell(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of frames.
///
/// Float64, Float32, Int32 and Int64 columns are read as `f64`; nulls become
/// NaN. Columns of any other type are ignored.
fn load_parquet(path: &Path) -> Result<Vec<FrameRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening parquet file {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let numeric_cols: Vec<(String, &Arc<dyn Array>)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| is_numeric(f.data_type()))
            .map(|(i, f)| (f.name().clone(), batch.column(i)))
            .collect();

        for row in 0..batch.num_rows() {
            let mut record = FrameRecord::new();
            for (name, col) in &numeric_cols {
                let value = extract_f64(col, row)
                    .with_context(|| format!("row {row}: failed to read '{name}'"))?;
                record.insert(name.clone(), value);
            }
            records.push(record);
        }
    }

    Ok(records)
}

// -- Parquet / Arrow helpers --

fn is_numeric(dt: &DataType) -> bool {
    matches!(
        dt,
        DataType::Float64 | DataType::Float32 | DataType::Int32 | DataType::Int64
    )
}

/// Read one numeric cell as `f64`.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        return Ok(f64::NAN);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        _ => None,
    };
    value.ok_or_else(|| {
        FrameError::DataShape(format!("column type {:?} is not numeric", col.data_type())).into()
    })
}
