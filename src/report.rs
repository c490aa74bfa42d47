use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Column holding the recording identifier.
pub const ID_COLUMN: &str = "formatted_url";

/// One output row: identifier plus named statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub id: String,
    pub columns: Vec<(String, f64)>,
}

impl SummaryRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            columns: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.columns.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// Formats written by [`write_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

/// Write `derived_<stem>.<ext>` into `output_dir` once per format and
/// return the paths in format order.
///
/// `header` lists the statistic columns; with no rows only the header is
/// written.
pub fn write_rows(
    output_dir: &Path,
    stem: &str,
    header: &[String],
    rows: &[SummaryRow],
    formats: &[ReportFormat],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let mut paths = Vec::with_capacity(formats.len());
    for format in formats {
        let path = output_dir.join(format!("derived_{stem}.{}", format.extension()));
        match format {
            ReportFormat::Csv => write_csv(&path, header, rows)?,
            ReportFormat::Json => write_json(&path, rows)?,
        }
        log::info!("wrote {} rows to {}", rows.len(), path.display());
        paths.push(path);
    }
    Ok(paths)
}

fn write_csv(path: &Path, header: &[String], rows: &[SummaryRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut head = vec![ID_COLUMN.to_string()];
    head.extend(header.iter().cloned());
    writer.write_record(&head).context("writing CSV header")?;

    for row in rows {
        let mut record = vec![row.id.clone()];
        // NaN becomes an empty cell
        record.extend(header.iter().map(|name| match row.get(name) {
            Some(v) if !v.is_nan() => v.to_string(),
            _ => String::new(),
        }));
        writer
            .write_record(&record)
            .with_context(|| format!("writing row {}", row.id))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Records-oriented array, NaN as `null`.
fn write_json(path: &Path, rows: &[SummaryRow]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, rows).context("writing JSON report")?;
    Ok(())
}

impl Serialize for SummaryRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len() + 1))?;
        map.serialize_entry(ID_COLUMN, &self.id)?;
        for (name, v) in &self.columns {
            // serde_json writes non-finite floats as null
            map.serialize_entry(name, v)?;
        }
        map.end()
    }
}
