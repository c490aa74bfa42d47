use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::config::{AcousticFilterConfig, InputType, PauseConfig};
use crate::data::filter::{FilteredFrameSeries, IntervalFilter};
use crate::data::model::FrameSeries;
use crate::error::FrameError;
use crate::pause::PauseSegmenter;
use crate::report::{self, ReportFormat, SummaryRow};

/// Outcome of a directory run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    /// One report file per requested format.
    pub outputs: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// File discovery
// ---------------------------------------------------------------------------

/// All files below `dir` with the extension of `input_type`, sorted.
pub fn collect_files(dir: &Path, input_type: InputType) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current)
            .with_context(|| format!("listing {}", current.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == input_type.extension())
            {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// File name up to the first `.`; pairs VAD and acoustic files.
pub fn identifier(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    }
}

/// Identifier as written to the output table.
pub fn formatted_url(id: &str) -> String {
    format!("{id}.mp4")
}

/// Configuration errors abort a run; everything else skips one file.
fn is_fatal(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<FrameError>())
        .any(FrameError::is_config)
}

// ---------------------------------------------------------------------------
// Pause batch
// ---------------------------------------------------------------------------

pub const PAUSE_COLUMNS: [&str; 4] = ["pause_count", "pause_mean", "pause_std", "pause_range"];

/// Pause statistics for one voice-activity file.
pub fn pause_row(path: &Path, config: &PauseConfig) -> Result<SummaryRow> {
    let series = FrameSeries::load(path, config.offset, &config.keys)?;
    let segmenter = PauseSegmenter::new(series, config.threshold)?;
    let stats = segmenter.stats();
    debug!("{}: {} pauses", path.display(), stats.count);

    let mut row = SummaryRow::new(formatted_url(&identifier(path)));
    row.push("pause_count", stats.count as f64);
    row.push("pause_mean", stats.mean);
    row.push("pause_std", stats.std);
    row.push("pause_range", stats.range());
    Ok(row)
}

/// Write `derived_<vad key>` in each format, one pause row per readable file.
///
/// Files are read once; every format gets the same rows.
pub fn run_pause_batch(
    input_dir: &Path,
    output_dir: &Path,
    input_type: InputType,
    config: &PauseConfig,
    formats: &[ReportFormat],
) -> Result<BatchReport> {
    let files = collect_files(input_dir, input_type)?;
    info!("pause analysis over {} files in {}", files.len(), input_dir.display());

    let mut rows = Vec::new();
    let mut skipped = 0;
    for file in &files {
        match pause_row(file, config) {
            Ok(row) => rows.push(row),
            Err(err) if is_fatal(&err) => return Err(err),
            Err(err) => {
                warn!("skipping {}: {err:#}", file.display());
                skipped += 1;
            }
        }
    }

    let header: Vec<String> = PAUSE_COLUMNS.iter().map(|c| c.to_string()).collect();
    let outputs = report::write_rows(output_dir, config.vad_key(), &header, &rows, formats)?;
    Ok(BatchReport {
        processed: rows.len(),
        skipped,
        outputs,
    })
}

// ---------------------------------------------------------------------------
// Acoustic batch, filtered by voice activity
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct FilePair {
    vad: Option<PathBuf>,
    acoustic: Option<PathBuf>,
}

/// `<field>_mean`, `<field>_std`, `<field>_range` for each acoustic field.
pub fn acoustic_columns(config: &AcousticFilterConfig) -> Vec<String> {
    config
        .acoustic_keys
        .value_keys()
        .iter()
        .flat_map(|k| [format!("{k}_mean"), format!("{k}_std"), format!("{k}_range")])
        .collect()
}

/// Acoustic statistics over frames the VAD filter keeps.
///
/// Without a VAD file every window falls back to `default_filter`.
pub fn acoustic_row(
    id: &str,
    vad: Option<&Path>,
    acoustic: &Path,
    config: &AcousticFilterConfig,
) -> Result<SummaryRow> {
    let vad_series = match vad {
        Some(path) => FrameSeries::load(path, f64::NEG_INFINITY, &config.vad_keys)?,
        None => {
            warn!("no VAD file found for {id}");
            let fields = config.vad_keys.value_keys().to_vec();
            FrameSeries::from_frames(Vec::new(), f64::NEG_INFINITY, fields)?
        }
    };
    let filter = IntervalFilter::new(vad_series, config.vad_threshold)?
        .with_default_filter(config.default_filter);

    let acoustic_series = FrameSeries::load(acoustic, config.offset, &config.acoustic_keys)?;
    let filtered = FilteredFrameSeries::new(&acoustic_series, &filter);
    debug!(
        "{id}: kept {} of {} acoustic frames",
        filtered.len(),
        acoustic_series.len()
    );

    let mut row = SummaryRow::new(formatted_url(id));
    for (field, summary) in filtered.fields().iter().zip(filtered.summary()) {
        row.push(format!("{field}_mean"), summary.mean);
        row.push(format!("{field}_std"), summary.std);
        row.push(format!("{field}_range"), summary.range());
    }
    Ok(row)
}

/// Pair files by identifier and write `derived_<acoustic key>` in each format.
///
/// Identifiers without an acoustic file are skipped silently.
pub fn run_acoustic_batch(
    vad_dir: &Path,
    acoustic_dir: &Path,
    output_dir: &Path,
    input_type: InputType,
    config: &AcousticFilterConfig,
    formats: &[ReportFormat],
) -> Result<BatchReport> {
    let mut pairs: BTreeMap<String, FilePair> = BTreeMap::new();
    for file in collect_files(vad_dir, input_type)? {
        let id = identifier(&file);
        pairs.entry(id).or_default().vad = Some(file);
    }
    for file in collect_files(acoustic_dir, input_type)? {
        let id = identifier(&file);
        pairs.entry(id).or_default().acoustic = Some(file);
    }
    info!(
        "filtered acoustic analysis over {} identifiers ({} / {})",
        pairs.len(),
        vad_dir.display(),
        acoustic_dir.display()
    );

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (id, pair) in &pairs {
        let Some(acoustic) = &pair.acoustic else {
            debug!("{id}: no acoustic file");
            continue;
        };
        match acoustic_row(id, pair.vad.as_deref(), acoustic, config) {
            Ok(row) => rows.push(row),
            Err(err) if is_fatal(&err) => return Err(err),
            Err(err) => {
                warn!("skipping {id}: {err:#}");
                skipped += 1;
            }
        }
    }

    let header = acoustic_columns(config);
    let outputs = report::write_rows(output_dir, config.acoustic_key(), &header, &rows, formats)?;
    Ok(BatchReport {
        processed: rows.len(),
        skipped,
        outputs,
    })
}
