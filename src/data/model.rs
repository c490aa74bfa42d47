use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

use super::loader;
use super::stats::Summary;
use crate::error::{FrameError, FrameResult};

/// One loaded row: column name → numeric cell.
pub type FrameRecord = BTreeMap<String, f64>;

// ---------------------------------------------------------------------------
// FrameKeys – which columns hold start, end and values
// ---------------------------------------------------------------------------

/// Column names resolved once, at construction of a [`FrameSeries`].
///
/// Always names at least one value column.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameKeys {
    start_key: String,
    end_key: String,
    value_keys: Vec<String>,
}

impl FrameKeys {
    /// Fails with [`FrameError::Config`] when no value column is named.
    pub fn new<S: Into<String>>(
        start_key: impl Into<String>,
        end_key: impl Into<String>,
        value_keys: impl IntoIterator<Item = S>,
    ) -> FrameResult<Self> {
        let value_keys: Vec<String> = value_keys.into_iter().map(Into::into).collect();
        if value_keys.is_empty() {
            return Err(FrameError::Config("value_key must be specified".into()));
        }
        Ok(FrameKeys {
            start_key: start_key.into(),
            end_key: end_key.into(),
            value_keys,
        })
    }

    /// `frame_start` / `frame_end` plus the given value columns.
    pub fn with_values<S: Into<String>>(value_keys: impl IntoIterator<Item = S>) -> FrameResult<Self> {
        Self::new("frame_start", "frame_end", value_keys)
    }

    /// Default layout of voice-activity files.
    pub fn voice_probability() -> Self {
        FrameKeys {
            start_key: "frame_start".into(),
            end_key: "frame_end".into(),
            value_keys: vec!["voice_probability".into()],
        }
    }

    pub fn start_key(&self) -> &str {
        &self.start_key
    }

    pub fn end_key(&self) -> &str {
        &self.end_key
    }

    /// Value columns, in output order.
    pub fn value_keys(&self) -> &[String] {
        &self.value_keys
    }

    /// First value column; names output files.
    pub fn primary_value_key(&self) -> &str {
        &self.value_keys[0]
    }
}

// ---------------------------------------------------------------------------
// Frame – one time interval and its values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub start: f64,
    pub end: f64,
    /// Aligned with [`FrameSeries::fields`].
    pub values: Vec<f64>,
}

impl Frame {
    pub fn new(start: f64, end: f64, values: Vec<f64>) -> Self {
        Frame { start, end, values }
    }

    /// Three-way overlap test against the window `[t0, t1]`:
    /// start strictly inside, frame covering the window, or end strictly inside.
    /// A frame touching the window only at a shared boundary is not included
    /// unless it covers the whole window.
    pub fn overlaps(&self, t0: f64, t1: f64) -> bool {
        let starts_inside = t0 < self.start && t1 > self.start;
        let covers = t0 >= self.start && t1 <= self.end;
        let ends_inside = t0 < self.end && t1 > self.end;
        starts_inside || covers || ends_inside
    }
}

// ---------------------------------------------------------------------------
// FrameSeries – time-ordered frames sharing the same value fields
// ---------------------------------------------------------------------------

/// Time-ordered frames with named value fields.
///
/// Frames whose end is at or before `offset` are dropped when the series is
/// built. The series is immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSeries {
    frames: Vec<Frame>,
    fields: Vec<String>,
    offset: f64,
}

impl FrameSeries {
    /// Build a series from loaded records.
    ///
    /// Returns [`FrameError::DataShape`] when a record lacks one of the
    /// configured columns.
    pub fn new(records: &[FrameRecord], offset: f64, keys: &FrameKeys) -> FrameResult<Self> {
        let lookup = |rec: &FrameRecord, key: &str, row: usize| -> FrameResult<f64> {
            rec.get(key)
                .copied()
                .ok_or_else(|| FrameError::DataShape(format!("row {row}: missing numeric column '{key}'")))
        };

        let mut frames = Vec::with_capacity(records.len());
        for (row, rec) in records.iter().enumerate() {
            let start = lookup(rec, keys.start_key.as_str(), row)?;
            let end = lookup(rec, keys.end_key.as_str(), row)?;
            let values = keys
                .value_keys
                .iter()
                .map(|k| lookup(rec, k.as_str(), row))
                .collect::<FrameResult<Vec<f64>>>()?;
            frames.push(Frame::new(start, end, values));
        }

        Self::from_frames(frames, offset, keys.value_keys.clone())
    }

    /// Build directly from frames, applying the offset trim.
    ///
    /// Every frame must carry one value per field, otherwise
    /// [`FrameError::DataShape`].
    pub fn from_frames(frames: Vec<Frame>, offset: f64, fields: Vec<String>) -> FrameResult<Self> {
        if let Some((row, frame)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.values.len() != fields.len())
        {
            return Err(FrameError::DataShape(format!(
                "frame {row} has {} values for {} fields",
                frame.values.len(),
                fields.len()
            )));
        }

        let frames = frames.into_iter().filter(|f| f.end > offset).collect();
        Ok(FrameSeries {
            frames,
            fields,
            offset,
        })
    }

    /// Copy of the series holding only frames for which `keep` is true.
    /// Fields and offset carry over; no offset trim is re-applied.
    pub fn retain<F>(&self, mut keep: F) -> FrameSeries
    where
        F: FnMut(&Frame) -> bool,
    {
        FrameSeries {
            frames: self.frames.iter().filter(|&f| keep(f)).cloned().collect(),
            fields: self.fields.clone(),
            offset: self.offset,
        }
    }

    /// Load a `.csv` or `.parquet` file and build a series from it.
    pub fn load(path: &Path, offset: f64, keys: &FrameKeys) -> anyhow::Result<Self> {
        let records = loader::load_records(path)?;
        let series = Self::new(&records, offset, keys)
            .with_context(|| format!("building frame series from {}", path.display()))?;
        log::debug!(
            "loaded {} frames ({} before trim) from {}",
            series.len(),
            records.len(),
            path.display()
        );
        Ok(series)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    // -- point / range queries --

    /// Values of every frame.
    pub fn values(&self) -> Vec<&[f64]> {
        self.frames.iter().map(|f| f.values.as_slice()).collect()
    }

    /// Values of frames ending strictly before `t`.
    pub fn values_before(&self, t: f64) -> Vec<&[f64]> {
        self.frames
            .iter()
            .filter(|f| f.end < t)
            .map(|f| f.values.as_slice())
            .collect()
    }

    /// Values of frames starting strictly after `t`.
    pub fn values_after(&self, t: f64) -> Vec<&[f64]> {
        self.frames
            .iter()
            .filter(|f| f.start > t)
            .map(|f| f.values.as_slice())
            .collect()
    }

    /// Values of frames overlapping `[t0, t1]`, see [`Frame::overlaps`].
    pub fn values_between(&self, t0: f64, t1: f64) -> Vec<&[f64]> {
        self.frames
            .iter()
            .filter(|f| f.overlaps(t0, t1))
            .map(|f| f.values.as_slice())
            .collect()
    }

    // -- statistics, one entry per field --

    /// Per-field mean over the window; NaN for a field with no data there.
    pub fn mean_between(&self, t0: f64, t1: f64) -> Vec<f64> {
        let rows = self.values_between(t0, t1);
        (0..self.fields.len())
            .map(|i| Summary::from_values(rows.iter().map(|v| v[i])).mean)
            .collect()
    }

    pub fn summary(&self) -> Vec<Summary> {
        (0..self.fields.len())
            .map(|i| Summary::from_values(self.frames.iter().map(|f| f.values[i])))
            .collect()
    }

    pub fn mean(&self) -> Vec<f64> {
        self.summary().iter().map(|s| s.mean).collect()
    }

    /// Sample standard deviation per field.
    pub fn std(&self) -> Vec<f64> {
        self.summary().iter().map(|s| s.std).collect()
    }

    pub fn range(&self) -> Vec<f64> {
        self.summary().iter().map(Summary::range).collect()
    }
}
