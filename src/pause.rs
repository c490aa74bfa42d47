use std::cell::OnceCell;

use crate::data::filter::Threshold;
use crate::data::model::FrameSeries;
use crate::data::stats::Summary;
use crate::error::{FrameError, FrameResult};

/// A contiguous run of below-threshold frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

impl Segment {
    fn new(start: f64, end: f64) -> Self {
        Segment {
            start,
            end,
            duration: end - start,
        }
    }
}

/// Aggregate pause statistics. Everything but `count` is NaN without pauses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PauseStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl PauseStats {
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Splits a voice-activity series into pauses.
///
/// Segments are computed on first access and cached.
#[derive(Debug)]
pub struct PauseSegmenter {
    series: FrameSeries,
    threshold: Threshold,
    segments: OnceCell<Vec<Segment>>,
}

impl PauseSegmenter {
    /// The series must carry exactly one value field (the activity measure).
    pub fn new(series: FrameSeries, threshold: impl Into<Threshold>) -> FrameResult<Self> {
        if series.fields().len() != 1 {
            return Err(FrameError::Config(format!(
                "pause detection needs exactly one activity field, got {:?}",
                series.fields()
            )));
        }
        Ok(PauseSegmenter {
            series,
            threshold: threshold.into(),
            segments: OnceCell::new(),
        })
    }

    pub fn series(&self) -> &FrameSeries {
        &self.series
    }

    pub fn segments(&self) -> &[Segment] {
        self.segments
            .get_or_init(|| segment_pauses(&self.series, self.threshold))
    }

    pub fn stats(&self) -> PauseStats {
        let durations = Summary::from_values(self.segments().iter().map(|s| s.duration));
        PauseStats {
            count: self.segments().len(),
            mean: durations.mean,
            std: durations.std,
            min: durations.min,
            max: durations.max,
        }
    }
}

/// Single forward pass: a pause opens at the start of the first low frame
/// and closes at the end of the last low frame before activity resumes.
/// A pause still open when the series ends is closed at the last low frame.
pub fn segment_pauses(series: &FrameSeries, threshold: Threshold) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut open_start: Option<f64> = None;
    let mut last_low_end = f64::NAN;

    for frame in series.frames() {
        let value = frame.values.first().copied().unwrap_or(f64::NAN);
        if threshold.is_low(value) {
            last_low_end = frame.end;
            if open_start.is_none() {
                open_start = Some(frame.start);
            }
        } else if let Some(start) = open_start.take() {
            segments.push(Segment::new(start, last_low_end));
        }
    }
    if let Some(start) = open_start {
        segments.push(Segment::new(start, last_low_end));
    }

    segments
}
