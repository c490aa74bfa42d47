use std::ops::Deref;

use super::model::FrameSeries;
use crate::error::{FrameError, FrameResult};

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

/// A scalar cut-off: values strictly below it are "low".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold(pub f64);

impl Threshold {
    /// NaN is never low.
    pub fn is_low(&self, value: f64) -> bool {
        value < self.0
    }
}

impl From<f64> for Threshold {
    fn from(v: f64) -> Self {
        Threshold(v)
    }
}

// ---------------------------------------------------------------------------
// IntervalFilter – per-window filter decision from a single-field series
// ---------------------------------------------------------------------------

/// Decides, for a time window, whether data from another series should be
/// dropped there: the window is filtered when the mean of the wrapped series
/// over it is below the threshold.
#[derive(Debug, Clone)]
pub struct IntervalFilter {
    series: FrameSeries,
    threshold: Threshold,
    default_filter: bool,
}

impl IntervalFilter {
    /// The wrapped series must carry exactly one value field.
    pub fn new(series: FrameSeries, threshold: impl Into<Threshold>) -> FrameResult<Self> {
        if series.fields().len() != 1 {
            return Err(FrameError::Config(format!(
                "filter series needs exactly one value field, got {:?}",
                series.fields()
            )));
        }
        Ok(IntervalFilter {
            series,
            threshold: threshold.into(),
            default_filter: false,
        })
    }

    /// Decision used for windows with no overlapping filter data.
    pub fn with_default_filter(mut self, default_filter: bool) -> Self {
        self.default_filter = default_filter;
        self
    }

    pub fn series(&self) -> &FrameSeries {
        &self.series
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn default_filter(&self) -> bool {
        self.default_filter
    }

    /// `true` means "drop data in `[start, end]`".
    pub fn filter_at(&self, start: f64, end: f64) -> bool {
        let mean = self
            .series
            .mean_between(start, end)
            .first()
            .copied()
            .unwrap_or(f64::NAN);
        if mean.is_nan() {
            self.default_filter
        } else {
            self.threshold.is_low(mean)
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredFrameSeries – target frames the filter keeps
// ---------------------------------------------------------------------------

/// A [`FrameSeries`] holding only those frames of a target for which
/// [`IntervalFilter::filter_at`] is false. Fields, offset and frame order
/// come from the target. Built once; derefs to the reduced series.
#[derive(Debug, Clone)]
pub struct FilteredFrameSeries {
    series: FrameSeries,
    dropped: usize,
}

impl FilteredFrameSeries {
    pub fn new(target: &FrameSeries, filter: &IntervalFilter) -> Self {
        let series = target.retain(|f| !filter.filter_at(f.start, f.end));
        let dropped = target.len() - series.len();
        log::debug!("interval filter dropped {dropped} of {} frames", target.len());

        FilteredFrameSeries { series, dropped }
    }

    /// Number of target frames removed by the filter.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_inner(self) -> FrameSeries {
        self.series
    }
}

impl Deref for FilteredFrameSeries {
    type Target = FrameSeries;

    fn deref(&self) -> &FrameSeries {
        &self.series
    }
}
