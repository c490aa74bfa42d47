//! Derived voice-activity statistics from frame-based recordings.
//!
//! Per-frame data (VAD probabilities, acoustic measures) is loaded into a
//! [`FrameSeries`], optionally restricted to voiced frames with an
//! [`IntervalFilter`], and reduced to per-file pause or acoustic summaries.

pub mod batch;
pub mod config;
pub mod data;
pub mod error;
pub mod pause;
pub mod report;

pub use data::filter::{FilteredFrameSeries, IntervalFilter, Threshold};
pub use data::model::{Frame, FrameKeys, FrameRecord, FrameSeries};
pub use data::stats::Summary;
pub use error::{FrameError, FrameResult};
pub use pause::{PauseSegmenter, PauseStats, Segment};
