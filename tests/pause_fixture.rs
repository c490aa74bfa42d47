use std::path::Path;

use frame_stats::{FrameKeys, FrameSeries, PauseSegmenter};

fn fixture() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/vad.csv"))
}

fn segmenter(offset: f64) -> PauseSegmenter {
    let keys = FrameKeys::with_values(["voice_probability"]).unwrap();
    let series = FrameSeries::load(fixture(), offset, &keys).unwrap();
    PauseSegmenter::new(series, 0.5).unwrap()
}

#[test]
fn test_offset_changes_pause_count() {
    assert_eq!(segmenter(1.0).stats().count, 3);
    assert_eq!(segmenter(0.0).stats().count, 4);
}

#[test]
fn test_fixture_pause_durations() {
    let stats = segmenter(0.0).stats();
    assert!((stats.mean - 0.75).abs() < 1e-12);
    assert!((stats.range() - 0.5).abs() < 1e-12);

    let p = segmenter(1.0);
    let first = p.segments()[0];
    assert_eq!((first.start, first.end), (1.0, 2.0));
}

#[test]
fn test_retained_frames_end_after_offset() {
    let keys = FrameKeys::with_values(["voice_probability"]).unwrap();
    for offset in [0.0, 1.0, 2.25, 10.0] {
        let series = FrameSeries::load(fixture(), offset, &keys).unwrap();
        assert!(series.frames().iter().all(|f| f.end > offset));
    }
}
