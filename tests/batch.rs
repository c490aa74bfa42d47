use std::path::Path;
use std::sync::Arc;

use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use frame_stats::batch::{run_acoustic_batch, run_pause_batch};
use frame_stats::config::{AcousticFilterConfig, InputType, PauseConfig};
use frame_stats::report::ReportFormat;
use frame_stats::{FrameError, FrameKeys};

fn write_csv(path: &Path, header: &str, rows: &[(f64, f64, f64)]) {
    let mut text = format!("{header}\n");
    for (s, e, v) in rows {
        text.push_str(&format!("{s},{e},{v}\n"));
    }
    std::fs::write(path, text).unwrap();
}

fn write_parquet(path: &Path, names: [&str; 3], rows: &[(f64, f64, f64)]) {
    let schema = Arc::new(Schema::new(
        names
            .iter()
            .map(|n| Field::new(*n, DataType::Float64, false))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(rows.iter().map(|r| r.0).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.1).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.2).collect::<Vec<_>>())),
        ],
    )
    .unwrap();
    let file = std::fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

fn unit_rows(values: &[f64]) -> Vec<(f64, f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, i as f64 + 1.0, *v))
        .collect()
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn test_pause_batch_skips_bad_files() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let nested = input.path().join("session_2");
    std::fs::create_dir_all(&nested).unwrap();

    write_csv(
        &input.path().join("rec_a.csv"),
        "frame_start,frame_end,voice_probability",
        &unit_rows(&[0.9, 0.3, 0.3, 0.9, 0.2]),
    );
    write_csv(
        &nested.join("rec_b.csv"),
        "frame_start,frame_end,voice_probability",
        &unit_rows(&[0.9, 0.8]),
    );
    // wrong columns
    write_csv(&input.path().join("rec_c.csv"), "t0,t1,p", &unit_rows(&[0.1]));
    // not picked up at all
    std::fs::write(input.path().join("notes.txt"), "ignore me").unwrap();

    let report = run_pause_batch(
        input.path(),
        output.path(),
        InputType::Csv,
        &PauseConfig::default(),
        &[ReportFormat::Csv],
    )
    .unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.outputs, vec![output.path().join("derived_voice_probability.csv")]);

    let lines = read_lines(&report.outputs[0]);
    assert_eq!(lines[0], "formatted_url,pause_count,pause_mean,pause_std,pause_range");
    assert_eq!(lines[1], "rec_a.mp4,2,1.5,0.7071067811865476,1");
    assert_eq!(lines[2], "rec_b.mp4,0,,,");
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_pause_batch_parquet_with_offset() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_parquet(
        &input.path().join("rec_a.parquet"),
        ["frame_start", "frame_end", "voice_probability"],
        &unit_rows(&[0.1, 0.9, 0.2, 0.9]),
    );

    let mut config = PauseConfig::default();
    config.offset = 1.0;
    let report = run_pause_batch(
        input.path(),
        output.path(),
        InputType::Parquet,
        &config,
        &[ReportFormat::Csv],
    )
    .unwrap();

    let lines = read_lines(&report.outputs[0]);
    // leading pause in [0,1] is trimmed away
    assert_eq!(lines[1], "rec_a.mp4,1,1,,0");
}

#[test]
fn test_acoustic_batch_filters_unvoiced_frames() {
    let vad = tempfile::tempdir().unwrap();
    let acoustic = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    // voiced in [0,2), silent in [2,4)
    write_csv(
        &vad.path().join("rec_a.csv"),
        "frame_start,frame_end,voice_probability",
        &unit_rows(&[0.9, 0.8, 0.1, 0.2]),
    );
    write_csv(
        &acoustic.path().join("rec_a.csv"),
        "intensity_frame_start,intensity_frame_end,intensity",
        &[(0.0, 1.0, 60.0), (1.0, 2.0, 70.0), (2.0, 3.0, 20.0), (3.0, 4.0, 25.0)],
    );
    // no acoustic counterpart: skipped
    write_csv(
        &vad.path().join("rec_b.csv"),
        "frame_start,frame_end,voice_probability",
        &unit_rows(&[0.9]),
    );
    // no VAD counterpart: nothing is filtered
    write_csv(
        &acoustic.path().join("rec_c.csv"),
        "intensity_frame_start,intensity_frame_end,intensity",
        &[(0.0, 1.0, 40.0), (1.0, 2.0, 50.0)],
    );

    let keys = FrameKeys::new("intensity_frame_start", "intensity_frame_end", ["intensity"]).unwrap();
    let config = AcousticFilterConfig::new(0.0, keys);
    let report = run_acoustic_batch(
        vad.path(),
        acoustic.path(),
        output.path(),
        InputType::Csv,
        &config,
        &[ReportFormat::Csv],
    )
    .unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.outputs, vec![output.path().join("derived_intensity.csv")]);

    let lines = read_lines(&report.outputs[0]);
    assert_eq!(lines[0], "formatted_url,intensity_mean,intensity_std,intensity_range");
    assert_eq!(lines[1], "rec_a.mp4,65,7.0710678118654755,10");
    assert_eq!(lines[2], "rec_c.mp4,45,7.0710678118654755,10");
}

#[test]
fn test_acoustic_batch_aborts_on_config_error() {
    let vad = tempfile::tempdir().unwrap();
    let acoustic = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    std::fs::write(
        vad.path().join("rec_a.csv"),
        "frame_start,frame_end,voice_probability,intensity\n0,1,0.9,61\n",
    )
    .unwrap();
    write_csv(
        &acoustic.path().join("rec_a.csv"),
        "frame_start,frame_end,intensity",
        &unit_rows(&[60.0]),
    );

    let mut config = AcousticFilterConfig::new(0.0, FrameKeys::with_values(["intensity"]).unwrap());
    // a filter needs exactly one VAD value column
    config.vad_keys = FrameKeys::with_values(["voice_probability", "intensity"]).unwrap();

    let result = run_acoustic_batch(
        vad.path(),
        acoustic.path(),
        output.path(),
        InputType::Csv,
        &config,
        &[ReportFormat::Csv],
    );
    let err = result.unwrap_err();
    assert!(err
        .chain()
        .filter_map(|e| e.downcast_ref::<FrameError>())
        .any(FrameError::is_config));
    // the run stops before any report is written
    assert!(!output.path().join("derived_intensity.csv").exists());
}

#[test]
fn test_acoustic_batch_json_report() {
    let vad = tempfile::tempdir().unwrap();
    let acoustic = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_parquet(
        &vad.path().join("rec_a.parquet"),
        ["frame_start", "frame_end", "voice_probability"],
        &unit_rows(&[0.9, 0.1]),
    );
    write_parquet(
        &acoustic.path().join("rec_a.parquet"),
        ["frame_start", "frame_end", "intensity"],
        &unit_rows(&[60.0, 20.0]),
    );

    let config = AcousticFilterConfig::new(0.0, FrameKeys::with_values(["intensity"]).unwrap());
    let report = run_acoustic_batch(
        vad.path(),
        acoustic.path(),
        output.path(),
        InputType::Parquet,
        &config,
        &[ReportFormat::Json],
    )
    .unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report.outputs[0]).unwrap()).unwrap();
    assert_eq!(parsed[0]["formatted_url"], "rec_a.mp4");
    assert_eq!(parsed[0]["intensity_mean"], 60.0);
    // one frame left: no sample std
    assert!(parsed[0]["intensity_std"].is_null());
    assert_eq!(parsed[0]["intensity_range"], 0.0);
}

#[test]
fn test_pause_batch_writes_every_format_from_one_pass() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_csv(
        &input.path().join("rec_a.csv"),
        "frame_start,frame_end,voice_probability",
        &unit_rows(&[0.9, 0.3, 0.9]),
    );
    write_csv(&input.path().join("rec_b.csv"), "t0,t1,p", &unit_rows(&[0.1]));

    let report = run_pause_batch(
        input.path(),
        output.path(),
        InputType::Csv,
        &PauseConfig::default(),
        &[ReportFormat::Csv, ReportFormat::Json],
    )
    .unwrap();

    // one report covers both files: the bad file is counted once, not per format
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        report.outputs,
        vec![
            output.path().join("derived_voice_probability.csv"),
            output.path().join("derived_voice_probability.json"),
        ]
    );

    let lines = read_lines(&report.outputs[0]);
    assert_eq!(lines[1], "rec_a.mp4,1,1,,0");
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report.outputs[1]).unwrap()).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
    assert_eq!(parsed[0]["formatted_url"], "rec_a.mp4");
    assert_eq!(parsed[0]["pause_count"], 1.0);
    assert_eq!(parsed[0]["pause_mean"], 1.0);
}
