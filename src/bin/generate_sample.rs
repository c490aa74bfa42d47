use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Alternating speech / silence with random run lengths, in seconds.
fn speech_mask(duration: f64, rng: &mut SimpleRng) -> Vec<(f64, f64, bool)> {
    let mut runs = Vec::new();
    let mut t = 0.0;
    let mut speaking = true;
    while t < duration {
        let len = if speaking {
            1.0 + 3.0 * rng.next_f64()
        } else {
            0.2 + 1.2 * rng.next_f64()
        };
        let end = (t + len).min(duration);
        runs.push((t, end, speaking));
        t = end;
        speaking = !speaking;
    }
    runs
}

fn is_speech(runs: &[(f64, f64, bool)], t: f64) -> bool {
    runs.iter()
        .find(|(s, e, _)| t >= *s && t < *e)
        .is_some_and(|(_, _, sp)| *sp)
}

struct Columns {
    names: [&'static str; 3],
    start: Vec<f64>,
    end: Vec<f64>,
    value: Vec<f64>,
}

impl Columns {
    fn new(names: [&'static str; 3]) -> Self {
        Columns {
            names,
            start: Vec::new(),
            end: Vec::new(),
            value: Vec::new(),
        }
    }

    fn push(&mut self, start: f64, end: f64, value: f64) {
        self.start.push(start);
        self.end.push(end);
        self.value.push(value);
    }

    fn write_parquet(&self, path: &Path) {
        let schema = Arc::new(Schema::new(
            self.names
                .iter()
                .map(|n| Field::new(*n, DataType::Float64, false))
                .collect::<Vec<_>>(),
        ));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(self.start.clone())),
                Arc::new(Float64Array::from(self.end.clone())),
                Arc::new(Float64Array::from(self.value.clone())),
            ],
        )
        .expect("Failed to create RecordBatch");

        let file = std::fs::File::create(path).expect("Failed to create output file");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
        writer.write(&batch).expect("Failed to write batch");
        writer.close().expect("Failed to close writer");
    }

    fn write_csv(&self, path: &Path) {
        let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV");
        writer.write_record(self.names).expect("Failed to write header");
        for i in 0..self.start.len() {
            writer
                .write_record([
                    format!("{:.3}", self.start[i]),
                    format!("{:.3}", self.end[i]),
                    format!("{:.4}", self.value[i]),
                ])
                .expect("Failed to write row");
        }
        writer.flush().expect("Failed to flush CSV");
    }
}

fn main() {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    let vad_dir = root.join("vad");
    let acoustic_dir = root.join("acoustic");
    std::fs::create_dir_all(&vad_dir).expect("Failed to create vad directory");
    std::fs::create_dir_all(&acoustic_dir).expect("Failed to create acoustic directory");

    let mut rng = SimpleRng::new(42);
    let recordings = ["rec_001", "rec_002", "rec_003", "rec_004"];

    for (i, name) in recordings.iter().enumerate() {
        let duration = 20.0 + 5.0 * i as f64;
        let runs = speech_mask(duration, &mut rng);

        // VAD: 32 ms frames
        let mut vad = Columns::new(["frame_start", "frame_end", "voice_probability"]);
        let step = 0.032;
        let mut t = 0.0;
        while t + step <= duration {
            let p = if is_speech(&runs, t) {
                rng.gauss(0.85, 0.08)
            } else {
                rng.gauss(0.1, 0.08)
            };
            vad.push(t, t + step, p.clamp(0.0, 1.0));
            t += step;
        }

        // Intensity: 10 ms frames, louder during speech
        let mut intensity =
            Columns::new(["intensity_frame_start", "intensity_frame_end", "intensity"]);
        let step = 0.010;
        let mut t = 0.0;
        while t + step <= duration {
            let db = if is_speech(&runs, t) {
                rng.gauss(65.0, 4.0)
            } else {
                rng.gauss(32.0, 3.0)
            };
            intensity.push(t, t + step, db);
            t += step;
        }

        vad.write_parquet(&vad_dir.join(format!("{name}.parquet")));
        vad.write_csv(&vad_dir.join(format!("{name}.csv")));
        // last recording has no acoustic counterpart
        if i + 1 < recordings.len() {
            intensity.write_parquet(&acoustic_dir.join(format!("{name}.parquet")));
            intensity.write_csv(&acoustic_dir.join(format!("{name}.csv")));
        }

        println!(
            "{name}: {:.1}s, {} VAD frames, {} intensity frames",
            duration,
            vad.start.len(),
            intensity.start.len()
        );
    }

    println!("Wrote sample data to {}", root.display());
}
