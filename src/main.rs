use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use frame_stats::batch::{run_acoustic_batch, run_pause_batch, BatchReport};
use frame_stats::config::{AcousticFilterConfig, InputType, PauseConfig};
use frame_stats::report::ReportFormat;
use frame_stats::FrameKeys;

#[derive(Parser)]
#[command(name = "frame-stats")]
#[command(about = "Pause and filtered acoustic statistics from frame data", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write the report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pause count and durations from voice-activity files
    Pause {
        /// Directory searched recursively for VAD files
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Ignore frames ending at or before this time (seconds)
        #[arg(long, default_value_t = 0.0)]
        offset: f64,

        #[arg(long, value_enum, default_value = "csv")]
        input_type: InputType,

        /// Voice probability below which a pause starts
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,

        #[arg(long, default_value = "frame_start")]
        frame_start_key: String,

        #[arg(long, default_value = "frame_end")]
        frame_end_key: String,

        #[arg(long, default_value = "voice_probability")]
        vad_key: String,
    },

    /// Acoustic feature statistics over voiced frames only
    Acoustics {
        /// Directory of VAD files
        #[arg(long, value_name = "DIR")]
        vad: PathBuf,

        /// Directory of acoustic feature files
        #[arg(long, value_name = "DIR")]
        acoustic: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Ignore acoustic frames ending at or before this time (seconds)
        #[arg(long, default_value_t = 0.0)]
        offset: f64,

        #[arg(long, value_enum, default_value = "csv")]
        input_type: InputType,

        /// Voice probability below which acoustic frames are dropped
        #[arg(long, default_value_t = 0.5)]
        vad_threshold: f64,

        #[arg(long, default_value = "frame_start")]
        vad_frame_start_key: String,

        #[arg(long, default_value = "frame_end")]
        vad_frame_end_key: String,

        #[arg(long, default_value = "voice_probability")]
        vad_key: String,

        #[arg(long, default_value = "frame_start")]
        acoustic_frame_start_key: String,

        #[arg(long, default_value = "frame_end")]
        acoustic_frame_end_key: String,

        /// Acoustic value column(s); at least one is required
        #[arg(long = "acoustic-key", value_name = "COLUMN")]
        acoustic_keys: Vec<String>,

        /// Drop acoustic frames where no VAD data exists
        #[arg(long)]
        default_filter: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let formats: &[ReportFormat] = if cli.json {
        &[ReportFormat::Csv, ReportFormat::Json]
    } else {
        &[ReportFormat::Csv]
    };

    match cli.command {
        Commands::Pause {
            input,
            output,
            offset,
            input_type,
            threshold,
            frame_start_key,
            frame_end_key,
            vad_key,
        } => {
            let keys = FrameKeys::new(frame_start_key, frame_end_key, [vad_key])?;
            let config = PauseConfig::new(threshold, offset, keys);
            let report = run_pause_batch(&input, &output, input_type, &config, formats)?;
            log_report(&report);
        }
        Commands::Acoustics {
            vad,
            acoustic,
            output,
            offset,
            input_type,
            vad_threshold,
            vad_frame_start_key,
            vad_frame_end_key,
            vad_key,
            acoustic_frame_start_key,
            acoustic_frame_end_key,
            acoustic_keys,
            default_filter,
        } => {
            let acoustic_keys =
                FrameKeys::new(acoustic_frame_start_key, acoustic_frame_end_key, acoustic_keys)?;
            let mut config = AcousticFilterConfig::new(offset, acoustic_keys);
            config.vad_threshold = vad_threshold;
            config.vad_keys = FrameKeys::new(vad_frame_start_key, vad_frame_end_key, [vad_key])?;
            config.default_filter = default_filter;

            let report = run_acoustic_batch(&vad, &acoustic, &output, input_type, &config, formats)?;
            log_report(&report);
        }
    }

    Ok(())
}

fn log_report(report: &BatchReport) {
    info!("{} files processed, {} skipped", report.processed, report.skipped);
    for path in &report.outputs {
        info!("wrote {}", path.display());
    }
}
