use crate::data::model::FrameKeys;

/// Which file extension the batch layer picks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputType {
    Csv,
    Parquet,
}

impl InputType {
    pub fn extension(&self) -> &'static str {
        match self {
            InputType::Csv => "csv",
            InputType::Parquet => "parquet",
        }
    }
}

/// Settings for pause detection on voice-activity files.
#[derive(Debug, Clone)]
pub struct PauseConfig {
    /// Voice probability below which a pause starts.
    pub threshold: f64,
    /// Frames ending at or before this time are ignored (instruction prompt).
    pub offset: f64,
    pub keys: FrameKeys,
}

impl PauseConfig {
    pub fn new(threshold: f64, offset: f64, keys: FrameKeys) -> Self {
        Self {
            threshold,
            offset,
            keys,
        }
    }

    /// Name of the activity column, used for the output file name.
    pub fn vad_key(&self) -> &str {
        self.keys.primary_value_key()
    }
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            offset: 0.0,
            keys: FrameKeys::voice_probability(),
        }
    }
}

/// Settings for acoustic statistics restricted to voiced frames.
#[derive(Debug, Clone)]
pub struct AcousticFilterConfig {
    pub vad_threshold: f64,
    /// Applied to the acoustic series only; the VAD series is never trimmed.
    pub offset: f64,
    pub vad_keys: FrameKeys,
    pub acoustic_keys: FrameKeys,
    /// Filter decision for windows without VAD data.
    pub default_filter: bool,
}

impl AcousticFilterConfig {
    /// Acoustic value columns have no default and must be named.
    pub fn new(offset: f64, acoustic_keys: FrameKeys) -> Self {
        Self {
            vad_threshold: 0.5,
            offset,
            vad_keys: FrameKeys::voice_probability(),
            acoustic_keys,
            default_filter: false,
        }
    }

    pub fn acoustic_key(&self) -> &str {
        self.acoustic_keys.primary_value_key()
    }
}
