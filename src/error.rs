use thiserror::Error;

/// Result alias for frame-series construction and queries.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors raised while building or loading frame series.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Missing or inconsistent field-name configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File extension is neither `.csv` nor `.parquet`.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Expected columns are missing or not numeric.
    #[error("Unexpected data shape: {0}")]
    DataShape(String),
}

impl FrameError {
    /// Configuration errors are caller mistakes and must abort a batch run.
    pub fn is_config(&self) -> bool {
        matches!(self, FrameError::Config(_))
    }
}
